use crypto_odds::clob_client::ClobClient;
use crypto_odds::config::Config;
use crypto_odds::market_fetcher::GammaClient;
use crypto_odds::pipeline::run;
use crypto_odds::topic_classifier::TopicClassifier;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let gamma = GammaClient::new(&config)?;
    let clob = ClobClient::new(&config)?;
    let classifier = TopicClassifier::crypto();

    match run(&config, &classifier, &gamma, &clob).await {
        Ok(output) => {
            print!("{}", output.console);
            println!(
                "Results saved to {} ({} of {} fetched markets matched)",
                config.output_path, output.matched, output.fetched
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            Err(e.into())
        }
    }
}
