use crypto_odds::clob_client::{ClobClient, PriceSource, TokenSource};
use crypto_odds::config::Config;
use crypto_odds::market_fetcher::{GammaClient, ListingSource};
use crypto_odds::normalization::condition_id;
use crypto_odds::price_enricher::token_map;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    println!("Connecting to listings API at {}...", config.gamma_url);
    let gamma = GammaClient::new(&config)?;
    let markets = gamma.list_markets(1).await?;
    println!("✅ Listings API reachable. Markets returned: {}", markets.len());

    println!("Connecting to pricing API at {}...", config.clob_url);
    let clob = ClobClient::new(&config)?;
    let token_markets = clob.token_markets().await?;
    println!("✅ Token listings reachable. Markets returned: {}", token_markets.len());

    let probe = token_markets.iter().find_map(|m| {
        let condition = condition_id(m)?;
        token_map(std::slice::from_ref(m), &condition)
            .into_iter()
            .next()
    });

    match probe {
        Some((outcome, token_id)) => {
            let midpoint = clob.midpoint(&token_id).await?;
            println!("✅ Midpoint for {} ({}): {:?}", outcome, token_id, midpoint);
        }
        None => println!("No token found to probe pricing endpoints."),
    }

    Ok(())
}
