use std::path::Path;

use tracing::info;

use crate::clob_client::{PriceSource, TokenSource};
use crate::config::Config;
use crate::error::ReportError;
use crate::market_fetcher::{fetch_markets, ListingSource};
use crate::price_enricher::build_report;
use crate::reporter::{render, to_json, write_snapshot};
use crate::shared_types::{first_text, MarketReport};
use crate::topic_classifier::TopicClassifier;

pub const REPORT_TITLE: &str = "CRYPTOCURRENCY MARKET ODDS";
const PREVIEW_COUNT: usize = 20;

#[derive(Debug)]
pub struct RunOutput {
    pub fetched: usize,
    pub matched: usize,
    pub reports: Vec<MarketReport>,
    pub console: String,
}

/// One full pass: fetch, classify, normalize and enrich, render, then write
/// the snapshot. The snapshot is written even when nothing matched. Only a
/// failed snapshot write is returned as an error.
pub async fn run<L, C>(
    config: &Config,
    classifier: &TopicClassifier,
    listings: &L,
    clob: &C,
) -> Result<RunOutput, ReportError>
where
    L: ListingSource + ?Sized,
    C: TokenSource + PriceSource + ?Sized,
{
    info!(limit = config.fetch_limit, "Fetching markets from listings API");
    let markets = fetch_markets(listings, config.fetch_limit).await;
    if markets.is_empty() {
        info!("No markets returned from API");
    }

    let matched = classifier.filter(&markets);
    info!(count = matched.len(), "Found cryptocurrency related markets");
    for (i, market) in matched.iter().take(PREVIEW_COUNT).enumerate() {
        let question = first_text(market, &["question"]).unwrap_or_else(|| "Unknown".to_string());
        info!(index = i + 1, %question, "Matched market");
    }

    let selected = &matched[..matched.len().min(config.max_reported_markets)];
    let mut reports = Vec::with_capacity(selected.len());
    for (i, market) in selected.iter().enumerate() {
        let question: String = first_text(market, &["question"])
            .unwrap_or_else(|| "Unknown".to_string())
            .chars()
            .take(80)
            .collect();
        info!("Processing market {}/{}: {}", i + 1, selected.len(), question);
        reports.push(build_report(clob, market).await);
    }

    let console = render(&reports, REPORT_TITLE);
    write_snapshot(Path::new(&config.output_path), &to_json(&reports))?;

    Ok(RunOutput {
        fetched: markets.len(),
        matched: matched.len(),
        reports,
        console,
    })
}
