use std::collections::HashMap;

use serde_json::Value;
use tracing::{info, warn};

use crate::clob_client::{PriceSource, TokenSource};
use crate::error::PricingError;
use crate::normalization::{condition_id, normalize};
use crate::shared_types::{
    first_text, value_text, EnrichedOutcome, Enrichment, MarketReport, Pricing, RawMarket, Side,
};

/// Builds an outcome-name to token-id map from the first market whose
/// condition id matches. A repeated outcome label keeps its last token.
/// Lookup failures are logged and give an empty map.
pub async fn resolve_token_ids<T>(source: &T, condition: &str) -> HashMap<String, String>
where
    T: TokenSource + ?Sized,
{
    match source.token_markets().await {
        Ok(markets) => token_map(&markets, condition),
        Err(e) => {
            warn!(condition_id = condition, error = %e, "Error getting token ids");
            HashMap::new()
        }
    }
}

pub fn token_map(markets: &[RawMarket], condition: &str) -> HashMap<String, String> {
    let mut tokens = HashMap::new();
    let Some(market) = markets
        .iter()
        .find(|m| condition_id(m).as_deref() == Some(condition))
    else {
        return tokens;
    };

    if let Some(Value::Array(entries)) = market.get("tokens") {
        for entry in entries {
            let outcome = entry.get("outcome").map(value_text).unwrap_or_default();
            let token_id = entry.get("token_id").map(value_text).unwrap_or_default();
            if !outcome.is_empty() && !token_id.is_empty() {
                tokens.insert(outcome, token_id);
            }
        }
    }
    tokens
}

/// Runs the four pricing lookups for one token. Any failing lookup fails the
/// whole token.
pub async fn enrich<P>(source: &P, token_id: &str) -> Result<Pricing, PricingError>
where
    P: PriceSource + ?Sized,
{
    let midpoint_price = source.midpoint(token_id).await?;
    let buy_price = source.price(token_id, Side::Buy).await?;
    let sell_price = source.price(token_id, Side::Sell).await?;
    let order_book = source.order_book(token_id).await?;
    Ok(Pricing {
        midpoint_price,
        buy_price,
        sell_price,
        order_book,
    })
}

/// Builds the report for one classified market. Nothing here fails: a missing
/// condition id gives an outcome-less report, and pricing failures are kept on
/// the affected outcome only.
pub async fn build_report<C>(clob: &C, market: &RawMarket) -> MarketReport
where
    C: TokenSource + PriceSource + ?Sized,
{
    let mut report = MarketReport {
        market_id: first_text(market, &["id", "_id"]),
        question: first_text(market, &["question"]),
        slug: first_text(market, &["slug"]),
        end_date: first_text(market, &["endDate", "end_date"]),
        condition_id: condition_id(market),
        outcomes: Vec::new(),
    };

    let Some(condition) = report.condition_id.clone() else {
        warn!(market_id = ?report.market_id, "No condition id for market");
        return report;
    };

    let normalized = normalize(market);
    let tokens = resolve_token_ids(clob, &condition).await;

    for mut outcome in normalized {
        outcome.token_id = tokens.get(&outcome.name).cloned();
        let enrichment = match outcome.token_id.as_deref() {
            Some(token_id) => match enrich(clob, token_id).await {
                Ok(pricing) => Enrichment::Priced(pricing),
                Err(e) => {
                    warn!(outcome = %outcome.name, token_id, error = %e, "Pricing lookup failed");
                    Enrichment::Failed {
                        error: e.to_string(),
                    }
                }
            },
            None => {
                info!(outcome = %outcome.name, condition_id = %condition, "No token id for outcome");
                Enrichment::Unpriced {}
            }
        };
        report.outcomes.push(EnrichedOutcome::new(outcome, enrichment));
    }

    report
}
