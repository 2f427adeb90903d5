use std::fmt;
use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tracing::{error, info};

use crate::error::ReportError;
use crate::shared_types::{EnrichedOutcome, MarketReport};

const RULE_WIDTH: usize = 80;
const NOT_AVAILABLE: &str = "N/A";

/// Percent with two decimals, rounded. Values too large to scale are shown as
/// not available rather than aborting the report.
pub fn format_probability(probability: Option<Decimal>) -> String {
    match probability.and_then(|p| p.checked_mul(dec!(100))) {
        Some(pct) => format!("{:.2}%", pct.round_dp(2)),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_dollars(price: Option<Decimal>) -> String {
    match price {
        Some(p) => format!("${}", p),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn text_or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_AVAILABLE)
}

/// Console rendering of a finished run, one block per market.
pub struct ConsoleReport<'a> {
    pub title: &'a str,
    pub reports: &'a [MarketReport],
}

impl fmt::Display for ConsoleReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);

        writeln!(f, "{}\n{}\n{}\n", heavy, self.title, heavy)?;
        for report in self.reports {
            writeln!(f, "Market: {}", text_or_na(&report.question))?;
            writeln!(f, "Market ID: {}", text_or_na(&report.market_id))?;
            writeln!(f, "End Date: {}", text_or_na(&report.end_date))?;
            writeln!(f, "\nOutcomes:")?;
            if report.outcomes.is_empty() {
                writeln!(f, "  (no priceable outcomes)")?;
            }
            for outcome in &report.outcomes {
                write_outcome(f, outcome)?;
            }
            writeln!(f, "\n{}\n", light)?;
        }
        Ok(())
    }
}

fn write_outcome(f: &mut fmt::Formatter<'_>, outcome: &EnrichedOutcome) -> fmt::Result {
    if let Some(error) = outcome.error() {
        return writeln!(f, "  - {}: Error - {}", outcome.name, error);
    }

    let pricing = outcome.pricing();
    writeln!(f, "  - {}:", outcome.name)?;
    writeln!(f, "    Probability: {}", format_probability(outcome.probability))?;
    writeln!(
        f,
        "    Midpoint Price: {}",
        format_dollars(pricing.and_then(|p| p.midpoint_price))
    )?;
    writeln!(f, "    Buy Price: {}", format_dollars(pricing.and_then(|p| p.buy_price)))?;
    writeln!(f, "    Sell Price: {}", format_dollars(pricing.and_then(|p| p.sell_price)))
}

pub fn render(reports: &[MarketReport], title: &str) -> String {
    ConsoleReport { title, reports }.to_string()
}

/// Pretty-printed JSON for the snapshot file. Never fails: a report that does
/// not serialize is stored as its debug string instead.
pub fn to_json(reports: &[MarketReport]) -> Vec<u8> {
    let values: Vec<Value> = reports
        .iter()
        .map(|report| {
            serde_json::to_value(report).unwrap_or_else(|e| {
                error!(error = %e, market_id = ?report.market_id, "Report not serializable, storing as text");
                Value::String(format!("{:?}", report))
            })
        })
        .collect();

    // A tree of plain JSON values always serializes.
    serde_json::to_vec_pretty(&values).unwrap_or_else(|_| b"[]".to_vec())
}

pub fn write_snapshot(path: &Path, json: &[u8]) -> Result<(), ReportError> {
    std::fs::write(path, json).map_err(|source| ReportError::Write {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), bytes = json.len(), "Results saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_types::{Enrichment, NormalizedOutcome, OrderBookTop, Pricing};

    fn outcome(name: &str, price: Option<Decimal>, enrichment: Enrichment) -> EnrichedOutcome {
        EnrichedOutcome::new(
            NormalizedOutcome {
                name: name.to_string(),
                baseline_price: price,
                token_id: None,
            },
            enrichment,
        )
    }

    fn report(outcomes: Vec<EnrichedOutcome>) -> MarketReport {
        MarketReport {
            market_id: Some("m1".to_string()),
            question: Some("Will Bitcoin reach $100k?".to_string()),
            slug: None,
            end_date: None,
            condition_id: Some("0xabc".to_string()),
            outcomes,
        }
    }

    #[test]
    fn test_format_probability() {
        assert_eq!(format_probability(Some(dec!(0.62))), "62.00%");
        assert_eq!(format_probability(Some(dec!(0.005))), "0.50%");
        assert_eq!(format_probability(Some(Decimal::ZERO)), "0.00%");
        assert_eq!(format_probability(None), "N/A");
    }

    #[test]
    fn test_format_probability_rounds() {
        assert_eq!(format_probability(Some(dec!(0.66666))), "66.67%");
        assert_eq!(format_probability(Some(dec!(0.9995000000000001))), "99.95%");
        assert_eq!(format_probability(Some(dec!(0.12344))), "12.34%");
    }

    #[test]
    fn test_format_probability_out_of_range_is_na() {
        let huge = Decimal::from_scientific("1e28").unwrap();
        assert_eq!(format_probability(Some(huge)), "N/A");
        assert_eq!(format_probability(Some(Decimal::MAX)), "N/A");
    }

    #[test]
    fn test_render_uses_baseline_without_midpoint() {
        let text = render(
            &[report(vec![
                outcome("Yes", Some(dec!(0.62)), Enrichment::Unpriced {}),
                outcome("No", Some(dec!(0.38)), Enrichment::Failed { error: "timeout".to_string() }),
            ])],
            "CRYPTOCURRENCY MARKET ODDS",
        );
        assert!(text.contains("Market: Will Bitcoin reach $100k?"));
        assert!(text.contains("    Probability: 62.00%"));
        assert!(text.contains("    Buy Price: N/A"));
        assert!(text.contains("  - No: Error - timeout"));
        assert!(text.contains("End Date: N/A"));
    }

    #[test]
    fn test_render_shows_midpoint_and_dollar_prices() {
        let priced = Enrichment::Priced(Pricing {
            midpoint_price: Some(dec!(0.55)),
            buy_price: Some(dec!(0.56)),
            sell_price: Some(dec!(0.54)),
            order_book: OrderBookTop::default(),
        });
        let text = render(&[report(vec![outcome("Yes", Some(dec!(0.62)), priced)])], "ODDS");
        assert!(text.contains("    Probability: 55.00%"));
        assert!(text.contains("    Midpoint Price: $0.55"));
        assert!(text.contains("    Buy Price: $0.56"));
        assert!(text.contains("    Sell Price: $0.54"));
    }

    #[test]
    fn test_empty_run_serializes_to_empty_array() {
        assert_eq!(to_json(&[]), b"[]");
    }

    #[test]
    fn test_json_snapshot_shape() {
        let json = to_json(&[report(vec![outcome("Yes", Some(dec!(0.62)), Enrichment::Unpriced {})])]);
        let value: Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value[0]["market_id"], "m1");
        assert_eq!(value[0]["outcomes"][0]["outcome"], "Yes");
        assert_eq!(value[0]["outcomes"][0]["price"], 0.62);
        assert!(String::from_utf8(json).unwrap().contains("\n  {"));
    }

    #[test]
    fn test_write_snapshot_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odds.json");
        write_snapshot(&path, b"[1]").unwrap();
        write_snapshot(&path, b"[]").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"[]");
    }
}
