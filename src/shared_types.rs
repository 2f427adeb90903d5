use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

/// A market exactly as the listings API returned it. Field names vary between
/// API variants, so nothing about its shape is assumed.
pub type RawMarket = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOutcome {
    pub name: String,
    pub baseline_price: Option<Decimal>,
    pub token_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLevel {
    pub price: Decimal,
    pub size: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrderBookTop {
    pub bids: Vec<OrderLevel>, // best (highest) first
    pub asks: Vec<OrderLevel>, // best (lowest) first
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pricing {
    pub midpoint_price: Option<Decimal>,
    pub buy_price: Option<Decimal>,
    pub sell_price: Option<Decimal>,
    pub order_book: OrderBookTop,
}

/// Outcome of the pricing lookups for one outcome token.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Enrichment {
    Priced(Pricing),
    Failed { error: String },
    /// No token id could be resolved, so no lookup was attempted.
    Unpriced {},
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedOutcome {
    #[serde(rename = "outcome")]
    pub name: String,
    #[serde(rename = "price")]
    pub baseline_price: Option<Decimal>,
    pub token_id: Option<String>,
    pub probability: Option<Decimal>,
    #[serde(flatten)]
    pub enrichment: Enrichment,
}

impl EnrichedOutcome {
    pub fn new(outcome: NormalizedOutcome, enrichment: Enrichment) -> Self {
        let midpoint = match &enrichment {
            Enrichment::Priced(pricing) => pricing.midpoint_price,
            _ => None,
        };
        Self {
            probability: midpoint.or(outcome.baseline_price),
            name: outcome.name,
            baseline_price: outcome.baseline_price,
            token_id: outcome.token_id,
            enrichment,
        }
    }

    pub fn pricing(&self) -> Option<&Pricing> {
        match &self.enrichment {
            Enrichment::Priced(pricing) => Some(pricing),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.enrichment {
            Enrichment::Failed { error } => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketReport {
    pub market_id: Option<String>,
    pub question: Option<String>,
    pub slug: Option<String>,
    pub end_date: Option<String>,
    pub condition_id: Option<String>,
    pub outcomes: Vec<EnrichedOutcome>,
}

/// Renders a loosely typed JSON value as plain text: strings verbatim, null as
/// nothing, everything else in its JSON form.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// First of `keys` whose value is present and non-empty once rendered as text.
pub fn first_text(market: &RawMarket, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| market.get(*key))
        .map(value_text)
        .find(|text| !text.is_empty())
}
