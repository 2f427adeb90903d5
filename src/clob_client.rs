use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::{endpoint, Config};
use crate::error::{ConfigError, FetchError, PricingError};
use crate::market_fetcher::unwrap_envelope;
use crate::normalization::parse_price;
use crate::shared_types::{OrderBookTop, OrderLevel, RawMarket, Side};

/// Number of price levels kept per side of a book.
pub const BOOK_DEPTH: usize = 3;

/// Markets that expose their outcome tokens (`tokens: [{outcome, token_id}]`).
#[async_trait]
pub trait TokenSource {
    async fn token_markets(&self) -> Result<Vec<RawMarket>, FetchError>;
}

#[async_trait]
pub trait PriceSource {
    async fn midpoint(&self, token_id: &str) -> Result<Option<Decimal>, PricingError>;
    async fn price(&self, token_id: &str, side: Side) -> Result<Option<Decimal>, PricingError>;
    async fn order_book(&self, token_id: &str) -> Result<OrderBookTop, PricingError>;
}

#[derive(Deserialize, Debug)]
struct MidpointResponse {
    mid: Option<Value>,
}

#[derive(Deserialize, Debug)]
struct PriceResponse {
    price: Option<Value>,
}

#[derive(Deserialize, Debug)]
struct BookResponse {
    #[serde(default)]
    bids: Vec<BookLevel>,
    #[serde(default)]
    asks: Vec<BookLevel>,
}

#[derive(Deserialize, Debug)]
struct BookLevel {
    price: Value,
    size: Value,
}

/// Read-only client for the CLOB pricing API. No credentials are needed.
pub struct ClobClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ClobClient {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent("CryptoOddsReport/1.0")
            .build()?;
        Ok(Self {
            http,
            base_url: config.clob_url.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        lookup: &'static str,
        path: &str,
        query: &[(&str, &str)],
        token_id: &str,
    ) -> Result<T, PricingError> {
        let url = endpoint(&self.base_url, path)?;
        let wrap = |source| PricingError::Http {
            lookup,
            token_id: token_id.to_string(),
            source,
        };
        debug!(lookup, token_id, "CLOB request");
        self.http
            .get(url)
            .query(query)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(wrap)?
            .json::<T>()
            .await
            .map_err(wrap)
    }
}

#[async_trait]
impl TokenSource for ClobClient {
    async fn token_markets(&self) -> Result<Vec<RawMarket>, FetchError> {
        let url = endpoint(&self.base_url, "simplified-markets")?;
        let body: Value = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(unwrap_envelope(body))
    }
}

#[async_trait]
impl PriceSource for ClobClient {
    async fn midpoint(&self, token_id: &str) -> Result<Option<Decimal>, PricingError> {
        let resp: MidpointResponse = self
            .get_json("midpoint", "midpoint", &[("token_id", token_id)], token_id)
            .await?;
        Ok(resp.mid.as_ref().and_then(parse_price))
    }

    async fn price(&self, token_id: &str, side: Side) -> Result<Option<Decimal>, PricingError> {
        let resp: PriceResponse = self
            .get_json(
                "price",
                "price",
                &[("token_id", token_id), ("side", side.as_str())],
                token_id,
            )
            .await?;
        Ok(resp.price.as_ref().and_then(parse_price))
    }

    async fn order_book(&self, token_id: &str) -> Result<OrderBookTop, PricingError> {
        let resp: BookResponse = self
            .get_json("order book", "book", &[("token_id", token_id)], token_id)
            .await?;
        Ok(top_of_book(parse_levels(&resp.bids), parse_levels(&resp.asks)))
    }
}

fn parse_levels(levels: &[BookLevel]) -> Vec<OrderLevel> {
    levels
        .iter()
        .filter_map(|level| {
            Some(OrderLevel {
                price: parse_price(&level.price)?,
                size: parse_price(&level.size)?,
            })
        })
        .collect()
}

/// Orders each side best-first (bids high to low, asks low to high) and keeps
/// the top `BOOK_DEPTH` levels.
pub fn top_of_book(mut bids: Vec<OrderLevel>, mut asks: Vec<OrderLevel>) -> OrderBookTop {
    bids.sort_by(|a, b| b.price.cmp(&a.price));
    asks.sort_by(|a, b| a.price.cmp(&b.price));
    bids.truncate(BOOK_DEPTH);
    asks.truncate(BOOK_DEPTH);
    OrderBookTop { bids, asks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn level(price: Decimal, size: Decimal) -> OrderLevel {
        OrderLevel { price, size }
    }

    #[test]
    fn test_top_of_book_orders_and_truncates() {
        // the API lists bids ascending and asks descending
        let bids = vec![
            level(dec!(0.40), dec!(10)),
            level(dec!(0.45), dec!(5)),
            level(dec!(0.50), dec!(7)),
            level(dec!(0.55), dec!(1)),
        ];
        let asks = vec![
            level(dec!(0.70), dec!(3)),
            level(dec!(0.65), dec!(2)),
            level(dec!(0.60), dec!(9)),
        ];
        let book = top_of_book(bids, asks);
        let bid_prices: Vec<Decimal> = book.bids.iter().map(|l| l.price).collect();
        let ask_prices: Vec<Decimal> = book.asks.iter().map(|l| l.price).collect();
        assert_eq!(bid_prices, vec![dec!(0.55), dec!(0.50), dec!(0.45)]);
        assert_eq!(ask_prices, vec![dec!(0.60), dec!(0.65), dec!(0.70)]);
    }

    #[test]
    fn test_book_response_parses_string_levels() {
        let resp: BookResponse = serde_json::from_value(json!({
            "market": "0xabc",
            "asset_id": "123",
            "bids": [{"price": "0.48", "size": "120.5"}, {"price": "bad", "size": "1"}],
            "asks": [{"price": 0.52, "size": "30"}]
        }))
        .unwrap();
        assert_eq!(parse_levels(&resp.bids), vec![level(dec!(0.48), dec!(120.5))]);
        assert_eq!(parse_levels(&resp.asks), vec![level(dec!(0.52), dec!(30))]);
    }

    #[test]
    fn test_book_response_tolerates_missing_sides() {
        let resp: BookResponse = serde_json::from_value(json!({"market": "0xabc"})).unwrap();
        assert!(resp.bids.is_empty() && resp.asks.is_empty());
    }

    #[test]
    fn test_client_builds_from_default_config() {
        assert!(ClobClient::new(&Config::default()).is_ok());
    }
}
