use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info};
use url::Url;

use crate::config::{endpoint, Config};
use crate::error::{ConfigError, FetchError};
use crate::shared_types::{value_text, RawMarket};

/// Anything that can list active markets.
#[async_trait]
pub trait ListingSource {
    async fn list_markets(&self, limit: usize) -> Result<Vec<RawMarket>, FetchError>;
}

/// Client for the Gamma listings API, which carries full market details.
pub struct GammaClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GammaClient {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent("CryptoOddsReport/1.0")
            .build()?;
        Ok(Self {
            http,
            base_url: config.gamma_url.clone(),
        })
    }
}

#[async_trait]
impl ListingSource for GammaClient {
    async fn list_markets(&self, limit: usize) -> Result<Vec<RawMarket>, FetchError> {
        let url = endpoint(&self.base_url, "markets")?;
        let limit = limit.to_string();
        let body: Value = self
            .http
            .get(url)
            .query(&[("active", "true"), ("closed", "false"), ("limit", limit.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(unwrap_envelope(body))
    }
}

/// Flattens the three response shapes the listing endpoints use: a bare
/// array, `{"data": [...]}` or `{"results": [...]}`. Anything else, and any
/// entry that is not an object, is dropped.
pub fn unwrap_envelope(body: Value) -> Vec<RawMarket> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(items)) => items,
            _ => match envelope.remove("results") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(market) => Some(market),
            _ => None,
        })
        .collect()
}

/// Fetches listings, treating any failure as "nothing to process".
pub async fn fetch_markets<S>(source: &S, limit: usize) -> Vec<RawMarket>
where
    S: ListingSource + ?Sized,
{
    match source.list_markets(limit).await {
        Ok(markets) => {
            info!(count = markets.len(), "Fetched markets from listings API");
            log_sample(&markets);
            markets
        }
        Err(e) => {
            error!(error = %e, "Error fetching from listings API");
            Vec::new()
        }
    }
}

const SAMPLE_SIZE: usize = 10;
const SAMPLE_KEYS: [&str; 6] = ["question", "title", "description", "slug", "id", "conditionId"];

fn log_sample(markets: &[RawMarket]) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    for (i, market) in markets.iter().take(SAMPLE_SIZE).enumerate() {
        let fields: Vec<String> = SAMPLE_KEYS
            .iter()
            .filter_map(|key| {
                market.get(*key).map(|v| {
                    let text: String = value_text(v).chars().take(100).collect();
                    format!("{}={}", key, text)
                })
            })
            .collect();
        let keys: Vec<&str> = market.keys().take(15).map(String::as_str).collect();
        debug!(index = i + 1, fields = ?fields, available_keys = ?keys, "Sample market");
    }
}
