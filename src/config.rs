use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

const DEFAULT_GAMMA_URL: &str = "https://gamma-api.polymarket.com";
const DEFAULT_CLOB_URL: &str = "https://clob.polymarket.com";
const DEFAULT_FETCH_LIMIT: usize = 2000;
const DEFAULT_MAX_REPORTED: usize = 20;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_OUTPUT_PATH: &str = "crypto_odds.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// Listings API base (markets with full details).
    pub gamma_url: Url,
    /// Pricing API base (midpoint, price, book, simplified markets).
    pub clob_url: Url,
    pub fetch_limit: usize,
    /// Only the first N classified markets are enriched and reported.
    pub max_reported_markets: usize,
    /// Bounds each individual request, not the whole run.
    pub http_timeout: Duration,
    pub output_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gamma_url: Url::parse(DEFAULT_GAMMA_URL).expect("default gamma url is valid"),
            clob_url: Url::parse(DEFAULT_CLOB_URL).expect("default clob url is valid"),
            fetch_limit: DEFAULT_FETCH_LIMIT,
            max_reported_markets: DEFAULT_MAX_REPORTED,
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
        }
    }
}

impl Config {
    /// Reads the environment (after loading `.env` if present). Unset keys fall
    /// back to defaults; set but malformed keys are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let url_of = |key: &'static str, default: Url| -> Result<Url, ConfigError> {
            match lookup(key) {
                Some(raw) => Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { key, source }),
                None => Ok(default),
            }
        };
        let number = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
                None => Ok(default),
            }
        };

        Ok(Self {
            gamma_url: url_of("GAMMA_API_URL", defaults.gamma_url)?,
            clob_url: url_of("CLOB_API_URL", defaults.clob_url)?,
            fetch_limit: number("MARKET_FETCH_LIMIT", defaults.fetch_limit as u64)? as usize,
            max_reported_markets: number("MAX_REPORTED_MARKETS", defaults.max_reported_markets as u64)?
                as usize,
            http_timeout: Duration::from_secs(number("HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?),
            output_path: lookup("ODDS_OUTPUT_PATH").unwrap_or(defaults.output_path),
        })
    }
}

/// Joins `path` onto an API base, treating the base as a directory.
pub fn endpoint(base: &Url, path: &str) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    base.join(path)
}
