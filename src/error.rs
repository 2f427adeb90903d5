use thiserror::Error;

/// Failure talking to the listings or token-listing endpoint.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
}

/// Failure of one of the per-token pricing lookups.
#[derive(Error, Debug)]
pub enum PricingError {
    #[error("{lookup} lookup failed for token {token_id}: {source}")]
    Http {
        lookup: &'static str,
        token_id: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    /// Used by sources that fail without an underlying transport error.
    #[error("{0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{key} is not a valid url: {source}")]
    InvalidUrl {
        key: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("{key} must be a non-negative integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to write snapshot to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
