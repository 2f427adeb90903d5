pub mod clob_client;
pub mod config;
pub mod error;
pub mod market_fetcher;
pub mod normalization;
pub mod pipeline;
pub mod price_enricher;
pub mod reporter;
pub mod shared_types;
pub mod topic_classifier;
