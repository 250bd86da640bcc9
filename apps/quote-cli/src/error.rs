//! Error types for the quote CLI.

use std::path::PathBuf;

use hako_core::{CardError, CoreError, RateTableError, ValidationError};

/// Engine configuration errors. Always fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Invalid shipping rates for seller {seller_id}: {source}")]
    InvalidRates {
        seller_id: String,
        #[source]
        source: RateTableError,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors raised while answering a quote request.
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("Failed to read request {path}: {source}")]
    ReadRequest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed request: {0}")]
    MalformedRequest(#[from] serde_json::Error),

    #[error("Failed to write output: {0}")]
    Output(#[source] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Card rejected: {0}")]
    CardRejected(CardError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type QuoteResult<T> = Result<T, QuoteError>;
