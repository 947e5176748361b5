//! Dex-Harvest: an incremental base-stats harvester
//!
//! This crate fetches a category index page, follows every entry it lists to
//! the entry's detail page, extracts the six base stats from that page and
//! keeps the results in a resumable JSON record store, so repeated runs only
//! fetch what is still missing.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod model;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("HTTP {status} ({reason}) for {url}")]
    Transport {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Extraction failed for {reference}: {source}")]
    Extract {
        reference: String,
        source: ExtractError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl HarvestError {
    /// Returns true for failures of the document transport (unreachable
    /// source or non-success status)
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Http { .. })
    }
}

/// Errors raised while pulling structured data out of a document
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// The expected anchor, table or row shape is absent
    #[error("Unexpected document structure: {0}")]
    Structure(String),

    /// The table was found but some required fields never appeared
    #[error("Missing base stats: {}", join_fields(missing))]
    Validation { missing: Vec<model::StatField> },
}

fn join_fields(fields: &[model::StatField]) -> String {
    fields
        .iter()
        .map(|field| field.key())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for extraction operations
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{BatchOrchestrator, Harvester};
pub use extract::{extract_list, FieldExtractor};
pub use model::{AttributeSet, Record, RecordMap, Reference, StatField};
pub use storage::{JsonRecordStore, RecordStore};
