//! Storage traits and error types
//!
//! This module defines the trait interface for record store backends and
//! associated error types.

use crate::model::RecordMap;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The stored file exists but cannot be decoded into records
    #[error("Corrupt record file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Failed to encode records: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A place where the record map survives between runs
pub trait RecordStore: Send + Sync {
    /// Loads every stored record
    ///
    /// A missing store is an empty map. A corrupt store is logged and treated
    /// as empty; it gets replaced by the next `save`.
    fn load(&self) -> Result<RecordMap, StorageError>;

    /// Replaces the stored records with `records`
    fn save(&self, records: &RecordMap) -> Result<(), StorageError>;
}
