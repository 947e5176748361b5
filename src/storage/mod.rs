//! Storage module for persisting harvested records
//!
//! This module handles:
//! - Loading previously harvested records, tolerating a missing or corrupt file
//! - Merging freshly fetched records into the known set
//! - Writing the merged set back without exposing partial writes

mod json;
mod traits;

pub use json::JsonRecordStore;
pub use traits::{RecordStore, StorageError};

use crate::model::RecordMap;

/// Right-biased union of two record maps
///
/// Records in `fetched` replace records in `existing` with the same id.
pub fn merge(existing: RecordMap, fetched: RecordMap) -> RecordMap {
    let mut merged = existing;
    merged.extend(fetched);
    merged
}
