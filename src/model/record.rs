//! References from the index page and the records built from them

use crate::model::AttributeSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A pointer to a detail page that has not been fetched yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Identifier assigned by the source
    pub id: u32,

    /// Absolute URL of the detail page
    pub url: String,

    /// Display name
    pub name: String,
}

impl Reference {
    pub fn new(id: u32, url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}:{}", self.id, self.name)
    }
}

/// A fully fetched and validated entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u32,
    pub name: String,
    pub url: String,
    pub base: AttributeSet,
}

impl Record {
    /// Combines a reference with the stats extracted from its detail page
    pub fn from_reference(reference: &Reference, base: AttributeSet) -> Self {
        Self {
            id: reference.id,
            name: reference.name.clone(),
            url: reference.url.clone(),
            base,
        }
    }
}

/// All known records keyed by id
///
/// Every key equals the `id` of the record stored under it.
pub type RecordMap = BTreeMap<u32, Record>;

/// Builds a record map from records, keying each by its own id
pub fn to_record_map(records: impl IntoIterator<Item = Record>) -> RecordMap {
    records.into_iter().map(|record| (record.id, record)).collect()
}
