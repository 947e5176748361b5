//! Data model for harvested entries
//!
//! # Components
//!
//! - `Reference`: an (id, url, name) pointer produced from the index page
//! - `AttributeSet`: the six base stats extracted from a detail page
//! - `StatField`: the fixed label lookup for the base stats table
//! - `Record` / `RecordMap`: what gets persisted between runs

mod record;
mod stat_field;
mod stats;

// Re-export main types
pub use record::{to_record_map, Record, RecordMap, Reference};
pub use stat_field::StatField;
pub use stats::{AttributeSet, StatsBuilder};
