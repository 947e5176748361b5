//! Document extraction
//!
//! This module turns fetched HTML into the data model:
//! - the index page into an ordered list of `Reference`s
//! - a detail page into a validated `AttributeSet`
//!
//! Extraction never recovers locally: a malformed document is an error, never
//! an empty or zeroed result.

mod fields;
mod list;
pub mod locator;
mod tree;

pub use fields::FieldExtractor;
pub use list::extract_list;
pub use locator::{default_locators, HeadingLocator, TableLocator, STATS_MARKER};
