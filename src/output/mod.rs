//! Output module for reporting on harvested records
//!
//! This module handles:
//! - Computing statistics over the record store
//! - Printing them for the `--stats` mode

pub mod stats;

pub use stats::{load_statistics, print_statistics, HarvestStatistics};
