//! Statistics over the record store
//!
//! This module provides functionality for summarising what has been
//! harvested so far and displaying it.

use crate::model::{RecordMap, StatField};
use crate::storage::RecordStore;
use crate::HarvestError;

/// Gap ids kept for display
pub const MISSING_IDS_SHOWN: usize = 20;

/// Harvest statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestStatistics {
    /// Number of stored records
    pub total_records: usize,

    /// Smallest stored id
    pub lowest_id: Option<u32>,

    /// Largest stored id
    pub highest_id: Option<u32>,

    /// Number of ids between the lowest and highest one that have no record
    pub missing_count: u64,

    /// The first `MISSING_IDS_SHOWN` of those ids, ascending
    pub missing_ids: Vec<u32>,

    /// Mean of each base stat, in `StatField::REQUIRED` order
    pub averages: Vec<(StatField, f64)>,

    /// Id, name and stat total of the record with the highest stat total
    pub strongest: Option<(u32, String, i64)>,
}

impl HarvestStatistics {
    /// Computes statistics over `records`
    pub fn from_records(records: &RecordMap) -> Self {
        let lowest_id = records.keys().next().copied();
        let highest_id = records.keys().next_back().copied();

        let (missing_count, missing_ids) = match (lowest_id, highest_id) {
            (Some(low), Some(high)) => (
                id_span(low, high) - records.len() as u64,
                (low..=high)
                    .filter(|id| !records.contains_key(id))
                    .take(MISSING_IDS_SHOWN)
                    .collect(),
            ),
            _ => (0, Vec::new()),
        };

        let averages = if records.is_empty() {
            Vec::new()
        } else {
            StatField::REQUIRED
                .iter()
                .map(|field| {
                    let sum: i64 = records
                        .values()
                        .filter_map(|record| record.base.get(*field))
                        .map(i64::from)
                        .sum();
                    (*field, sum as f64 / records.len() as f64)
                })
                .collect()
        };

        // First maximum in id order wins ties
        let strongest = records
            .values()
            .fold(None::<(u32, &str, i64)>, |best, record| {
                let total = record.base.total();
                match best {
                    Some((_, _, best_total)) if best_total >= total => best,
                    _ => Some((record.id, record.name.as_str(), total)),
                }
            })
            .map(|(id, name, total)| (id, name.to_string(), total));

        Self {
            total_records: records.len(),
            lowest_id,
            highest_id,
            missing_count,
            missing_ids,
            averages,
            strongest,
        }
    }
}

/// Number of ids in `low..=high`
fn id_span(low: u32, high: u32) -> u64 {
    u64::from(high) - u64::from(low) + 1
}

/// Loads statistics from a record store
///
/// # Arguments
///
/// * `store` - The store to read
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - Successfully computed statistics
/// * `Err(HarvestError)` - The store could not be read
pub fn load_statistics(store: &dyn RecordStore) -> Result<HarvestStatistics, HarvestError> {
    let records = store.load()?;
    Ok(HarvestStatistics::from_records(&records))
}

/// Prints statistics to stdout
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Total records: {}", stats.total_records);
    if let (Some(low), Some(high)) = (stats.lowest_id, stats.highest_id) {
        println!("  Id range: {} - {}", low, high);
    }
    println!();

    if stats.missing_count > 0 {
        println!("Missing Ids ({}):", stats.missing_count);
        let shown: Vec<String> = stats.missing_ids.iter().map(|id| id.to_string()).collect();
        let more = stats.missing_count.saturating_sub(shown.len() as u64);
        if more > 0 {
            println!("  {} ... and {} more", shown.join(", "), more);
        } else {
            println!("  {}", shown.join(", "));
        }
        println!();
    }

    if !stats.averages.is_empty() {
        println!("Average Base Stats:");
        for (field, average) in &stats.averages {
            println!("  {:<8} {:.1}", field.label().unwrap_or(field.key()), average);
        }
        println!();
    }

    if let Some((id, name, total)) = &stats.strongest {
        println!("Highest stat total: {} ({:04}:{})", total, id, name);
    }

    // Coverage of the id range
    let span = match (stats.lowest_id, stats.highest_id) {
        (Some(low), Some(high)) => id_span(low, high),
        _ => 0,
    };
    let coverage = if span > 0 {
        (stats.total_records as f64 / span as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Coverage: {:.1}% ({} / {} ids in range)",
        coverage, stats.total_records, span
    );
}
