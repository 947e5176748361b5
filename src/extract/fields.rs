//! Base stats extraction from a detail page
//!
//! The base stats table is laid out as:
//!
//! ```text
//! <tr> cosmetic header </tr>
//! <tr> cosmetic header </tr>
//! <tr><th><div><a><span>HP</span></a></div><div>45</div></th> ...</tr>
//! ...one row per stat, then totals and decorative rows
//! ```
//!
//! Only rows whose `th` cells expose exactly two `div`s (label, value) are
//! read; everything else is decoration and is skipped.

use crate::extract::locator::{default_locators, TableLocator};
use crate::extract::tree::{child_elements, first_child, full_text, own_text, table_rows};
use crate::model::{AttributeSet, StatField, StatsBuilder};
use crate::{ExtractError, ExtractResult};
use scraper::{ElementRef, Html};

/// Leading rows of the stats table that carry no data
const HEADER_ROWS: usize = 2;

/// Accepted number of rows after the header rows
const MIN_CANDIDATE_ROWS: usize = 6;
const MAX_CANDIDATE_ROWS: usize = 11;

/// Extracts an [`AttributeSet`] from a detail page
pub struct FieldExtractor {
    locators: Vec<Box<dyn TableLocator>>,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(default_locators())
    }
}

impl FieldExtractor {
    /// Creates an extractor that tries `locators` in order
    pub fn new(locators: Vec<Box<dyn TableLocator>>) -> Self {
        Self { locators }
    }

    /// Appends a lower-priority locator
    pub fn with_locator(mut self, locator: impl TableLocator + 'static) -> Self {
        self.locators.push(Box::new(locator));
        self
    }

    /// Parses `html` and extracts the six base stats
    ///
    /// # Errors
    ///
    /// * `ExtractError::Structure` - no locator found a table, or the table
    ///   has an unexpected number of rows
    /// * `ExtractError::Validation` - the table lacks one or more stats
    pub fn extract_fields(&self, html: &str) -> ExtractResult<AttributeSet> {
        let document = Html::parse_document(html);
        let table = self.locate_table(&document)?;
        tracing::debug!("Found base stats table");
        parse_stats_table(table)
    }

    fn locate_table<'a>(&self, document: &'a Html) -> ExtractResult<ElementRef<'a>> {
        for locator in &self.locators {
            if let Some(table) = locator.locate(document) {
                return Ok(table);
            }
            tracing::warn!(
                "Failed to find base stats section after {}",
                locator.describe()
            );
        }

        let tried: Vec<String> = self.locators.iter().map(|l| l.describe()).collect();
        Err(ExtractError::Structure(format!(
            "base stats section not found (tried {})",
            tried.join(", ")
        )))
    }
}

/// Reads the stats rows of a located table
fn parse_stats_table(table: ElementRef<'_>) -> ExtractResult<AttributeSet> {
    let rows: Vec<_> = table_rows(table).into_iter().skip(HEADER_ROWS).collect();

    if !(MIN_CANDIDATE_ROWS..=MAX_CANDIDATE_ROWS).contains(&rows.len()) {
        return Err(ExtractError::Structure(format!(
            "expected {}..={} rows in base stats table but got {}",
            MIN_CANDIDATE_ROWS,
            MAX_CANDIDATE_ROWS,
            rows.len()
        )));
    }

    let mut builder = StatsBuilder::new();
    for row in rows {
        let Some((label, value)) = read_stat_row(row) else {
            continue;
        };
        tracing::debug!("Found stat {:?} = {}", label, value);

        let field = StatField::from_label(&label);
        if field == StatField::Unrecognized {
            continue;
        }
        if let Some(previous) = builder.set(field, value) {
            tracing::debug!("Stat {} repeated, replacing {} with {}", field, previous, value);
        }
    }

    builder.build()
}

/// Returns the (label, value) pair of a data row
///
/// `None` for rows without exactly two `th > div` cells, and for rows where
/// the label or the numeric value is missing.
fn read_stat_row(row: ElementRef<'_>) -> Option<(String, i32)> {
    let cells: Vec<_> = child_elements(row, "th")
        .flat_map(|th| child_elements(th, "div"))
        .collect();
    let [label_cell, value_cell] = cells.as_slice() else {
        return None;
    };

    let label = first_child(*label_cell, "a")
        .and_then(|anchor| first_child(anchor, "span"))
        .and_then(full_text)?;

    let raw_value = own_text(*value_cell)?;
    match raw_value.parse::<i32>() {
        Ok(value) => Some((label, value)),
        Err(_) => {
            tracing::debug!("Ignoring non-numeric value {:?} for {:?}", raw_value, label);
            None
        }
    }
}
