//! Strategies for finding the base stats table in a detail page
//!
//! A detail page has no stable id or class on the table we want, so it is
//! found through its surroundings instead. Each strategy is a
//! [`TableLocator`]; the field extractor tries them in priority order and
//! uses the first table found.

use crate::extract::tree::{child_elements, full_text};
use scraper::{ElementRef, Html};

/// Marker phrase the stats section heading must contain (lowercase)
pub const STATS_MARKER: &str = "stats";

/// Finds a candidate data table within a document
pub trait TableLocator: Send + Sync {
    /// Short description used in log messages
    fn describe(&self) -> String;

    /// Returns the table this strategy points at, if any
    fn locate<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>>;
}

/// Finds the first table that follows a heading whose text mentions a marker
///
/// The heading must be of a fixed level (`h3`, `h4`, ...) and carry the
/// marker, compared case-insensitively, in one of its `span` children. The
/// table must be a later sibling of the heading.
#[derive(Debug, Clone)]
pub struct HeadingLocator {
    tag: &'static str,
    marker: String,
}

impl HeadingLocator {
    /// Creates a locator for headings of `level` (1 to 6, clamped)
    pub fn new(level: u8, marker: &str) -> Self {
        let tag = match level.clamp(1, 6) {
            1 => "h1",
            2 => "h2",
            3 => "h3",
            4 => "h4",
            5 => "h5",
            _ => "h6",
        };
        Self {
            tag,
            marker: marker.to_lowercase(),
        }
    }

    fn heading_matches(&self, heading: ElementRef<'_>) -> bool {
        child_elements(heading, "span")
            .filter_map(full_text)
            .any(|text| text.to_lowercase().contains(&self.marker))
    }
}

impl TableLocator for HeadingLocator {
    fn describe(&self) -> String {
        format!("<{}> containing '{}'", self.tag, self.marker)
    }

    fn locate<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|element| element.value().name() == self.tag)
            .filter(|heading| self.heading_matches(*heading))
            .find_map(|heading| {
                heading
                    .next_siblings()
                    .filter_map(ElementRef::wrap)
                    .find(|sibling| sibling.value().name() == "table")
            })
    }
}

/// The strategies used when none are configured: `h4` headings first, then
/// the more general `h3`
pub fn default_locators() -> Vec<Box<dyn TableLocator>> {
    vec![
        Box::new(HeadingLocator::new(4, STATS_MARKER)),
        Box::new(HeadingLocator::new(3, STATS_MARKER)),
    ]
}
