//! Crawler module for fetching and harvesting detail pages
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching behind the `DocumentFetcher` trait
//! - Batched, concurrent fetching with a cancellable pause between batches
//! - Overall run coordination against the record store

mod fetcher;
mod harvester;
mod orchestrator;

pub use fetcher::{build_http_client, DocumentFetcher, HttpFetcher};
pub use harvester::{run_harvest, HarvestSummary, Harvester};
pub use orchestrator::{BatchOrchestrator, BatchReport, BatchSettings, StopReason};

use crate::config::Config;
use crate::HarvestError;
use tokio_util::sync::CancellationToken;

/// Runs a complete harvest operation
///
/// This is the main entry point for starting a harvest. It will:
/// 1. Load the records already stored
/// 2. Fetch the index page and extract its references
/// 3. Fetch the missing references in batches
/// 4. Save the merged records
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `cancel` - Token that stops the run gracefully when cancelled
///
/// # Returns
///
/// * `Ok(HarvestSummary)` - Harvest ran, possibly stopping early
/// * `Err(HarvestError)` - Harvest failed
pub async fn harvest(
    config: Config,
    cancel: CancellationToken,
) -> Result<HarvestSummary, HarvestError> {
    run_harvest(config, cancel).await
}
