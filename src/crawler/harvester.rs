//! Harvest run coordination
//!
//! One run goes through these steps:
//! - Load the records already in the store
//! - Fetch the index page and extract references from it
//! - Fetch every reference not yet stored, in batches
//! - Merge the new records into the known ones and save the result
//!
//! A failure to obtain the index aborts the run before anything is written.
//! Failures and cancellation during the batched phase only shorten it: what
//! was fetched up to then is still saved.

use crate::config::Config;
use crate::crawler::fetcher::{DocumentFetcher, HttpFetcher};
use crate::crawler::orchestrator::{BatchOrchestrator, BatchSettings, StopReason};
use crate::extract::{extract_list, FieldExtractor};
use crate::model::{to_record_map, Reference};
use crate::storage::{merge, JsonRecordStore, RecordStore};
use crate::HarvestError;
use std::collections::HashSet;
use std::fmt;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What a harvest run did
#[derive(Debug, Default)]
pub struct HarvestSummary {
    /// Records in the store before the run
    pub previously_known: usize,

    /// References found on the index page
    pub listed: usize,

    /// Records fetched during this run
    pub fetched: usize,

    /// Records in the store after the run
    pub total: usize,

    /// Batches that completed
    pub batches_completed: usize,

    /// Set when the run stopped before fetching every pending reference
    pub stopped: Option<StopReason>,
}

impl HarvestSummary {
    /// Returns true if every pending reference was fetched
    pub fn is_complete(&self) -> bool {
        self.stopped.is_none()
    }
}

impl fmt::Display for HarvestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} listed, {} already known, {} fetched in {} batches, {} stored",
            self.listed, self.previously_known, self.fetched, self.batches_completed, self.total
        )?;
        if let Some(reason) = &self.stopped {
            write!(f, " (stopped early: {})", reason)?;
        }
        Ok(())
    }
}

/// Runs harvests against one source and one record store
pub struct Harvester {
    config: Config,
    fetcher: Box<dyn DocumentFetcher>,
    extractor: FieldExtractor,
    store: Box<dyn RecordStore>,
}

impl Harvester {
    /// Creates a harvester that fetches over HTTP and stores to the
    /// configured JSON file
    ///
    /// # Errors
    ///
    /// Returns `HarvestError::Reqwest` if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let fetcher = HttpFetcher::from_config(&config.user_agent, &config.fetch)?;
        let store = JsonRecordStore::new(&config.output.records_path);
        Ok(Self::with_parts(config, Box::new(fetcher), Box::new(store)))
    }

    /// Creates a harvester from explicit parts
    pub fn with_parts(
        config: Config,
        fetcher: Box<dyn DocumentFetcher>,
        store: Box<dyn RecordStore>,
    ) -> Self {
        Self {
            config,
            fetcher,
            extractor: FieldExtractor::default(),
            store,
        }
    }

    /// Replaces the stats extractor
    pub fn with_extractor(mut self, extractor: FieldExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Absolute URL of the index page
    pub fn list_url(&self) -> Result<Url, HarvestError> {
        let base = Url::parse(&self.config.source.base_url)?;
        Ok(base.join(&self.config.source.list_path)?)
    }

    /// Fetches the index page and extracts every reference on it
    ///
    /// # Errors
    ///
    /// Transport errors and `HarvestError::Extract` if the index does not
    /// have the expected shape.
    pub async fn fetch_references(&self) -> Result<Vec<Reference>, HarvestError> {
        let list_url = self.list_url()?;
        tracing::info!("Fetching index from `{}`", list_url);

        let body = self.fetcher.fetch(list_url.as_str()).await?;
        let base = Url::parse(&self.config.source.base_url)?;
        extract_list(&body, &base).map_err(|source| HarvestError::Extract {
            reference: list_url.to_string(),
            source,
        })
    }

    /// Performs one harvest run
    ///
    /// # Arguments
    ///
    /// * `cancel` - Cancelling this token stops the run; the batch in flight
    ///   is dropped and records of completed batches are still saved
    ///
    /// # Returns
    ///
    /// * `Ok(HarvestSummary)` - The run finished, possibly stopped early
    /// * `Err(HarvestError)` - The store could not be read or written, or
    ///   the index could not be obtained
    pub async fn run(&self, cancel: CancellationToken) -> Result<HarvestSummary, HarvestError> {
        let existing = self.store.load()?;
        let already_known: HashSet<u32> = existing.keys().copied().collect();
        tracing::info!("Already fetched {} entries", already_known.len());

        let mut summary = HarvestSummary {
            previously_known: existing.len(),
            total: existing.len(),
            ..Default::default()
        };

        let references = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::warn!("Interrupted while fetching the index. Nothing to save");
                summary.stopped = Some(StopReason::Cancelled);
                return Ok(summary);
            }
            result = self.fetch_references() => result?,
        };
        summary.listed = references.len();
        tracing::info!("Found {} entries", references.len());

        let orchestrator = BatchOrchestrator::new(
            self.fetcher.as_ref(),
            &self.extractor,
            BatchSettings::from_config(&self.config),
            cancel,
        );
        let report = orchestrator
            .run_with_report(&references, &already_known)
            .await;
        tracing::info!("Fetched {} entries", report.records.len());

        summary.fetched = report.records.len();
        summary.batches_completed = report.batches_completed;
        summary.stopped = report.stopped;

        let merged = merge(existing, to_record_map(report.records));
        self.store.save(&merged)?;
        summary.total = merged.len();

        Ok(summary)
    }
}

/// Runs a complete harvest with the HTTP fetcher and JSON store
///
/// # Example
///
/// ```no_run
/// use dex_harvest::config::Config;
/// use dex_harvest::crawler::run_harvest;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = run_harvest(Config::default(), CancellationToken::new()).await?;
/// println!("{}", summary);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(
    config: Config,
    cancel: CancellationToken,
) -> Result<HarvestSummary, HarvestError> {
    Harvester::new(config)?.run(cancel).await
}
