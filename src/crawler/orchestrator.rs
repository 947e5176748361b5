//! Batched, concurrent fetch-and-extract over a list of references
//!
//! Work is split into consecutive batches. Within a batch up to
//! `concurrency` detail pages are fetched at once; the batch then acts as a
//! barrier before the next one starts, after a pause.
//!
//! # Failure policy
//!
//! A batch is all-or-nothing. If any entry in it fails (transport error,
//! unexpected structure, incomplete stats) or the run is cancelled while the
//! batch is in flight, every result of that batch is dropped and the run
//! stops. The caller gets the records of all batches completed before it.
//! Cancellation during the pause between batches stops the run the same way.

use crate::config::Config;
use crate::crawler::fetcher::DocumentFetcher;
use crate::extract::FieldExtractor;
use crate::model::{Record, Reference};
use crate::HarvestError;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Sizing and pacing of a batched run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    /// Maximum number of entries fetched at the same time
    pub concurrency: usize,

    /// Number of entries per batch
    pub batch_size: usize,

    /// Wait between two batches
    pub pause: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl BatchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            concurrency: config.harvester.concurrency,
            batch_size: config.harvester.batch_size,
            pause: config.pause(),
        }
    }
}

/// Why a run ended before all batches were processed
#[derive(Debug)]
pub enum StopReason {
    /// The cancellation token fired
    Cancelled,

    /// An entry of batch `batch` (1-based) failed
    Failed { batch: usize, error: HarvestError },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "cancelled"),
            Self::Failed { batch, error } => write!(f, "batch {} failed: {}", batch, error),
        }
    }
}

/// Outcome of a batched run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Records of every completed batch, in list order
    pub records: Vec<Record>,

    /// Number of batches that completed
    pub batches_completed: usize,

    /// Number of batches the pending work was split into
    pub total_batches: usize,

    /// Set when the run stopped early
    pub stopped: Option<StopReason>,
}

/// Drives the field extractor over references in paced batches
pub struct BatchOrchestrator<'a> {
    fetcher: &'a dyn DocumentFetcher,
    extractor: &'a FieldExtractor,
    settings: BatchSettings,
    cancel: CancellationToken,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(
        fetcher: &'a dyn DocumentFetcher,
        extractor: &'a FieldExtractor,
        settings: BatchSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            settings,
            cancel,
        }
    }

    /// Fetches every reference whose id is not in `already_known`
    ///
    /// Returns the records of all batches that completed; never fails.
    pub async fn run(&self, references: &[Reference], already_known: &HashSet<u32>) -> Vec<Record> {
        self.run_with_report(references, already_known).await.records
    }

    /// Same as [`run`](Self::run), also reporting how and why the run ended
    pub async fn run_with_report(
        &self,
        references: &[Reference],
        already_known: &HashSet<u32>,
    ) -> BatchReport {
        let pending: Vec<&Reference> = references
            .iter()
            .filter(|reference| !already_known.contains(&reference.id))
            .collect();

        let batch_size = self.settings.batch_size.max(1);
        let mut report = BatchReport {
            total_batches: pending.len().div_ceil(batch_size),
            ..Default::default()
        };

        let mut remaining = pending.len();
        for (index, batch) in pending.chunks(batch_size).enumerate() {
            let batch_num = index + 1;
            tracing::info!(
                "Fetching batch {}/{} ({} entries)",
                batch_num,
                report.total_batches,
                batch.len()
            );

            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                result = self.process_batch(batch) => Some(result),
            };

            match outcome {
                None => {
                    tracing::warn!(
                        "Interrupted during batch {}. Returning {} fetched entries",
                        batch_num,
                        report.records.len()
                    );
                    report.stopped = Some(StopReason::Cancelled);
                    return report;
                }
                Some(Err(error)) => {
                    tracing::error!(
                        "Failed to fetch batch {} ({} entries): {}",
                        batch_num,
                        batch.len(),
                        error
                    );
                    report.stopped = Some(StopReason::Failed {
                        batch: batch_num,
                        error,
                    });
                    return report;
                }
                Some(Ok(records)) => {
                    report.records.extend(records);
                    report.batches_completed += 1;
                }
            }

            remaining -= batch.len();
            if remaining > 0 && !self.pause(remaining).await {
                tracing::warn!(
                    "Interrupted. Returning {} fetched entries",
                    report.records.len()
                );
                report.stopped = Some(StopReason::Cancelled);
                return report;
            }
        }

        report
    }

    /// Waits between batches; returns false if cancelled meanwhile
    async fn pause(&self, remaining: usize) -> bool {
        tracing::debug!(
            "Pausing for {:?} before continuing to fetch {} entries",
            self.settings.pause,
            remaining
        );
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(self.settings.pause) => true,
        }
    }

    /// Processes one batch; the first failing entry fails the whole batch
    async fn process_batch(&self, batch: &[&Reference]) -> Result<Vec<Record>, HarvestError> {
        stream::iter(batch.iter().copied())
            .map(|reference| self.process_reference(reference))
            .buffered(self.settings.concurrency.max(1))
            .try_collect()
            .await
    }

    /// Fetches one detail page and turns it into a record
    async fn process_reference(&self, reference: &Reference) -> Result<Record, HarvestError> {
        let span = tracing::info_span!("fetch", entry = %reference);
        async move {
            tracing::info!("Fetching from `{}`", reference.url);
            let body = self.fetcher.fetch(&reference.url).await?;
            tracing::debug!("Received body");

            let base = self.extractor.extract_fields(&body).map_err(|source| {
                tracing::error!("Failed to parse base stats table: {}", source);
                HarvestError::Extract {
                    reference: reference.to_string(),
                    source,
                }
            })?;

            Ok(Record::from_reference(reference, base))
        }
        .instrument(span)
        .await
    }
}
