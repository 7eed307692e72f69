//! Bounded-concurrency metadata enrichment.
//!
//! Files are fanned out to a [`WorkerPool`] and collected back in completion
//! order. Each item carries its own timeout and panic guard so a failing or
//! stuck provider call becomes a per-file error instead of a lost file.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::FutureExt;
use reelname_core::{MediaFile, MetadataProvider, ProviderError};
use tokio::sync::mpsc;

use crate::error::PipelineError;
use crate::worker_pool::WorkerPool;

/// Default number of concurrent provider calls.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default upper bound on a single provider call.
pub const DEFAULT_ITEM_TIMEOUT: Duration = Duration::from_secs(60);

/// Tuning for a [`MetadataPipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum provider calls in flight. Values below 1 are treated as 1.
    pub concurrency: usize,
    /// Per-file time budget; `None` waits indefinitely.
    pub item_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            item_timeout: Some(DEFAULT_ITEM_TIMEOUT),
        }
    }
}

/// Progress notifications emitted while a batch runs.
#[derive(Debug, Clone)]
pub enum EnrichEvent {
    Started { path: PathBuf },
    Finished { path: PathBuf },
    Failed { path: PathBuf, error: String },
}

/// A file whose metadata lookup failed.
#[derive(Debug)]
pub struct MetadataFailure {
    pub path: PathBuf,
    pub error: ProviderError,
}

/// Outcome of a batch.
///
/// `files` holds every input file (failed ones without metadata), in
/// completion order. Match files to failures by path, never by position.
#[derive(Debug, Default)]
pub struct EnrichReport {
    pub files: Vec<MediaFile>,
    pub failures: Vec<MetadataFailure>,
}

impl EnrichReport {
    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn succeeded(&self) -> usize {
        self.files.len() - self.failures.len()
    }

    /// `Some` when at least one file failed.
    pub fn aggregate_error(&self) -> Option<PipelineError> {
        if self.failures.is_empty() {
            None
        } else {
            Some(PipelineError::SomeFilesFailed {
                failed: self.failures.len(),
                total: self.files.len(),
            })
        }
    }

    /// Restore a deterministic order (by path) before planning.
    pub fn sort_by_path(&mut self) {
        self.files.sort_by(|a, b| a.path.cmp(&b.path));
        self.failures.sort_by(|a, b| a.path.cmp(&b.path));
    }

    pub fn failure_for(&self, path: &std::path::Path) -> Option<&MetadataFailure> {
        self.failures.iter().find(|f| f.path == path)
    }
}

/// Runs a [`MetadataProvider`] over a batch of files with bounded concurrency.
pub struct MetadataPipeline {
    config: PipelineConfig,
    cancelled: Arc<AtomicBool>,
}

impl MetadataPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Shared flag that aborts the batch when set.
    ///
    /// Items already talking to the provider finish (or time out); every item
    /// not yet started fails immediately with [`ProviderError::Cancelled`].
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Enrich every file, recording per-file failures without aborting.
    pub async fn enrich<P>(
        &self,
        files: Vec<MediaFile>,
        provider: Arc<P>,
        events: Option<mpsc::UnboundedSender<EnrichEvent>>,
    ) -> EnrichReport
    where
        P: MetadataProvider + 'static,
    {
        let total = files.len();
        let timeout = self.config.item_timeout;
        let cancelled = self.cancelled.clone();

        let provider_name = provider.name();
        let mut pool = WorkerPool::start(self.config.concurrency, files, move |mut file: MediaFile| {
            let provider = provider.clone();
            let events = events.clone();
            let cancelled = cancelled.clone();
            async move {
                send(&events, EnrichEvent::Started { path: file.path.clone() });
                let outcome = enrich_one(provider.as_ref(), &mut file, timeout, &cancelled).await;
                match &outcome {
                    Ok(()) => send(&events, EnrichEvent::Finished { path: file.path.clone() }),
                    Err(e) => {
                        file.metadata = None;
                        send(
                            &events,
                            EnrichEvent::Failed {
                                path: file.path.clone(),
                                error: e.to_string(),
                            },
                        );
                    }
                }
                (file, outcome)
            }
        });

        log::debug!(
            "Enriching {} files with provider '{}' on {} workers",
            total,
            provider_name,
            pool.workers()
        );

        let mut report = EnrichReport::default();
        while let Some((file, outcome)) = pool.recv().await {
            if let Err(error) = outcome {
                log::debug!("Metadata lookup failed for {}: {}", file.path.display(), error);
                report.failures.push(MetadataFailure {
                    path: file.path.clone(),
                    error,
                });
            }
            report.files.push(file);
        }

        if report.files.len() != total {
            log::warn!(
                "Metadata pipeline returned {} of {} files",
                report.files.len(),
                total
            );
        }
        log::debug!(
            "Metadata enrichment done: {} ok, {} failed",
            report.succeeded(),
            report.failures.len()
        );

        report
    }
}

async fn enrich_one<P: MetadataProvider>(
    provider: &P,
    file: &mut MediaFile,
    timeout: Option<Duration>,
    cancelled: &AtomicBool,
) -> Result<(), ProviderError> {
    if cancelled.load(Ordering::Relaxed) {
        return Err(ProviderError::Cancelled);
    }
    // Queueing for the provider is not part of the lookup's time budget.
    provider.ready().await;
    if cancelled.load(Ordering::Relaxed) {
        return Err(ProviderError::Cancelled);
    }

    let call = AssertUnwindSafe(provider.provide(file)).catch_unwind();
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(r) => r,
            Err(_) => return Err(ProviderError::Timeout(limit.as_secs())),
        },
        None => call.await,
    };

    result.unwrap_or_else(|panic| Err(ProviderError::Panicked(panic_message(panic.as_ref()))))
}

fn send(events: &Option<mpsc::UnboundedSender<EnrichEvent>>, event: EnrichEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
