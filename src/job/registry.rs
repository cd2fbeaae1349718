//! Job supervisor
//!
//! Only one batch runs at a time. Submitting a new batch cancels whatever is
//! still running and starts the new one without waiting for the old one to
//! wind down.

use crate::crawler::CrawlEngine;
use crate::job::request::{parse_request, RequestDefaults};
use crate::job::runner::{run_batch, BatchSummary};
use crate::job::SiteJob;
use crate::sink::RecordSink;
use crate::ScrapeError;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Identifier handed out per submission, increasing from 1
pub type JobId = u64;

struct ActiveJob {
    id: JobId,
    cancel: CancellationToken,
    done: Arc<AtomicBool>,
}

/// Handle to a submitted batch
pub struct JobHandle {
    id: JobId,
    cancel: CancellationToken,
    handle: JoinHandle<BatchSummary>,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Requests cancellation; the batch stops at its next dispatch point
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this batch when fired
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the batch to end and returns its summary
    pub async fn wait(self) -> Result<BatchSummary, ScrapeError> {
        self.handle
            .await
            .map_err(|e| ScrapeError::JobFailed(self.id, e.to_string()))
    }
}

/// Process-wide owner of the single active crawl batch
pub struct JobRegistry {
    engine: CrawlEngine,
    sink: Arc<dyn RecordSink>,
    defaults: RequestDefaults,
    active: Mutex<Option<ActiveJob>>,
    next_id: AtomicU64,
}

impl JobRegistry {
    pub fn new(engine: CrawlEngine, sink: Arc<dyn RecordSink>, defaults: RequestDefaults) -> Self {
        Self {
            engine,
            sink,
            defaults,
            active: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Parses a request payload and submits it
    ///
    /// A malformed payload is rejected before anything is cancelled, so the
    /// running batch survives a bad submission.
    pub fn submit_payload(&self, payload: &str) -> Result<JobHandle, ScrapeError> {
        let jobs = parse_request(payload, self.defaults, self.engine.query())?;
        self.submit(jobs)
    }

    /// Cancels the active batch (if any) and starts `jobs` as the new one
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, jobs: Vec<SiteJob>) -> Result<JobHandle, ScrapeError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ScrapeError::JobStart(e.to_string()))?;

        let mut active = self
            .active
            .lock()
            .map_err(|e| ScrapeError::JobStart(format!("Registry lock poisoned: {}", e)))?;

        if let Some(previous) = active.take() {
            if !previous.done.load(Ordering::Acquire) {
                tracing::info!("Cancelling job {} in favour of a new submission", previous.id);
                previous.cancel.cancel();
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let done = Arc::new(AtomicBool::new(false));

        tracing::info!("Starting job {} with {} sites", id, jobs.len());

        let engine = self.engine.clone();
        let sink = self.sink.clone();
        let token = cancel.clone();
        let finished = done.clone();
        let handle = runtime.spawn(async move {
            let summary = run_batch(&engine, sink, jobs, token).await;
            finished.store(true, Ordering::Release);
            tracing::info!("Job {} ended ({})", id, summary.status.to_db_string());
            summary
        });

        *active = Some(ActiveJob {
            id,
            cancel: cancel.clone(),
            done,
        });

        Ok(JobHandle { id, cancel, handle })
    }

    /// Cancels the active batch, returning its id if one was still running
    pub fn cancel_active(&self) -> Option<JobId> {
        let mut active = self.active.lock().ok()?;
        let job = active.take()?;
        if job.done.load(Ordering::Acquire) {
            return None;
        }
        job.cancel.cancel();
        Some(job.id)
    }

    /// Id of the batch that is still running, if any
    pub fn active_job(&self) -> Option<JobId> {
        let active = self.active.lock().ok()?;
        active
            .as_ref()
            .filter(|job| !job.done.load(Ordering::Acquire))
            .map(|job| job.id)
    }
}
