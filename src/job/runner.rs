//! Batch runner - crawls a request's sites one after another into a sink

use crate::crawler::{CrawlEngine, JobStats};
use crate::job::SiteJob;
use crate::sink::{RecordSink, RunStatus};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Outcome of one site within a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSummary {
    pub website_url: Url,
    pub stats: JobStats,

    /// Records the sink refused to store
    pub sink_failures: u32,
}

/// Outcome of a whole batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Row id of the batch in the sink's run log (0 if the sink keeps none)
    pub run_id: i64,
    pub status: RunStatus,
    pub sites: Vec<SiteSummary>,
}

impl BatchSummary {
    /// Statistics summed over every site that ran
    pub fn totals(&self) -> JobStats {
        let mut total = JobStats::default();
        for site in &self.sites {
            total += site.stats;
        }
        total
    }

    pub fn records_stored(&self) -> u32 {
        self.sites
            .iter()
            .map(|s| s.stats.records_emitted.saturating_sub(s.sink_failures))
            .sum()
    }
}

/// Runs every site job in order, storing records as they arrive
///
/// A site that fails to yield records does not stop the batch. Once `cancel`
/// fires the current site stops dispatching fetches and later sites are not
/// started.
pub async fn run_batch(
    engine: &CrawlEngine,
    sink: Arc<dyn RecordSink>,
    jobs: Vec<SiteJob>,
    cancel: CancellationToken,
) -> BatchSummary {
    let run_id = match sink.begin_batch(jobs.len()) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to record batch start: {}", e);
            0
        }
    };

    let mut sites = Vec::with_capacity(jobs.len());

    for job in jobs {
        if cancel.is_cancelled() {
            tracing::info!("Batch cancelled, not starting {}", job.website_url);
            break;
        }

        let website_url = job.website_url.clone();
        tracing::info!("Starting site {}", website_url);

        let mut stream = engine.run_with_cancel(job, cancel.child_token());
        let mut sink_failures = 0;

        while let Some(record) = stream.next_record().await {
            if let Err(e) = sink.accept(&record) {
                sink_failures += 1;
                tracing::error!("Failed to store {}: {}", record.article_url(), e);
            }
        }

        let stats = stream.finish().await;
        sites.push(SiteSummary {
            website_url,
            stats,
            sink_failures,
        });
    }

    let status = if cancel.is_cancelled() {
        RunStatus::Cancelled
    } else {
        RunStatus::Completed
    };

    if let Err(e) = sink.finish_batch(run_id, status) {
        tracing::error!("Failed to record batch end: {}", e);
    }

    let summary = BatchSummary {
        run_id,
        status,
        sites,
    };
    let totals = summary.totals();
    tracing::info!(
        "Batch {} {}: {} sites, {} records stored, {} fetch failures",
        run_id,
        status.to_db_string(),
        summary.sites.len(),
        summary.records_stored(),
        totals.fetch_failures
    );

    summary
}
