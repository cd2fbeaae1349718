//! Crawl engine - drives one site job to completion
//!
//! The engine owns the job's frontier and is the only place it is touched, so
//! the pagination budget stays exact even with several fetches in flight:
//! - Listing entries claim budget when they are dispatched
//! - Listing pages queue their item links and at most one next page
//! - Item pages become records sent down the job's record stream
//! - Failed fetches are logged and dropped; the job carries on

use crate::config::Config;
use crate::crawler::extract::{extract_item, extract_listing};
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::frontier::{Frontier, FrontierEntry, PageKind, PushOutcome};
use crate::crawler::record::ExtractedRecord;
use crate::crawler::stats::JobStats;
use crate::job::SiteJob;
use crate::rules::{CssQuery, Document, PageQuery};
use crate::ScrapeError;
use futures::stream::{FuturesUnordered, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Tunables shared by every job an engine runs
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Maximum number of fetches in flight per job
    pub max_concurrent_fetches: usize,

    /// Drop URLs already queued during the same job
    pub dedupe_urls: bool,

    /// Records buffered before the engine waits for the consumer
    pub channel_capacity: usize,

    /// Item rule keys that collect every match
    pub list_fields: Vec<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl EngineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_concurrent_fetches: config.crawler.max_concurrent_fetches.max(1),
            dedupe_urls: config.crawler.dedupe_urls,
            channel_capacity: config.crawler.channel_capacity.max(1),
            list_fields: config.extraction.list_fields.clone(),
        }
    }
}

/// Crawl engine: frontier + fetcher + rules
#[derive(Clone)]
pub struct CrawlEngine {
    fetcher: Arc<dyn PageFetcher>,
    query: Arc<dyn PageQuery>,
    options: Arc<EngineOptions>,
}

impl CrawlEngine {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        query: Arc<dyn PageQuery>,
        options: EngineOptions,
    ) -> Self {
        Self {
            fetcher,
            query,
            options: Arc::new(options),
        }
    }

    /// Builds an engine with the HTTP fetcher and CSS queries
    pub fn from_config(config: &Config) -> Result<Self, ScrapeError> {
        let fetcher = HttpFetcher::from_config(&config.crawler, &config.user_agent)?;
        Ok(Self::new(
            Arc::new(fetcher),
            Arc::new(CssQuery::new()),
            EngineOptions::from_config(config),
        ))
    }

    /// The query capability jobs are validated against
    pub fn query(&self) -> &dyn PageQuery {
        self.query.as_ref()
    }

    /// Starts a job and returns its record stream
    ///
    /// Must be called from within a Tokio runtime.
    pub fn run(&self, job: SiteJob) -> RecordStream {
        self.run_with_cancel(job, CancellationToken::new())
    }

    /// Starts a job that stops dispatching fetches once `cancel` fires
    pub fn run_with_cancel(&self, job: SiteJob, cancel: CancellationToken) -> RecordStream {
        let (tx, rx) = mpsc::channel(self.options.channel_capacity);
        let worker = JobWorker {
            fetcher: self.fetcher.clone(),
            query: self.query.clone(),
            options: self.options.clone(),
            job,
        };
        let handle = tokio::spawn(worker.drive(tx, cancel));
        RecordStream { rx, handle }
    }
}

/// Lazy, finite stream of records produced by one job
///
/// Drain it with [`RecordStream::next_record`] (or as a `Stream`), then call
/// [`RecordStream::finish`] for the job's statistics. Dropping the stream
/// early stops the job.
pub struct RecordStream {
    rx: mpsc::Receiver<ExtractedRecord>,
    handle: JoinHandle<JobStats>,
}

impl RecordStream {
    /// Waits for the next record; None once the job has finished
    pub async fn next_record(&mut self) -> Option<ExtractedRecord> {
        self.rx.recv().await
    }

    /// Waits for the job to finish and returns its statistics
    pub async fn finish(self) -> JobStats {
        let RecordStream { rx, handle } = self;
        drop(rx);
        match handle.await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!("Crawl task ended abnormally: {}", e);
                JobStats::default()
            }
        }
    }

    /// Drains every record, then returns them with the job's statistics
    pub async fn collect_all(mut self) -> (Vec<ExtractedRecord>, JobStats) {
        let mut records = Vec::new();
        while let Some(record) = self.next_record().await {
            records.push(record);
        }
        let stats = self.finish().await;
        (records, stats)
    }
}

impl Stream for RecordStream {
    type Item = ExtractedRecord;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// State owned by the task driving a single job
struct JobWorker {
    fetcher: Arc<dyn PageFetcher>,
    query: Arc<dyn PageQuery>,
    options: Arc<EngineOptions>,
    job: SiteJob,
}

impl JobWorker {
    async fn drive(self, tx: mpsc::Sender<ExtractedRecord>, cancel: CancellationToken) -> JobStats {
        let mut stats = JobStats::default();
        let mut frontier = Frontier::new(self.job.max_pagination, self.options.dedupe_urls);

        for url in self.job.seed_urls() {
            if frontier.push_seed(url.clone()) == PushOutcome::BudgetExhausted {
                stats.listing_skipped += 1;
            }
        }

        tracing::info!(
            "Crawling {} (budget {} listing pages, {} seeds queued)",
            self.job.website_url,
            self.job.max_pagination,
            frontier.len()
        );

        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < self.options.max_concurrent_fetches && !cancel.is_cancelled() {
                let Some(entry) = frontier.pop() else {
                    break;
                };

                if entry.kind == PageKind::Listing && !frontier.claim_listing() {
                    stats.listing_skipped += 1;
                    if stats.listing_skipped == 1 {
                        tracing::info!(
                            "Reached max pagination limit ({}) for {}, skipping {}",
                            self.job.max_pagination,
                            self.job.website_url,
                            entry.url
                        );
                    } else {
                        tracing::debug!("Pagination budget spent, skipping {}", entry.url);
                    }
                    continue;
                }

                tracing::debug!("Fetching {:?} {}", entry.kind, entry.url);
                let fetcher = self.fetcher.clone();
                in_flight.push(async move {
                    let result = fetcher.fetch(&entry.url).await;
                    (entry, result)
                });
            }

            if in_flight.is_empty() {
                break;
            }

            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = in_flight.next() => next,
            };
            let Some((entry, result)) = next else {
                break;
            };

            let doc = match result {
                Ok(doc) => doc,
                Err(e) => {
                    stats.fetch_failures += 1;
                    tracing::warn!("Skipping {:?} page: {}", entry.kind, e);
                    continue;
                }
            };

            match entry.kind {
                PageKind::Listing => {
                    stats.listing_fetched += 1;
                    self.expand_listing(&mut frontier, &entry, &doc, &mut stats);
                }
                PageKind::Item => {
                    stats.items_fetched += 1;
                    let record = extract_item(
                        self.query.as_ref(),
                        &doc,
                        &self.job.item_rules,
                        &self.options.list_fields,
                    );

                    let sent = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        sent = tx.send(record) => sent,
                    };
                    if sent.is_err() {
                        tracing::debug!("Record consumer went away, stopping {}", self.job.website_url);
                        break;
                    }
                    stats.records_emitted += 1;
                }
            }
        }

        stats.cancelled = cancel.is_cancelled();
        if stats.cancelled {
            tracing::info!(
                "Crawl of {} cancelled ({} in flight dropped, {} queued)",
                self.job.website_url,
                in_flight.len(),
                frontier.len()
            );
        } else {
            tracing::info!(
                "Finished {}: {} listing pages, {} records, {} failures",
                self.job.website_url,
                stats.listing_fetched,
                stats.records_emitted,
                stats.fetch_failures
            );
        }

        stats
    }

    /// Queues the item links and next page found on a listing page
    fn expand_listing(
        &self,
        frontier: &mut Frontier,
        entry: &FrontierEntry,
        doc: &Document,
        stats: &mut JobStats,
    ) {
        let links = extract_listing(self.query.as_ref(), doc, &self.job.list_rules);

        if links.items.is_empty() {
            stats.empty_listings += 1;
            tracing::warn!("No article links found on {}", doc.url);
            return;
        }

        tracing::debug!("Found {} article links on {}", links.items.len(), doc.url);
        for url in links.items {
            frontier.push(FrontierEntry::item(url, entry.depth + 1));
        }

        if let Some(next) = links.next_page {
            // Continuation of the same listing, not a new depth level
            match frontier.push(FrontierEntry::listing(next.clone(), entry.depth)) {
                PushOutcome::Queued => tracing::debug!("Next page {}", next),
                PushOutcome::BudgetExhausted => {
                    stats.listing_skipped += 1;
                    tracing::debug!("Not following {}: pagination budget spent", next);
                }
                PushOutcome::AlreadySeen => {
                    tracing::debug!("Not following {}: already visited", next);
                }
            }
        }
    }
}
