//! Crawler module for rule-driven page traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with redirect resolution and error classification
//! - The per-job URL frontier and pagination budget
//! - Listing and item rule application
//! - The crawl engine that ties them together and streams records

mod engine;
mod extract;
mod fetcher;
mod frontier;
mod record;
mod stats;

pub use engine::{CrawlEngine, EngineOptions, RecordStream};
pub use extract::{extract_item, extract_listing, ListingLinks};
pub use fetcher::{build_http_client, FetchError, HttpFetcher, PageFetcher};
pub use frontier::{Frontier, FrontierEntry, PageKind, PushOutcome};
pub use record::{ExtractedRecord, FieldValue, ARTICLE_URL_FIELD};
pub use stats::{print_statistics, JobStats};
