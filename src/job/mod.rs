//! Crawl jobs
//!
//! This module turns inbound crawl requests into site jobs and runs them:
//! - `request`: payload parsing and validation into `SiteJob`s
//! - `runner`: drives a batch of sites through the engine into a sink
//! - `registry`: process-wide supervisor, a new submission cancels the old

mod registry;
mod request;
mod runner;
mod site;

pub use registry::{JobHandle, JobId, JobRegistry};
pub use request::{parse_request, RequestDefaults};
pub use runner::{run_batch, BatchSummary, SiteSummary};
pub use site::SiteJob;
