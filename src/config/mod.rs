//! Configuration module for Dynascrape
//!
//! This module handles loading, parsing, and validating the TOML crawler
//! configuration. Per-site crawl requests live in [`crate::job`].
//!
//! # Example
//!
//! ```no_run
//! use dynascrape::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("dynascrape.toml")).unwrap();
//! println!("Fetch timeout: {}s", config.crawler.request_timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, ExtractionConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
