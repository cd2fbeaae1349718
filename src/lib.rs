//! Dynascrape: a rule-driven article crawler
//!
//! This crate walks article listing pages under a pagination budget, follows the
//! item links that declarative selector rules pick out, extracts one record per
//! item page and hands the records to a storage sink.

pub mod config;
pub mod crawler;
pub mod job;
pub mod rules;
pub mod sink;
pub mod url;

use thiserror::Error;

pub use crawler::FetchError;
pub use sink::SinkError;

/// Main error type for Dynascrape operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to start job: {0}")]
    JobStart(String),

    #[error("Job {0} ended abnormally: {1}")]
    JobFailed(u64, String),
}

/// Configuration and request payload errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse request payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector for rule '{field}': {message}")]
    InvalidSelector { field: String, message: String },

    #[error("Missing required rule '{0}'")]
    MissingRule(String),
}

/// Result type alias for Dynascrape operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, ExtractedRecord, FieldValue, RecordStream};
pub use job::{JobRegistry, SiteJob};
pub use rules::{CssQuery, PageQuery, RuleMap};
