//! Record sinks
//!
//! This module handles the hand-off of extracted records to storage:
//! - The `RecordSink` trait the job runner pushes records into
//! - Mapping records onto the fixed article row with sentinel defaults
//! - A SQLite sink (articles + runs tables) and an in-memory sink

mod article;
mod memory;
mod schema;
mod sqlite;
mod traits;

pub use article::{ArticleRow, ABSENT_SCALAR};
pub use memory::MemorySink;
pub use sqlite::SqliteSink;
pub use traits::{RecordSink, SinkError, SinkResult};

/// Represents a batch run in the database
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub site_count: u32,
    pub status: RunStatus,
}

/// Status of a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns true once the run can no longer change
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}
