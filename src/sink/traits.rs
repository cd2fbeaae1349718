//! Sink trait and error types

use crate::crawler::ExtractedRecord;
use crate::sink::RunStatus;
use thiserror::Error;

/// Errors that can occur while persisting records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Sink lock poisoned: {0}")]
    Lock(String),

    #[error("Sink is closed")]
    Closed,
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Receives extracted records in emission order
///
/// Implementations must be safe to call from several tasks at once.
/// Missing fields are the sink's concern: records carry `None` or empty
/// lists, never sentinels.
pub trait RecordSink: Send + Sync {
    /// Persists a single record
    fn accept(&self, record: &ExtractedRecord) -> SinkResult<()>;

    /// Marks the start of a batch and returns its run id
    fn begin_batch(&self, site_count: usize) -> SinkResult<i64> {
        let _ = site_count;
        Ok(0)
    }

    /// Marks the end of a batch
    fn finish_batch(&self, run_id: i64, status: RunStatus) -> SinkResult<()> {
        let _ = (run_id, status);
        Ok(())
    }
}
