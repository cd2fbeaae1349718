use crate::crawler::ExtractedRecord;
use crate::sink::traits::{RecordSink, SinkError, SinkResult};
use std::sync::Mutex;

/// Keeps every accepted record in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<ExtractedRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records accepted so far
    pub fn records(&self) -> Vec<ExtractedRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordSink for MemorySink {
    fn accept(&self, record: &ExtractedRecord) -> SinkResult<()> {
        self.records
            .lock()
            .map_err(|e| SinkError::Lock(e.to_string()))?
            .push(record.clone());
        Ok(())
    }
}
