//! Record sink trait and the in-memory sink
//!
//! A sink receives classified records in the order the driver emits them:
//! document order within a page, page order within a sequence.

use crate::classify::TypedRecord;
use thiserror::Error;

/// Errors that can occur while writing records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Downstream consumer of classified records
pub trait RecordSink {
    /// Takes ownership of one record
    fn accept(&mut self, record: TypedRecord) -> SinkResult<()>;

    /// Flushes buffered output; called once after the last record
    fn finish(&mut self) -> SinkResult<()> {
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn accept(&mut self, record: TypedRecord) -> SinkResult<()> {
        (**self).accept(record)
    }

    fn finish(&mut self) -> SinkResult<()> {
        (**self).finish()
    }
}

/// Collects records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<TypedRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[TypedRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TypedRecord> {
        self.records
    }
}

impl RecordSink for MemorySink {
    fn accept(&mut self, record: TypedRecord) -> SinkResult<()> {
        self.records.push(record);
        Ok(())
    }
}
