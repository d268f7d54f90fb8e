use crate::classify::TypedRecord;
use crate::output::traits::{RecordSink, SinkResult};
use std::collections::HashSet;

/// Drops records identical to one already passed downstream
///
/// Identity is the record's serialized form, so two records only collide
/// when every slot and the source URL match.
pub struct DedupSink<S> {
    inner: S,
    seen: HashSet<String>,
    dropped: u64,
}

impl<S: RecordSink> DedupSink<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            seen: HashSet::new(),
            dropped: 0,
        }
    }

    /// Number of duplicates dropped so far
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: RecordSink> RecordSink for DedupSink<S> {
    fn accept(&mut self, record: TypedRecord) -> SinkResult<()> {
        let key = serde_json::to_string(&record)?;

        if !self.seen.insert(key) {
            self.dropped += 1;
            tracing::debug!("Dropping duplicate record from {}", record.source_url());
            return Ok(());
        }

        self.inner.accept(record)
    }

    fn finish(&mut self) -> SinkResult<()> {
        self.inner.finish()
    }
}
