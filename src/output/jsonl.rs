use crate::classify::TypedRecord;
use crate::output::traits::{RecordSink, SinkResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One output line: the record's fields plus the time it was written
#[derive(Serialize)]
struct Line<'a> {
    #[serde(flatten)]
    record: &'a TypedRecord,
    crawl_time: String,
}

/// Writes one JSON object per line
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: u64,
}

impl JsonLinesSink<BufWriter<File>> {
    /// Creates (or truncates) the output file at `path`
    pub fn create(path: &Path) -> SinkResult<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of lines written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_at(&mut self, record: &TypedRecord, now: DateTime<Utc>) -> SinkResult<()> {
        let line = Line {
            record,
            crawl_time: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        };

        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn accept(&mut self, record: TypedRecord) -> SinkResult<()> {
        self.write_at(&record, Utc::now())?;
        tracing::debug!(
            "Wrote {} record from {}: {}",
            record.output_type(),
            record.source_url(),
            record.label().unwrap_or("-")
        );
        Ok(())
    }

    fn finish(&mut self) -> SinkResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
