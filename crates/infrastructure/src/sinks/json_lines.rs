use super::io_sink_error;
use qrmatch_application::ports::{RecordSink, SinkError};
use qrmatch_domain::{DomainError, SinkItem, StructuredRecord};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

#[derive(Serialize)]
struct JsonLine<'a> {
    #[serde(flatten)]
    record: &'a StructuredRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_us: Option<u64>,
}

impl<'a> From<&'a StructuredRecord> for JsonLine<'a> {
    fn from(record: &'a StructuredRecord) -> Self {
        let latency_us = match record {
            StructuredRecord::Matched(pair) => Some(pair.latency().as_micros() as u64),
            _ => None,
        };
        Self { record, latency_us }
    }
}

/// Writes structured records as newline-delimited JSON, one object per
/// record, tagged by `kind`.
pub struct JsonLinesRecordSink<W: Write> {
    writer: BufWriter<W>,
    written: u64,
}

impl JsonLinesRecordSink<File> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            DomainError::Sink(format!("Failed to create {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), "Structured record output opened");
        Ok(Self::new(file))
    }
}

impl<W: Write> JsonLinesRecordSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            written: 0,
        }
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

impl<W: Write + Send> RecordSink for JsonLinesRecordSink<W> {
    fn write(&mut self, item: SinkItem) -> Result<(), SinkError> {
        let record = match item {
            SinkItem::StructuredRecord(record) => record,
            other => {
                return Err(SinkError::Fatal(format!(
                    "Structured sink received a {} item",
                    other.kind()
                )))
            }
        };

        serde_json::to_writer(&mut self.writer, &JsonLine::from(&record))
            .map_err(|e| SinkError::Fatal(format!("Failed to encode record: {}", e)))?;
        self.writer.write_all(b"\n").map_err(io_sink_error)?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush().map_err(io_sink_error)
    }
}
