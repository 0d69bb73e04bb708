pub mod json_lines;
pub mod pcap_archive;
pub mod worker;

pub use json_lines::JsonLinesRecordSink;
pub use pcap_archive::PcapArchiveSink;
pub use worker::{spawn_sink_worker, SinkWorkerReport};

use qrmatch_application::ports::SinkError;
use std::io;

/// A writer that would block is a full sink; anything else means the
/// destination is gone.
pub(crate) fn io_sink_error(e: io::Error) -> SinkError {
    match e.kind() {
        io::ErrorKind::WouldBlock => SinkError::Full,
        _ => SinkError::Fatal(e.to_string()),
    }
}
