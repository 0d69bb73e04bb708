mod capture_source;
mod packet_decoder;
mod record_sink;

pub use capture_source::{CaptureCounters, CaptureSource};
pub use packet_decoder::{Decoded, PacketDecoder};
pub use record_sink::{RecordSink, SinkError};
