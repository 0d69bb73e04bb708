use qrmatch_domain::{DomainError, RawPacket};

/// Counters maintained by the capture layer itself. Values are totals since
/// the capture was opened.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CaptureCounters {
    pub received: u64,
    pub dropped: u64,
    pub if_dropped: u64,
}

/// Source of captured packets for a single stream.
pub trait CaptureSource: Send {
    /// Next packet in capture order, `None` at end of stream.
    fn next_packet(&mut self) -> Result<Option<RawPacket>, DomainError>;

    /// Capture-layer counters, if the transport keeps any.
    fn capture_counters(&self) -> Option<CaptureCounters> {
        None
    }
}
