use qrmatch_domain::SinkItem;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The destination cannot take this item right now; the item is lost
    /// but the sink keeps running.
    #[error("Sink is full")]
    Full,

    /// The destination is unusable; the sink stops.
    #[error("Sink failed: {0}")]
    Fatal(String),
}

/// Writer at the far end of an output queue. Each sink is driven by exactly
/// one worker, so implementations need no internal locking.
pub trait RecordSink: Send {
    fn write(&mut self, item: SinkItem) -> Result<(), SinkError>;

    /// Flushes buffered output. Called once when the queue closes.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}
