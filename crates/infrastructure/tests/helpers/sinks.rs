use qrmatch_application::ports::{RecordSink, SinkError};
use qrmatch_domain::SinkItem;
use std::sync::{Arc, Mutex};

/// Keeps every item written; `full_every` makes each n-th write report Full.
#[derive(Default)]
pub struct RecordingSink {
    pub items: Arc<Mutex<Vec<SinkItem>>>,
    pub flushed: Arc<Mutex<bool>>,
    full_every: Option<usize>,
    calls: usize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn full_every(mut self, n: usize) -> Self {
        self.full_every = Some(n);
        self
    }
}

impl RecordSink for RecordingSink {
    fn write(&mut self, item: SinkItem) -> Result<(), SinkError> {
        self.calls += 1;
        if let Some(n) = self.full_every {
            if self.calls % n == 0 {
                return Err(SinkError::Full);
            }
        }
        self.items.lock().unwrap().push(item);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        *self.flushed.lock().unwrap() = true;
        Ok(())
    }
}

/// Accepts `healthy_writes` items, then fails for good.
pub struct FailingSink {
    healthy_writes: usize,
    calls: usize,
}

impl FailingSink {
    pub fn after(healthy_writes: usize) -> Self {
        Self {
            healthy_writes,
            calls: 0,
        }
    }
}

impl RecordSink for FailingSink {
    fn write(&mut self, _item: SinkItem) -> Result<(), SinkError> {
        self.calls += 1;
        if self.calls > self.healthy_writes {
            return Err(SinkError::Fatal("disk full".to_string()));
        }
        Ok(())
    }
}
