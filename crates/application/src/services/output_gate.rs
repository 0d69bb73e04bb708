use super::statistics::{Counter, StatisticsAggregator};
use qrmatch_domain::{SinkItem, SinkKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The sink queue is at capacity.
    QueueFull,
    /// No sink of this kind was configured.
    SinkDisabled,
    /// The sink hit a fatal fault and stopped consuming.
    SinkFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    Dropped(DropReason),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Consumer end of one sink queue, handed to that sink's worker.
#[derive(Debug)]
pub struct SinkQueue {
    pub kind: SinkKind,
    pub receiver: mpsc::Receiver<SinkItem>,
}

#[derive(Debug, Clone, Default)]
struct SinkSenders {
    structured: Option<mpsc::Sender<SinkItem>>,
    raw: Option<mpsc::Sender<SinkItem>>,
    ignored: Option<mpsc::Sender<SinkItem>>,
}

impl SinkSenders {
    fn get(&self, kind: SinkKind) -> Option<&mpsc::Sender<SinkItem>> {
        match kind {
            SinkKind::Structured => self.structured.as_ref(),
            SinkKind::RawArchive => self.raw.as_ref(),
            SinkKind::Ignored => self.ignored.as_ref(),
        }
    }

    fn slot(&mut self, kind: SinkKind) -> &mut Option<mpsc::Sender<SinkItem>> {
        match kind {
            SinkKind::Structured => &mut self.structured,
            SinkKind::RawArchive => &mut self.raw,
            SinkKind::Ignored => &mut self.ignored,
        }
    }
}

#[derive(Debug, Default)]
struct FaultLatch {
    structured: AtomicBool,
    raw: AtomicBool,
    ignored: AtomicBool,
}

impl FaultLatch {
    /// True only for the first caller per sink.
    fn first_report(&self, kind: SinkKind) -> bool {
        let flag = match kind {
            SinkKind::Structured => &self.structured,
            SinkKind::RawArchive => &self.raw,
            SinkKind::Ignored => &self.ignored,
        };
        !flag.swap(true, Ordering::Relaxed)
    }
}

/// Admission point in front of the sinks.
///
/// Each sink has its own bounded queue. `submit` never waits: an item that
/// does not fit is dropped on the spot and charged to the sink's drop
/// counter, so a slow sink can never stall the capture path.
///
/// Clones share the queues. A queue closes once every clone has been
/// dropped, which lets its worker flush and exit.
#[derive(Debug, Clone)]
pub struct OutputGate {
    senders: SinkSenders,
    stats: Arc<StatisticsAggregator>,
    faults: Arc<FaultLatch>,
}

impl OutputGate {
    pub fn builder(stats: Arc<StatisticsAggregator>) -> OutputGateBuilder {
        OutputGateBuilder {
            stats,
            capacities: Vec::new(),
        }
    }

    pub fn is_enabled(&self, kind: SinkKind) -> bool {
        self.senders.get(kind).is_some()
    }

    /// Items currently waiting in the queue for `kind`.
    pub fn queued(&self, kind: SinkKind) -> usize {
        self.senders
            .get(kind)
            .map(|tx| tx.max_capacity() - tx.capacity())
            .unwrap_or(0)
    }

    pub fn submit(&self, item: SinkItem) -> Admission {
        let kind = item.kind();
        let Some(sender) = self.senders.get(kind) else {
            return Admission::Dropped(DropReason::SinkDisabled);
        };

        match sender.try_send(item) {
            Ok(()) => Admission::Admitted,
            Err(TrySendError::Full(_)) => {
                self.stats.increment(Counter::output_drop(kind));
                trace!(sink = %kind, "Sink queue full, item dropped");
                Admission::Dropped(DropReason::QueueFull)
            }
            Err(TrySendError::Closed(_)) => {
                self.stats.increment(Counter::output_drop(kind));
                // The worker reports the fault itself; this only notes the
                // first drop that follows it.
                if self.faults.first_report(kind) {
                    debug!(sink = %kind, "Sink queue closed, dropping its items");
                }
                Admission::Dropped(DropReason::SinkFailed)
            }
        }
    }
}

pub struct OutputGateBuilder {
    stats: Arc<StatisticsAggregator>,
    capacities: Vec<(SinkKind, usize)>,
}

impl OutputGateBuilder {
    /// Enables a sink with a queue of `capacity` items. A zero capacity is
    /// raised to one since the channel cannot be empty-sized.
    pub fn with_sink(mut self, kind: SinkKind, capacity: usize) -> Self {
        self.capacities.retain(|(k, _)| *k != kind);
        self.capacities.push((kind, capacity.max(1)));
        self
    }

    pub fn build(self) -> (OutputGate, Vec<SinkQueue>) {
        let mut senders = SinkSenders::default();
        let mut queues = Vec::with_capacity(self.capacities.len());

        for (kind, capacity) in self.capacities {
            let (tx, rx) = mpsc::channel(capacity);
            *senders.slot(kind) = Some(tx);
            queues.push(SinkQueue { kind, receiver: rx });
        }

        let gate = OutputGate {
            senders,
            stats: self.stats,
            faults: Arc::new(FaultLatch::default()),
        };
        (gate, queues)
    }
}
