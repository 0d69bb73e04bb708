use qrmatch_application::ports::{RecordSink, SinkError};
use qrmatch_application::services::{Counter, SinkQueue, StatisticsAggregator};
use qrmatch_domain::SinkKind;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// What a sink worker did before its queue closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkWorkerReport {
    pub kind: SinkKind,
    pub written: u64,
    pub dropped: u64,
    pub failed: bool,
}

/// Drains one sink queue into its sink on a blocking thread.
///
/// The worker runs until every gate handle is dropped and the queue is
/// empty, then flushes the sink. A fatal sink error closes the queue: the
/// items still queued are counted as drops, and the gate counts everything
/// submitted afterwards.
pub fn spawn_sink_worker(
    queue: SinkQueue,
    sink: Box<dyn RecordSink>,
    stats: Arc<StatisticsAggregator>,
) -> JoinHandle<SinkWorkerReport> {
    tokio::task::spawn_blocking(move || run(queue, sink, stats))
}

fn run(
    mut queue: SinkQueue,
    mut sink: Box<dyn RecordSink>,
    stats: Arc<StatisticsAggregator>,
) -> SinkWorkerReport {
    let kind = queue.kind;
    let drop_counter = Counter::output_drop(kind);
    let mut report = SinkWorkerReport {
        kind,
        written: 0,
        dropped: 0,
        failed: false,
    };

    debug!(sink = %kind, "Sink worker started");

    while let Some(item) = queue.receiver.blocking_recv() {
        match sink.write(item) {
            Ok(()) => report.written += 1,
            Err(SinkError::Full) => {
                stats.increment(drop_counter);
                report.dropped += 1;
            }
            Err(SinkError::Fatal(reason)) => {
                error!(
                    sink = %kind,
                    reason = %reason,
                    "Sink failed; further items for it are dropped"
                );
                stats.increment(drop_counter);
                report.dropped += 1;
                report.failed = true;

                queue.receiver.close();
                while queue.receiver.blocking_recv().is_some() {
                    stats.increment(drop_counter);
                    report.dropped += 1;
                }
                return report;
            }
        }
    }

    if let Err(e) = sink.flush() {
        error!(sink = %kind, error = %e, "Failed to flush sink");
        report.failed = true;
    }

    info!(
        sink = %kind,
        written = report.written,
        dropped = report.dropped,
        "Sink worker finished"
    );
    report
}
