use super::process_packet::{PacketDisposition, ProcessPacketUseCase};
use crate::ports::CaptureSource;
use crate::services::StatisticsAggregator;
use qrmatch_domain::DomainError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Totals for one capture run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRunSummary {
    pub packets: u64,
    pub matched: u64,
    pub stopped_early: bool,
}

/// Drives one capture stream through the pipeline until end of stream or
/// until `stop` is raised. Blocking; run it on a dedicated thread.
pub struct RunCaptureUseCase {
    pipeline: Arc<ProcessPacketUseCase>,
    stats: Arc<StatisticsAggregator>,
    counters_poll_interval: Duration,
}

impl RunCaptureUseCase {
    pub fn new(pipeline: Arc<ProcessPacketUseCase>, stats: Arc<StatisticsAggregator>) -> Self {
        Self {
            pipeline,
            stats,
            counters_poll_interval: Duration::from_secs(1),
        }
    }

    pub fn with_counters_poll_interval(mut self, interval: Duration) -> Self {
        self.counters_poll_interval = interval;
        self
    }

    pub fn execute(
        &self,
        source: &mut dyn CaptureSource,
        stop: &AtomicBool,
    ) -> Result<CaptureRunSummary, DomainError> {
        let mut summary = CaptureRunSummary::default();
        let mut last_poll = Instant::now();

        info!("Capture loop started");

        loop {
            if stop.load(Ordering::Relaxed) {
                summary.stopped_early = true;
                break;
            }

            let Some(packet) = source.next_packet()? else {
                break;
            };

            summary.packets += 1;
            if self.pipeline.execute(packet) == PacketDisposition::Matched {
                summary.matched += 1;
            }

            if last_poll.elapsed() >= self.counters_poll_interval {
                self.poll_capture_counters(source);
                last_poll = Instant::now();
            }
        }

        self.poll_capture_counters(source);

        info!(
            packets = summary.packets,
            matched = summary.matched,
            stopped_early = summary.stopped_early,
            "Capture loop finished"
        );
        Ok(summary)
    }

    fn poll_capture_counters(&self, source: &dyn CaptureSource) {
        if let Some(counters) = source.capture_counters() {
            debug!(
                received = counters.received,
                dropped = counters.dropped,
                if_dropped = counters.if_dropped,
                "Capture counters polled"
            );
            self.stats.record_capture_counters(counters);
        }
    }
}
