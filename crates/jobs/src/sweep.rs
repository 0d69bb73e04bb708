use qrmatch_application::services::{OutputGate, SharedCorrelator};
use qrmatch_application::use_cases::emit_timed_out;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const DEFAULT_SWEEP_INTERVAL_MS: u64 = 1000;

/// Ages out pending queries while the capture stream is quiet.
///
/// Traffic already sweeps the correlator as it arrives; this job covers the
/// gaps by sweeping at the estimated capture time on a timer.
pub struct SweepJob {
    correlator: SharedCorrelator,
    gate: OutputGate,
    interval: Duration,
    shutdown: CancellationToken,
}

impl SweepJob {
    pub fn new(correlator: SharedCorrelator, gate: OutputGate) -> Self {
        Self {
            correlator,
            gate,
            interval: Duration::from_millis(DEFAULT_SWEEP_INTERVAL_MS),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Runs one sweep and returns how many queries were evicted.
    pub fn sweep_once(&self) -> usize {
        let expired = self.correlator.sweep_idle(Instant::now());
        let evicted = expired.len();
        if evicted > 0 {
            emit_timed_out(&self.gate, expired);
            debug!(
                evicted,
                pending = self.correlator.pending_len(),
                "Idle sweep evicted pending queries"
            );
        }
        evicted
    }

    pub async fn start(self: Arc<Self>) {
        info!(interval_ms = self.interval.as_millis() as u64, "Starting sweep job");

        let mut interval = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("SweepJob: shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.sweep_once();
                }
            }
        }
    }
}
