use qrmatch_application::services::StatisticsAggregator;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Logs a statistics snapshot on a fixed period.
pub struct StatsReportJob {
    stats: Arc<StatisticsAggregator>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl StatsReportJob {
    pub fn new(stats: Arc<StatisticsAggregator>, interval: Duration) -> Self {
        Self {
            stats,
            interval,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn report_once(&self) {
        let s = self.stats.snapshot();
        info!(
            raw_packets = s.raw_packet_count,
            qr_pairs = s.qr_pair_count,
            queries_without_response = s.query_without_response_count,
            responses_without_query = s.response_without_query_count,
            malformed = s.malformed_packet_count,
            unhandled = s.unhandled_packet_count,
            out_of_order = s.out_of_order_packet_count,
            output_drops = s.total_output_drops(),
            "Statistics"
        );
    }

    pub async fn start(self: Arc<Self>) {
        info!(interval_secs = self.interval.as_secs(), "Starting statistics report job");

        // First report after one full period rather than at startup.
        let mut interval = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("StatsReportJob: shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.report_once();
                }
            }
        }
    }
}
