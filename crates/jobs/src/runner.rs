use crate::{StatsReportJob, SweepJob};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub trait SpawnableJob: Send + Sync + 'static {
    fn with_cancellation(self, token: CancellationToken) -> Self;
    fn start_job(self: Arc<Self>) -> JoinHandle<()>;
}

macro_rules! impl_spawnable_job {
    ($t:ty) => {
        impl SpawnableJob for $t {
            fn with_cancellation(self, token: CancellationToken) -> Self {
                self.with_cancellation(token)
            }

            fn start_job(self: Arc<Self>) -> JoinHandle<()> {
                tokio::spawn(async move { self.start().await })
            }
        }
    };
}

impl_spawnable_job!(SweepJob);
impl_spawnable_job!(StatsReportJob);

fn spawn_job<J: SpawnableJob>(
    job: Option<J>,
    shutdown: &Option<CancellationToken>,
    handles: &mut Vec<JoinHandle<()>>,
) {
    if let Some(job) = job {
        let job = match shutdown {
            Some(token) => job.with_cancellation(token.clone()),
            None => job,
        };
        handles.push(Arc::new(job).start_job());
    }
}

/// Starts the background jobs. The returned handles complete once the
/// shutdown token is cancelled; await them before closing the output gate,
/// since the sweep job holds a gate handle.
pub struct JobRunner {
    sweep: Option<SweepJob>,
    stats_report: Option<StatsReportJob>,
    shutdown: Option<CancellationToken>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            sweep: None,
            stats_report: None,
            shutdown: None,
        }
    }

    pub fn with_sweep(mut self, job: SweepJob) -> Self {
        self.sweep = Some(job);
        self
    }

    pub fn with_stats_report(mut self, job: StatsReportJob) -> Self {
        self.stats_report = Some(job);
        self
    }

    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    pub async fn start(self) -> Vec<JoinHandle<()>> {
        info!("Starting background job runner");

        let mut handles = Vec::new();
        spawn_job(self.sweep, &self.shutdown, &mut handles);
        spawn_job(self.stats_report, &self.shutdown, &mut handles);

        info!(jobs = handles.len(), "All background jobs started");
        handles
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
