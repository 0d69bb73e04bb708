use anyhow::{anyhow, Context};
use clap::Parser;
use qrmatch_application::services::{Correlator, SharedCorrelator, StatisticsAggregator};
use qrmatch_application::use_cases::{ProcessPacketUseCase, RunCaptureUseCase};
use qrmatch_domain::CliOverrides;
use qrmatch_infrastructure::capture::PcapFileSource;
use qrmatch_infrastructure::decoder::EthernetDnsDecoder;
use qrmatch_jobs::{JobRunner, StatsReportJob, SweepJob};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

mod bootstrap;
mod di;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "qrmatch")]
#[command(version)]
#[command(about = "qrmatch - DNS query/response matching over captured traffic")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Capture file to replay
    #[arg(short = 'i', long, value_name = "PCAP")]
    input: Option<String>,

    /// Structured record output (JSON lines)
    #[arg(short = 'o', long, value_name = "JSONL")]
    output: Option<String>,

    /// Archive every DNS packet to this pcap file
    #[arg(long, value_name = "FILE")]
    raw_pcap: Option<String>,

    /// Archive non-DNS packets to this pcap file
    #[arg(long, value_name = "FILE")]
    ignored_pcap: Option<String>,

    /// Time a query waits for its response, in milliseconds
    #[arg(long, value_name = "N")]
    query_timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            input: self.input.clone(),
            structured_path: self.output.clone(),
            raw_pcap_path: self.raw_pcap.clone(),
            ignored_pcap_path: self.ignored_pcap.clone(),
            query_timeout_ms: self.query_timeout_ms,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;
    bootstrap::init_logging(&config);

    info!("Starting qrmatch v{}", env!("CARGO_PKG_VERSION"));

    let input = config
        .capture
        .input
        .clone()
        .ok_or_else(|| anyhow!("No capture input configured (use --input or capture.input)"))?;
    let source = PcapFileSource::open(&input)
        .with_context(|| format!("Failed to open capture {}", input))?;

    let stats = Arc::new(StatisticsAggregator::new());
    let correlator = SharedCorrelator::new(Correlator::new(
        config.correlator.query_timeout(),
        stats.clone(),
    ));

    let (gate, workers) =
        di::open_sinks(&config.output, source.link_type(), &stats)?.spawn_workers(&stats)?;

    let pipeline = Arc::new(ProcessPacketUseCase::new(
        Arc::new(EthernetDnsDecoder::with_port(config.capture.dns_port)),
        correlator.clone(),
        gate.clone(),
        stats.clone(),
    ));

    let shutdown = CancellationToken::new();
    let stop = Arc::new(AtomicBool::new(false));

    let mut runner = JobRunner::new()
        .with_sweep(
            SweepJob::new(correlator.clone(), gate.clone())
                .with_interval(config.correlator.sweep_interval()),
        )
        .with_shutdown_token(shutdown.clone());
    if config.stats.report_interval_secs > 0 {
        runner = runner.with_stats_report(StatsReportJob::new(
            stats.clone(),
            Duration::from_secs(config.stats.report_interval_secs),
        ));
    }
    let jobs = runner.start().await;

    let interrupt = {
        let stop = stop.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping capture");
                stop.store(true, Ordering::Relaxed);
                shutdown.cancel();
            }
        })
    };

    let run_capture = RunCaptureUseCase::new(pipeline.clone(), stats.clone())
        .with_counters_poll_interval(Duration::from_millis(
            config.capture.stats_poll_interval_ms,
        ));
    let capture_stop = stop.clone();
    let capture = tokio::task::spawn_blocking(move || {
        let mut source = source;
        run_capture.execute(&mut source, &capture_stop)
    })
    .await
    .context("Capture thread panicked")?;

    // Shutdown order: stop the timers, drain what is still pending, then
    // close every gate handle so the sink workers flush and exit.
    shutdown.cancel();
    for job in jobs {
        if let Err(e) = job.await {
            error!(error = %e, "Background job panicked");
        }
    }

    let drained = pipeline.finish();
    info!(drained, "Pending queries reported as unmatched");
    drop(pipeline);
    drop(gate);

    for worker in workers {
        match worker.await {
            Ok(report) if report.failed => warn!(
                sink = %report.kind,
                written = report.written,
                dropped = report.dropped,
                "Sink finished after a failure"
            ),
            Ok(_) => {}
            Err(e) => error!(error = %e, "Sink worker panicked"),
        }
    }
    interrupt.abort();

    let snapshot = stats.snapshot();
    print!("{}", snapshot.format_report());
    if snapshot.pcap_recv_count > 0 {
        info!("{}", snapshot.format_capture_report());
    }

    let summary = capture.context("Capture failed")?;
    info!(
        packets = summary.packets,
        matched = summary.matched,
        interrupted = summary.stopped_early,
        "Run complete"
    );
    Ok(())
}
