use anyhow::{anyhow, Context};
use qrmatch_application::ports::RecordSink;
use qrmatch_application::services::{OutputGate, SinkQueue, StatisticsAggregator};
use qrmatch_domain::config::OutputConfig;
use qrmatch_domain::{LinkType, SinkKind};
use qrmatch_infrastructure::sinks::{
    spawn_sink_worker, JsonLinesRecordSink, PcapArchiveSink, SinkWorkerReport,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// The configured sinks, opened and paired with their gate queues.
pub struct SinkSet {
    pub gate: OutputGate,
    queues: Vec<SinkQueue>,
    sinks: Vec<(SinkKind, Box<dyn RecordSink>)>,
}

impl SinkSet {
    /// Starts one worker per sink. Workers finish once every gate handle is
    /// dropped.
    pub fn spawn_workers(
        self,
        stats: &Arc<StatisticsAggregator>,
    ) -> anyhow::Result<(OutputGate, Vec<JoinHandle<SinkWorkerReport>>)> {
        let SinkSet {
            gate,
            queues,
            mut sinks,
        } = self;

        let mut workers = Vec::with_capacity(queues.len());
        for queue in queues {
            let index = sinks
                .iter()
                .position(|(kind, _)| *kind == queue.kind)
                .ok_or_else(|| anyhow!("No sink opened for the {} queue", queue.kind))?;
            let (_, sink) = sinks.swap_remove(index);
            workers.push(spawn_sink_worker(queue, sink, stats.clone()));
        }
        Ok((gate, workers))
    }
}

/// Opens every sink named in the output config. A sink without a path is
/// disabled and gets no queue.
pub fn open_sinks(
    output: &OutputConfig,
    link_type: LinkType,
    stats: &Arc<StatisticsAggregator>,
) -> anyhow::Result<SinkSet> {
    let mut builder = OutputGate::builder(stats.clone());
    let mut sinks: Vec<(SinkKind, Box<dyn RecordSink>)> = Vec::new();

    if let Some(path) = &output.structured_path {
        let sink = JsonLinesRecordSink::create(path)
            .with_context(|| format!("Failed to open structured output {}", path))?;
        builder = builder.with_sink(SinkKind::Structured, output.structured_queue_capacity);
        sinks.push((SinkKind::Structured, Box::new(sink)));
    }

    if let Some(path) = &output.raw_pcap_path {
        let sink = PcapArchiveSink::create(path, link_type)
            .with_context(|| format!("Failed to open raw packet archive {}", path))?;
        builder = builder.with_sink(SinkKind::RawArchive, output.raw_queue_capacity);
        sinks.push((SinkKind::RawArchive, Box::new(sink)));
    }

    if let Some(path) = &output.ignored_pcap_path {
        let sink = PcapArchiveSink::create(path, link_type)
            .with_context(|| format!("Failed to open ignored packet archive {}", path))?;
        builder = builder.with_sink(SinkKind::Ignored, output.ignored_queue_capacity);
        sinks.push((SinkKind::Ignored, Box::new(sink)));
    }

    let (gate, queues) = builder.build();
    info!(
        structured = gate.is_enabled(SinkKind::Structured),
        raw = gate.is_enabled(SinkKind::RawArchive),
        ignored = gate.is_enabled(SinkKind::Ignored),
        "Output sinks configured"
    );

    Ok(SinkSet {
        gate,
        queues,
        sinks,
    })
}
