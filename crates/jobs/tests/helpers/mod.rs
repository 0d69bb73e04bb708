#![allow(dead_code)]

use qrmatch_application::services::{
    Correlator, OutputGate, SharedCorrelator, SinkQueue, StatisticsAggregator,
};
use qrmatch_domain::{DecodedMessage, DnsMessage, Question, SinkKind, Timestamp, Transport};
use std::sync::Arc;
use std::time::Duration;

pub struct Pipeline {
    pub stats: Arc<StatisticsAggregator>,
    pub correlator: SharedCorrelator,
    pub gate: OutputGate,
    pub structured: SinkQueue,
}

pub fn pipeline(query_timeout: Duration) -> Pipeline {
    let stats = Arc::new(StatisticsAggregator::new());
    let correlator = SharedCorrelator::new(Correlator::new(query_timeout, stats.clone()));
    let (gate, mut queues) = OutputGate::builder(stats.clone())
        .with_sink(SinkKind::Structured, 64)
        .build();
    Pipeline {
        stats,
        correlator,
        gate,
        structured: queues.remove(0),
    }
}

pub fn query(id: u16, micros: u64) -> DecodedMessage {
    DecodedMessage::Query(DnsMessage {
        id,
        question: Question::new("idle.example.net", 1, 1),
        client: "172.16.0.9:50000".parse().unwrap(),
        server: "172.16.0.1:53".parse().unwrap(),
        transport: Transport::Udp,
        timestamp: Timestamp::from_micros(micros),
        raw: None,
    })
}
