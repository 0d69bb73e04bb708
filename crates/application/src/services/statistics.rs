use crate::ports::CaptureCounters;
use qrmatch_domain::{PacketStatistics, SinkKind};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters of the statistics surface that are incremented by the pipeline.
///
/// The capture-layer counters are absolute values reported by the transport
/// and are set through [`StatisticsAggregator::record_capture_counters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    RawPacket,
    MalformedPacket,
    OutOfOrderPacket,
    UnhandledPacket,
    QrPair,
    QueryWithoutResponse,
    ResponseWithoutQuery,
    OutputRawPcapDrop,
    OutputIgnoredPcapDrop,
    OutputCborDrop,
}

impl Counter {
    /// Drop counter charged when an item for `kind` cannot be delivered.
    pub fn output_drop(kind: SinkKind) -> Self {
        match kind {
            SinkKind::Structured => Counter::OutputCborDrop,
            SinkKind::RawArchive => Counter::OutputRawPcapDrop,
            SinkKind::Ignored => Counter::OutputIgnoredPcapDrop,
        }
    }
}

/// Process-wide packet statistics, shared by `Arc` between the decoder path,
/// the correlator, the output gate and the sink workers.
///
/// Every counter is an independent atomic; a snapshot is not linearizable
/// across counters but no increment is ever lost.
#[derive(Debug, Default)]
pub struct StatisticsAggregator {
    raw_packet: AtomicU64,
    malformed_packet: AtomicU64,
    out_of_order_packet: AtomicU64,
    unhandled_packet: AtomicU64,
    qr_pair: AtomicU64,
    query_without_response: AtomicU64,
    response_without_query: AtomicU64,
    pcap_recv: AtomicU64,
    pcap_drop: AtomicU64,
    pcap_ifdrop: AtomicU64,
    output_raw_pcap_drop: AtomicU64,
    output_ignored_pcap_drop: AtomicU64,
    output_cbor_drop: AtomicU64,
}

impl StatisticsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, counter: Counter) -> &AtomicU64 {
        match counter {
            Counter::RawPacket => &self.raw_packet,
            Counter::MalformedPacket => &self.malformed_packet,
            Counter::OutOfOrderPacket => &self.out_of_order_packet,
            Counter::UnhandledPacket => &self.unhandled_packet,
            Counter::QrPair => &self.qr_pair,
            Counter::QueryWithoutResponse => &self.query_without_response,
            Counter::ResponseWithoutQuery => &self.response_without_query,
            Counter::OutputRawPcapDrop => &self.output_raw_pcap_drop,
            Counter::OutputIgnoredPcapDrop => &self.output_ignored_pcap_drop,
            Counter::OutputCborDrop => &self.output_cbor_drop,
        }
    }

    #[inline]
    pub fn increment(&self, counter: Counter) {
        self.counter(counter).fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add(&self, counter: Counter, n: u64) {
        if n > 0 {
            self.counter(counter).fetch_add(n, Ordering::Relaxed);
        }
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.counter(counter).load(Ordering::Relaxed)
    }

    /// Stores the capture layer's running totals. A transport that restarts
    /// its own counters never moves ours backwards.
    pub fn record_capture_counters(&self, counters: CaptureCounters) {
        self.pcap_recv.fetch_max(counters.received, Ordering::Relaxed);
        self.pcap_drop.fetch_max(counters.dropped, Ordering::Relaxed);
        self.pcap_ifdrop
            .fetch_max(counters.if_dropped, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PacketStatistics {
        PacketStatistics {
            raw_packet_count: self.raw_packet.load(Ordering::Relaxed),
            malformed_packet_count: self.malformed_packet.load(Ordering::Relaxed),
            out_of_order_packet_count: self.out_of_order_packet.load(Ordering::Relaxed),
            unhandled_packet_count: self.unhandled_packet.load(Ordering::Relaxed),
            qr_pair_count: self.qr_pair.load(Ordering::Relaxed),
            query_without_response_count: self.query_without_response.load(Ordering::Relaxed),
            response_without_query_count: self.response_without_query.load(Ordering::Relaxed),
            pcap_recv_count: self.pcap_recv.load(Ordering::Relaxed),
            pcap_drop_count: self.pcap_drop.load(Ordering::Relaxed),
            pcap_ifdrop_count: self.pcap_ifdrop.load(Ordering::Relaxed),
            output_raw_pcap_drop_count: self.output_raw_pcap_drop.load(Ordering::Relaxed),
            output_ignored_pcap_drop_count: self.output_ignored_pcap_drop.load(Ordering::Relaxed),
            output_cbor_drop_count: self.output_cbor_drop.load(Ordering::Relaxed),
        }
    }

    pub fn format_report(&self) -> String {
        self.snapshot().format_report()
    }
}
