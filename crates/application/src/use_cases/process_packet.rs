use crate::ports::{Decoded, PacketDecoder};
use crate::services::{
    Counter, OutputGate, Outcome, SharedCorrelator, StatisticsAggregator, TimedOutQuery,
};
use qrmatch_domain::{DecodedMessage, RawPacket, SinkItem, SinkKind, StructuredRecord};
use std::sync::Arc;
use tracing::{debug, trace};

/// What happened to one captured packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketDisposition {
    Matched,
    Pending,
    OrphanedResponse,
    DuplicateQuery,
    Malformed,
    Unhandled,
}

/// Decode, correlate and emit for a single capture stream.
///
/// Statistics are charged here for the decode outcomes; the correlator and
/// the gate charge their own counters.
pub struct ProcessPacketUseCase {
    decoder: Arc<dyn PacketDecoder>,
    correlator: SharedCorrelator,
    gate: OutputGate,
    stats: Arc<StatisticsAggregator>,
    archive_raw: bool,
}

impl ProcessPacketUseCase {
    pub fn new(
        decoder: Arc<dyn PacketDecoder>,
        correlator: SharedCorrelator,
        gate: OutputGate,
        stats: Arc<StatisticsAggregator>,
    ) -> Self {
        let archive_raw = gate.is_enabled(SinkKind::RawArchive);
        Self {
            decoder,
            correlator,
            gate,
            stats,
            archive_raw,
        }
    }

    pub fn correlator(&self) -> &SharedCorrelator {
        &self.correlator
    }

    pub fn execute(&self, packet: RawPacket) -> PacketDisposition {
        self.stats.increment(Counter::RawPacket);

        match self.decoder.decode(&packet) {
            Decoded::Unhandled => {
                self.stats.increment(Counter::UnhandledPacket);
                self.gate.submit(SinkItem::IgnoredRawEntry(packet));
                PacketDisposition::Unhandled
            }
            Decoded::Malformed(reason) => {
                self.stats.increment(Counter::MalformedPacket);
                trace!(reason = %reason, len = packet.captured_len(), "Malformed DNS packet");
                PacketDisposition::Malformed
            }
            Decoded::Message(message) => self.correlate(message, packet),
        }
    }

    fn correlate(&self, message: DecodedMessage, packet: RawPacket) -> PacketDisposition {
        let message = if self.archive_raw {
            self.gate.submit(SinkItem::RawArchiveEntry(packet.clone()));
            attach_raw(message, packet)
        } else {
            message
        };

        let (outcome, expired) = self.correlator.process_and_sweep(message);
        self.emit_timed_out(expired);

        match outcome {
            Outcome::Matched(pair) => {
                self.gate
                    .submit(SinkItem::StructuredRecord(StructuredRecord::Matched(pair)));
                PacketDisposition::Matched
            }
            Outcome::OrphanedResponse(response) => {
                self.gate.submit(SinkItem::StructuredRecord(
                    StructuredRecord::UnmatchedResponse(response),
                ));
                PacketDisposition::OrphanedResponse
            }
            Outcome::Pending => PacketDisposition::Pending,
            Outcome::RetransmitOrDuplicate => PacketDisposition::DuplicateQuery,
        }
    }

    /// Reports evicted queries to the structured sink.
    pub fn emit_timed_out(&self, expired: Vec<TimedOutQuery>) {
        emit_timed_out(&self.gate, expired);
    }

    /// Drains every pending query as unmatched. Returns how many were
    /// drained; call once the capture stream has ended.
    pub fn finish(&self) -> usize {
        let drained = self.correlator.drain();
        let count = drained.len();
        self.emit_timed_out(drained);
        debug!(drained = count, "Pending queries drained at end of stream");
        count
    }
}

/// Submits one `UnmatchedQuery` record per evicted query.
pub fn emit_timed_out(gate: &OutputGate, expired: Vec<TimedOutQuery>) {
    for timed_out in expired {
        gate.submit(SinkItem::StructuredRecord(StructuredRecord::UnmatchedQuery(
            timed_out.query,
        )));
    }
}

fn attach_raw(message: DecodedMessage, packet: RawPacket) -> DecodedMessage {
    match message {
        DecodedMessage::Query(mut body) => {
            body.raw = Some(packet);
            DecodedMessage::Query(body)
        }
        DecodedMessage::Response(mut body) => {
            body.raw = Some(packet);
            DecodedMessage::Response(body)
        }
    }
}
