use serde::Serialize;
use std::fmt;

/// Statistics on packet collection.
///
/// All counts are since the run started and never decrease.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PacketStatistics {
    /// Packets received from capture.
    pub raw_packet_count: u64,
    /// Packets that failed DNS decode.
    pub malformed_packet_count: u64,
    /// DNS packets received out of capture time order.
    pub out_of_order_packet_count: u64,
    /// Packets not recognised as DNS traffic.
    pub unhandled_packet_count: u64,
    /// Query/response pairs matched.
    pub qr_pair_count: u64,
    /// Queries evicted without a matching response.
    pub query_without_response_count: u64,
    /// Responses with no pending query at arrival.
    pub response_without_query_count: u64,
    /// Packets received, as reported by the capture layer.
    pub pcap_recv_count: u64,
    /// Packets dropped by the kernel, as reported by the capture layer.
    pub pcap_drop_count: u64,
    /// Packets dropped by the interface, as reported by the capture layer.
    pub pcap_ifdrop_count: u64,
    /// Raw packets dropped by the raw archive sink queue.
    pub output_raw_pcap_drop_count: u64,
    /// Ignored packets dropped by the ignored packet sink queue.
    pub output_ignored_pcap_drop_count: u64,
    /// Structured records dropped by the record sink queue.
    pub output_cbor_drop_count: u64,
}

impl PacketStatistics {
    /// Renders the operator report. The layout is consumed by log
    /// collection and must stay byte-stable.
    pub fn format_report(&self) -> String {
        format!(
            concat!(
                "\nSTATISTICS:\n",
                "  Total Packets processed                  : {}\n",
                "  Matched DNS query/response pairs (C-DNS) : {}\n",
                "  Unmatched DNS queries            (C-DNS) : {}\n",
                "  Unmatched DNS responses          (C-DNS) : {}\n",
                "  Malformed DNS packets                    : {}\n",
                "  Non-DNS packets                          : {}\n",
                "  Out-of-order DNS query/responses         : {}\n",
                "  Dropped C-DNS items (overload)           : {}\n",
                "  Dropped raw PCAP packets (overload)      : {}\n",
                "  Dropped non-DNS packets (overload)       : {}\n\n",
            ),
            self.raw_packet_count,
            self.qr_pair_count,
            self.query_without_response_count,
            self.response_without_query_count,
            self.malformed_packet_count,
            self.unhandled_packet_count,
            self.out_of_order_packet_count,
            self.output_cbor_drop_count,
            self.output_raw_pcap_drop_count,
            self.output_ignored_pcap_drop_count,
        )
    }

    /// One-line summary of the counters supplied by the capture layer.
    pub fn format_capture_report(&self) -> String {
        format!(
            "PCAP: received {}, dropped by kernel {}, dropped by interface {}",
            self.pcap_recv_count, self.pcap_drop_count, self.pcap_ifdrop_count
        )
    }

    pub fn total_output_drops(&self) -> u64 {
        self.output_raw_pcap_drop_count
            + self.output_ignored_pcap_drop_count
            + self.output_cbor_drop_count
    }
}

impl fmt::Display for PacketStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_report())
    }
}
