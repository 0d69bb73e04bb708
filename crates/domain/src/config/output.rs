use serde::{Deserialize, Serialize};

/// Sink destinations and queue sizes. A sink without a path is disabled.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// JSON-lines file receiving matched and unmatched query/response records
    #[serde(default)]
    pub structured_path: Option<String>,

    /// pcap file archiving every DNS packet
    #[serde(default)]
    pub raw_pcap_path: Option<String>,

    /// pcap file receiving packets that were not DNS
    #[serde(default)]
    pub ignored_pcap_path: Option<String>,

    #[serde(default = "default_queue_capacity")]
    pub structured_queue_capacity: usize,

    #[serde(default = "default_queue_capacity")]
    pub raw_queue_capacity: usize,

    #[serde(default = "default_queue_capacity")]
    pub ignored_queue_capacity: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            structured_path: None,
            raw_pcap_path: None,
            ignored_pcap_path: None,
            structured_queue_capacity: default_queue_capacity(),
            raw_queue_capacity: default_queue_capacity(),
            ignored_queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_queue_capacity() -> usize {
    10_000
}
