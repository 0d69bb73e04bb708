use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptureConfig {
    /// Capture file to replay
    #[serde(default)]
    pub input: Option<String>,

    /// Port identifying DNS traffic; anything else is counted as non-DNS
    #[serde(default = "default_dns_port")]
    pub dns_port: u16,

    /// How often the capture layer's own counters are polled
    #[serde(default = "default_stats_poll_interval_ms")]
    pub stats_poll_interval_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            input: None,
            dns_port: default_dns_port(),
            stats_poll_interval_ms: default_stats_poll_interval_ms(),
        }
    }
}

fn default_dns_port() -> u16 {
    53
}

fn default_stats_poll_interval_ms() -> u64 {
    1000
}
