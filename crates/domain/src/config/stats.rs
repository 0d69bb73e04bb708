use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StatsConfig {
    /// Log a statistics snapshot every N seconds; 0 disables periodic reports
    #[serde(default)]
    pub report_interval_secs: u64,
}
