use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorrelatorConfig {
    /// How long a query waits for its response before it is reported unmatched
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Period of the background sweep that ages out pending queries
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
}

impl CorrelatorConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: default_query_timeout_ms(),
            sweep_interval_ms: default_sweep_interval_ms(),
        }
    }
}

fn default_query_timeout_ms() -> u64 {
    5000
}

fn default_sweep_interval_ms() -> u64 {
    1000
}
