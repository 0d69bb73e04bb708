use serde::{Deserialize, Serialize};

use super::capture::CaptureConfig;
use super::correlator::CorrelatorConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::output::OutputConfig;
use super::stats::StatsConfig;

const LOCAL_CONFIG_PATH: &str = "qrmatch.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/qrmatch/config.toml";

/// Main configuration structure for qrmatch
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Capture input (replay file, DNS port)
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Query/response matching
    #[serde(default)]
    pub correlator: CorrelatorConfig,

    /// Sinks and their queue capacities
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Periodic statistics reporting
    #[serde(default)]
    pub stats: StatsConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. qrmatch.toml in current directory
    /// 3. /etc/qrmatch/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(found) = Self::get_config_path() {
            Self::from_file(&found)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(input) = overrides.input {
            self.capture.input = Some(input);
        }
        if let Some(output) = overrides.structured_path {
            self.output.structured_path = Some(output);
        }
        if let Some(raw) = overrides.raw_pcap_path {
            self.output.raw_pcap_path = Some(raw);
        }
        if let Some(ignored) = overrides.ignored_pcap_path {
            self.output.ignored_pcap_path = Some(ignored);
        }
        if let Some(timeout) = overrides.query_timeout_ms {
            self.correlator.query_timeout_ms = timeout;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.correlator.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Query timeout cannot be 0".to_string(),
            ));
        }

        if self.correlator.sweep_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "Sweep interval cannot be 0".to_string(),
            ));
        }

        if self.capture.stats_poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "Capture stats poll interval cannot be 0".to_string(),
            ));
        }

        let queues = [
            ("structured", self.output.structured_queue_capacity),
            ("raw", self.output.raw_queue_capacity),
            ("ignored", self.output.ignored_queue_capacity),
        ];
        for (name, capacity) in queues {
            if capacity == 0 {
                return Err(ConfigError::Validation(format!(
                    "Queue capacity for the {} sink cannot be 0",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        [LOCAL_CONFIG_PATH, SYSTEM_CONFIG_PATH]
            .into_iter()
            .find(|path| std::path::Path::new(path).exists())
            .map(str::to_string)
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub input: Option<String>,
    pub structured_path: Option<String>,
    pub raw_pcap_path: Option<String>,
    pub ignored_pcap_path: Option<String>,
    pub query_timeout_ms: Option<u64>,
    pub log_level: Option<String>,
}
