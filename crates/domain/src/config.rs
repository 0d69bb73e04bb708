mod capture;
mod correlator;
mod errors;
mod logging;
mod output;
mod root;
mod stats;

pub use capture::CaptureConfig;
pub use correlator::CorrelatorConfig;
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use output::OutputConfig;
pub use root::{CliOverrides, Config};
pub use stats::StatsConfig;
