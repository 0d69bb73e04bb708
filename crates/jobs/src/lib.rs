pub mod runner;
pub mod stats_report;
pub mod sweep;

pub use runner::JobRunner;
pub use stats_report::StatsReportJob;
pub use sweep::SweepJob;
