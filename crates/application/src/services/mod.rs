pub mod correlator;
pub mod output_gate;
pub mod statistics;

pub use correlator::{Correlator, CorrelatorCounters, Outcome, SharedCorrelator, TimedOutQuery};
pub use output_gate::{Admission, DropReason, OutputGate, OutputGateBuilder, SinkQueue};
pub use statistics::{Counter, StatisticsAggregator};
