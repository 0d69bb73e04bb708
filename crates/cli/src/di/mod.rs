mod sinks;

pub use sinks::{open_sinks, SinkSet};
