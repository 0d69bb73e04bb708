#![allow(dead_code)]

mod frames;
mod sinks;

pub use frames::{dns_message, FrameBuilder};
pub use sinks::{FailingSink, RecordingSink};
