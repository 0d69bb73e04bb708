#![allow(dead_code)]
mod builders;
mod mocks;

pub use builders::{packet, MessageBuilder};
pub use mocks::{ScriptedDecoder, VecCaptureSource};
