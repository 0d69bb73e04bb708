pub mod process_packet;
pub mod run_capture;

pub use process_packet::{emit_timed_out, PacketDisposition, ProcessPacketUseCase};
pub use run_capture::{CaptureRunSummary, RunCaptureUseCase};
