use qrmatch_application::ports::{CaptureCounters, CaptureSource, Decoded, PacketDecoder};
use qrmatch_domain::{DomainError, RawPacket};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Returns pre-scripted decode results in call order, `Unhandled` once the
/// script runs out.
pub struct ScriptedDecoder {
    script: Mutex<VecDeque<Decoded>>,
    calls: Arc<AtomicU64>,
}

impl ScriptedDecoder {
    pub fn new(script: Vec<Decoded>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl PacketDecoder for ScriptedDecoder {
    fn decode(&self, _packet: &RawPacket) -> Decoded {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Decoded::Unhandled)
    }
}

pub struct VecCaptureSource {
    packets: VecDeque<RawPacket>,
    counters: Option<CaptureCounters>,
    fail_after: Option<usize>,
    delivered: usize,
}

impl VecCaptureSource {
    pub fn new(packets: Vec<RawPacket>) -> Self {
        Self {
            packets: packets.into(),
            counters: None,
            fail_after: None,
            delivered: 0,
        }
    }

    pub fn with_counters(mut self, counters: CaptureCounters) -> Self {
        self.counters = Some(counters);
        self
    }

    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }
}

impl CaptureSource for VecCaptureSource {
    fn next_packet(&mut self) -> Result<Option<RawPacket>, DomainError> {
        if self.fail_after == Some(self.delivered) {
            return Err(DomainError::Capture("device went away".to_string()));
        }
        self.delivered += 1;
        Ok(self.packets.pop_front())
    }

    fn capture_counters(&self) -> Option<CaptureCounters> {
        self.counters
    }
}
