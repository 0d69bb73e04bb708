use crate::Timestamp;
use bytes::Bytes;
use std::fmt;

/// Link-layer framing of a captured packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkType {
    Ethernet,
    RawIp,
    LinuxSll,
    Other(u32),
}

impl LinkType {
    /// Numeric link type as registered by tcpdump.org (`LINKTYPE_*`).
    pub fn code(&self) -> u32 {
        match self {
            LinkType::Ethernet => 1,
            LinkType::RawIp => 101,
            LinkType::LinuxSll => 113,
            LinkType::Other(code) => *code,
        }
    }

    pub fn from_code(code: u32) -> Self {
        match code {
            1 => LinkType::Ethernet,
            101 => LinkType::RawIp,
            113 => LinkType::LinuxSll,
            other => LinkType::Other(other),
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkType::Ethernet => write!(f, "ethernet"),
            LinkType::RawIp => write!(f, "raw-ip"),
            LinkType::LinuxSll => write!(f, "linux-sll"),
            LinkType::Other(code) => write!(f, "linktype-{}", code),
        }
    }
}

/// A packet as delivered by the capture layer.
///
/// `data` is reference counted so archiving a packet next to its decoded
/// message does not copy the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    pub timestamp: Timestamp,
    pub link_type: LinkType,
    /// Length of the packet on the wire; may exceed `data.len()` when the
    /// capture snap length cut it short.
    pub original_len: u32,
    pub data: Bytes,
}

impl RawPacket {
    pub fn new(timestamp: Timestamp, link_type: LinkType, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            timestamp,
            link_type,
            original_len: data.len() as u32,
            data,
        }
    }

    pub fn with_original_len(mut self, original_len: u32) -> Self {
        self.original_len = original_len;
        self
    }

    pub fn captured_len(&self) -> usize {
        self.data.len()
    }

    pub fn is_truncated(&self) -> bool {
        (self.data.len() as u64) < u64::from(self.original_len)
    }
}
