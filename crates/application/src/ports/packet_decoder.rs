use qrmatch_domain::{DecodedMessage, RawPacket};

/// Outcome of decoding one captured packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Message(DecodedMessage),
    /// DNS traffic that could not be parsed.
    Malformed(String),
    /// Traffic that is not DNS.
    Unhandled,
}

pub trait PacketDecoder: Send + Sync {
    fn decode(&self, packet: &RawPacket) -> Decoded;
}
