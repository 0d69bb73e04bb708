//! Packet decoder for captured DNS traffic.
//!
//! Link, network and transport layers are sliced with `etherparse`; the DNS
//! payload is parsed with `hickory-proto`. Only the header fields and the
//! first question are kept, which is all the correlator needs.

use etherparse::{NetSlice, SlicedPacket, TransportSlice};
use hickory_proto::op::Message;
use qrmatch_application::ports::{Decoded, PacketDecoder};
use qrmatch_domain::{DecodedMessage, DnsMessage, LinkType, Question, RawPacket, Transport};
use std::net::{IpAddr, SocketAddr};
use tracing::trace;

pub const DEFAULT_DNS_PORT: u16 = 53;

const DNS_HEADER_LEN: usize = 12;
const TCP_LENGTH_PREFIX: usize = 2;
const QR_BIT: u8 = 0x80;

/// Decodes DNS over UDP and TCP from Ethernet, raw IP and Linux SLL frames.
///
/// A packet is DNS traffic when either port equals the configured DNS port.
/// TCP streams are not reassembled: the first message of a segment is
/// decoded and a message spanning segments is reported as malformed.
pub struct EthernetDnsDecoder {
    dns_port: u16,
}

impl EthernetDnsDecoder {
    pub fn new() -> Self {
        Self::with_port(DEFAULT_DNS_PORT)
    }

    pub fn with_port(dns_port: u16) -> Self {
        Self { dns_port }
    }

    pub fn dns_port(&self) -> u16 {
        self.dns_port
    }

    fn is_dns_port(&self, src: u16, dst: u16) -> bool {
        src == self.dns_port || dst == self.dns_port
    }
}

impl Default for EthernetDnsDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketDecoder for EthernetDnsDecoder {
    fn decode(&self, packet: &RawPacket) -> Decoded {
        let sliced = match slice(packet) {
            Some(Ok(sliced)) => sliced,
            Some(Err(reason)) => {
                // A frame cut short by the snap length can still be DNS; an
                // intact frame that does not slice is somebody else's traffic.
                if packet.is_truncated() {
                    return Decoded::Malformed(reason);
                }
                trace!(reason = %reason, "Frame not sliceable");
                return Decoded::Unhandled;
            }
            None => return Decoded::Unhandled,
        };

        let Some((src_ip, dst_ip)) = addresses(&sliced.net) else {
            return Decoded::Unhandled;
        };

        let (transport, src_port, dst_port, payload) = match &sliced.transport {
            Some(TransportSlice::Udp(udp)) => (
                Transport::Udp,
                udp.source_port(),
                udp.destination_port(),
                udp.payload(),
            ),
            Some(TransportSlice::Tcp(tcp)) => (
                Transport::Tcp,
                tcp.source_port(),
                tcp.destination_port(),
                tcp.payload(),
            ),
            _ => return Decoded::Unhandled,
        };

        if !self.is_dns_port(src_port, dst_port) {
            return Decoded::Unhandled;
        }

        let dns = match transport {
            Transport::Udp => payload,
            Transport::Tcp => {
                // Handshake and bare ACK segments carry no message.
                if payload.is_empty() {
                    return Decoded::Unhandled;
                }
                match strip_length_prefix(payload) {
                    Ok(dns) => dns,
                    Err(reason) => return Decoded::Malformed(reason),
                }
            }
        };

        let src = SocketAddr::new(src_ip, src_port);
        let dst = SocketAddr::new(dst_ip, dst_port);

        match parse_message(dns, src, dst, transport, packet) {
            Ok(message) => Decoded::Message(message),
            Err(reason) => Decoded::Malformed(reason),
        }
    }
}

fn slice(packet: &RawPacket) -> Option<Result<SlicedPacket<'_>, String>> {
    let data = packet.data.as_ref();
    let sliced = match packet.link_type {
        LinkType::Ethernet => SlicedPacket::from_ethernet(data).map_err(|e| e.to_string()),
        LinkType::RawIp => SlicedPacket::from_ip(data).map_err(|e| e.to_string()),
        LinkType::LinuxSll => SlicedPacket::from_linux_sll(data).map_err(|e| e.to_string()),
        LinkType::Other(_) => return None,
    };
    Some(sliced)
}

fn addresses(net: &Option<NetSlice<'_>>) -> Option<(IpAddr, IpAddr)> {
    match net {
        Some(NetSlice::Ipv4(v4)) => Some((
            IpAddr::V4(v4.header().source_addr()),
            IpAddr::V4(v4.header().destination_addr()),
        )),
        Some(NetSlice::Ipv6(v6)) => Some((
            IpAddr::V6(v6.header().source_addr()),
            IpAddr::V6(v6.header().destination_addr()),
        )),
        _ => None,
    }
}

fn strip_length_prefix(payload: &[u8]) -> Result<&[u8], String> {
    if payload.len() < TCP_LENGTH_PREFIX {
        return Err("TCP payload shorter than length prefix".to_string());
    }
    let declared = u16::from_be_bytes([payload[0], payload[1]]) as usize;
    let body = &payload[TCP_LENGTH_PREFIX..];
    if body.len() < declared {
        return Err(format!(
            "TCP DNS message of {} bytes spans segments ({} captured)",
            declared,
            body.len()
        ));
    }
    Ok(&body[..declared])
}

fn parse_message(
    dns: &[u8],
    src: SocketAddr,
    dst: SocketAddr,
    transport: Transport,
    packet: &RawPacket,
) -> Result<DecodedMessage, String> {
    if dns.len() < DNS_HEADER_LEN {
        return Err(format!("DNS payload of {} bytes has no header", dns.len()));
    }

    let id = u16::from_be_bytes([dns[0], dns[1]]);
    let is_response = dns[2] & QR_BIT != 0;

    let message =
        Message::from_vec(dns).map_err(|e| format!("Failed to parse DNS message: {}", e))?;

    let query = message
        .queries()
        .first()
        .ok_or_else(|| "DNS message has no question".to_string())?;

    let question = Question::new(
        &query.name().to_utf8(),
        u16::from(query.query_type()),
        u16::from(query.query_class()),
    );

    let (client, server) = if is_response { (dst, src) } else { (src, dst) };

    let body = DnsMessage {
        id,
        question,
        client,
        server,
        transport,
        timestamp: packet.timestamp,
        raw: None,
    };

    Ok(if is_response {
        DecodedMessage::Response(body)
    } else {
        DecodedMessage::Query(body)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_length_prefix_takes_declared_length() {
        let payload = [0x00, 0x03, 1, 2, 3, 4, 5];
        assert_eq!(strip_length_prefix(&payload).unwrap(), &[1, 2, 3]);
    }

    #[test]
    fn test_strip_length_prefix_rejects_partial_message() {
        let payload = [0x00, 0x10, 1, 2, 3];
        assert!(strip_length_prefix(&payload).is_err());
        assert!(strip_length_prefix(&[0x00]).is_err());
    }

    #[test]
    fn test_custom_port_matches_either_direction() {
        let decoder = EthernetDnsDecoder::with_port(5353);
        assert!(decoder.is_dns_port(5353, 40000));
        assert!(decoder.is_dns_port(40000, 5353));
        assert!(!decoder.is_dns_port(53, 40000));
    }
}
