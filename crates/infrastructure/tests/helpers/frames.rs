use etherparse::PacketBuilder;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use qrmatch_domain::{LinkType, RawPacket, Timestamp};
use std::str::FromStr;

const CLIENT_MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];
const SERVER_MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x02];

/// Wire-format DNS message with a single A/IN question.
pub fn dns_message(id: u16, name: &str, response: bool) -> Vec<u8> {
    let mut query = Query::new();
    query.set_name(Name::from_str(name).unwrap());
    query.set_query_type(RecordType::A);
    query.set_query_class(DNSClass::IN);

    let message_type = if response {
        MessageType::Response
    } else {
        MessageType::Query
    };
    let mut message = Message::new(id, message_type, OpCode::Query);
    message.add_query(query);

    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).unwrap();
    buf
}

/// Builds captured frames carrying a payload between two IPv4 endpoints.
pub struct FrameBuilder {
    src: [u8; 4],
    dst: [u8; 4],
    src_port: u16,
    dst_port: u16,
    secs: u64,
}

impl FrameBuilder {
    pub fn new(src: [u8; 4], src_port: u16, dst: [u8; 4], dst_port: u16) -> Self {
        Self {
            src,
            dst,
            src_port,
            dst_port,
            secs: 0,
        }
    }

    pub fn at(mut self, secs: u64) -> Self {
        self.secs = secs;
        self
    }

    pub fn udp(&self, payload: &[u8]) -> RawPacket {
        let builder = PacketBuilder::ethernet2(CLIENT_MAC, SERVER_MAC)
            .ipv4(self.src, self.dst, 64)
            .udp(self.src_port, self.dst_port);
        let mut frame = Vec::with_capacity(builder.size(payload.len()));
        builder.write(&mut frame, payload).unwrap();
        self.packet(LinkType::Ethernet, frame)
    }

    pub fn raw_ip_udp(&self, payload: &[u8]) -> RawPacket {
        let builder = PacketBuilder::ipv4(self.src, self.dst, 64).udp(self.src_port, self.dst_port);
        let mut frame = Vec::with_capacity(builder.size(payload.len()));
        builder.write(&mut frame, payload).unwrap();
        self.packet(LinkType::RawIp, frame)
    }

    /// TCP segment whose payload is `message` behind its 2-byte length.
    pub fn tcp_dns(&self, message: &[u8]) -> RawPacket {
        let mut payload = (message.len() as u16).to_be_bytes().to_vec();
        payload.extend_from_slice(message);
        self.tcp(&payload)
    }

    pub fn tcp(&self, payload: &[u8]) -> RawPacket {
        let builder = PacketBuilder::ethernet2(CLIENT_MAC, SERVER_MAC)
            .ipv4(self.src, self.dst, 64)
            .tcp(self.src_port, self.dst_port, 1000, 65535);
        let mut frame = Vec::with_capacity(builder.size(payload.len()));
        builder.write(&mut frame, payload).unwrap();
        self.packet(LinkType::Ethernet, frame)
    }

    fn packet(&self, link_type: LinkType, frame: Vec<u8>) -> RawPacket {
        RawPacket::new(Timestamp::from_secs(self.secs), link_type, frame)
    }
}
