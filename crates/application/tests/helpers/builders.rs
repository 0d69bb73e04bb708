use bytes::Bytes;
use qrmatch_domain::{
    DecodedMessage, DnsMessage, LinkType, Question, RawPacket, Timestamp, Transport,
};
use std::net::SocketAddr;

/// Builds messages keyed by a short label; equal labels give equal match keys.
pub struct MessageBuilder {
    label: String,
    id: u16,
    client: SocketAddr,
    server: SocketAddr,
    transport: Transport,
    timestamp: Timestamp,
}

impl MessageBuilder {
    pub fn key(label: &str) -> Self {
        Self {
            label: label.to_string(),
            id: 0x0100,
            client: "192.168.1.100:41000".parse().unwrap(),
            server: "192.168.1.1:53".parse().unwrap(),
            transport: Transport::Udp,
            timestamp: Timestamp::ZERO,
        }
    }

    pub fn id(mut self, id: u16) -> Self {
        self.id = id;
        self
    }

    pub fn client(mut self, client: &str) -> Self {
        self.client = client.parse().unwrap();
        self
    }

    pub fn at(mut self, secs: u64) -> Self {
        self.timestamp = Timestamp::from_secs(secs);
        self
    }

    pub fn at_micros(mut self, micros: u64) -> Self {
        self.timestamp = Timestamp::from_micros(micros);
        self
    }

    pub fn body(self) -> DnsMessage {
        DnsMessage {
            id: self.id,
            question: Question::new(&format!("{}.example.com", self.label), 1, 1),
            client: self.client,
            server: self.server,
            transport: self.transport,
            timestamp: self.timestamp,
            raw: None,
        }
    }

    pub fn query(self) -> DecodedMessage {
        DecodedMessage::Query(self.body())
    }

    pub fn response(self) -> DecodedMessage {
        DecodedMessage::Response(self.body())
    }
}

pub fn packet(secs: u64) -> RawPacket {
    RawPacket::new(
        Timestamp::from_secs(secs),
        LinkType::Ethernet,
        Bytes::from_static(&[0u8; 60]),
    )
}
