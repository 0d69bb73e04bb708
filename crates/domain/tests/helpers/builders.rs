use qrmatch_domain::{DecodedMessage, DnsMessage, Question, Timestamp, Transport};
use std::net::SocketAddr;

pub struct DnsMessageBuilder {
    id: u16,
    name: String,
    qtype: u16,
    client: SocketAddr,
    server: SocketAddr,
    transport: Transport,
    timestamp: Timestamp,
}

impl DnsMessageBuilder {
    pub fn new() -> Self {
        Self {
            id: 0x1234,
            name: "example.com".to_string(),
            qtype: 1,
            client: "192.168.1.100:40000".parse().unwrap(),
            server: "192.168.1.1:53".parse().unwrap(),
            transport: Transport::Udp,
            timestamp: Timestamp::ZERO,
        }
    }

    pub fn id(mut self, id: u16) -> Self {
        self.id = id;
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn client(mut self, client: &str) -> Self {
        self.client = client.parse().unwrap();
        self
    }

    pub fn transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub fn at_secs(mut self, secs: u64) -> Self {
        self.timestamp = Timestamp::from_secs(secs);
        self
    }

    pub fn body(self) -> DnsMessage {
        DnsMessage {
            id: self.id,
            question: Question::new(&self.name, self.qtype, 1),
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
