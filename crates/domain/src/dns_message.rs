use crate::{RawPacket, Timestamp};
use serde::Serialize;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Udp,
    Tcp,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Udp => write!(f, "udp"),
            Transport::Tcp => write!(f, "tcp"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Query,
    Response,
}

/// The first question of a DNS message.
///
/// Names are stored lowercased and without the trailing root dot; DNS names
/// compare case-insensitively and a query and its response must meet on the
/// same key regardless of 0x20 randomisation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Question {
    pub name: Arc<str>,
    pub qtype: u16,
    pub qclass: u16,
}

impl Question {
    pub fn new(name: &str, qtype: u16, qclass: u16) -> Self {
        let trimmed = name.strip_suffix('.').unwrap_or(name);
        Self {
            name: trimmed.to_ascii_lowercase().into(),
            qtype,
            qclass,
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} type={} class={}", self.name, self.qtype, self.qclass)
    }
}

/// Fields shared by queries and responses.
///
/// `client` and `server` are oriented by role: for a query the client is the
/// packet source, for a response it is the packet destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsMessage {
    pub id: u16,
    pub question: Question,
    pub client: SocketAddr,
    pub server: SocketAddr,
    pub transport: Transport,
    pub timestamp: Timestamp,
    #[serde(skip)]
    pub raw: Option<RawPacket>,
}

impl DnsMessage {
    pub fn match_key(&self) -> MatchKey {
        MatchKey {
            id: self.id,
            client: self.client,
            server: self.server,
            transport: self.transport,
            question: self.question.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum DecodedMessage {
    Query(DnsMessage),
    Response(DnsMessage),
}

impl DecodedMessage {
    pub fn role(&self) -> MessageRole {
        match self {
            DecodedMessage::Query(_) => MessageRole::Query,
            DecodedMessage::Response(_) => MessageRole::Response,
        }
    }

    pub fn body(&self) -> &DnsMessage {
        match self {
            DecodedMessage::Query(body) | DecodedMessage::Response(body) => body,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        self.body().timestamp
    }

    pub fn match_key(&self) -> MatchKey {
        self.body().match_key()
    }

    pub fn is_query(&self) -> bool {
        matches!(self, DecodedMessage::Query(_))
    }
}

/// Identity under which a query and its response are paired.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
    pub id: u16,
    pub client: SocketAddr,
    pub server: SocketAddr,
    pub transport: Transport,
    pub question: Question,
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{} {} -> {} ({})",
            self.transport, self.id, self.client, self.server, self.question
        )
    }
}

/// A query and the response that consumed it. Immutable once formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedPair {
    query: DnsMessage,
    response: DnsMessage,
    retransmissions: u32,
}

impl MatchedPair {
    pub fn new(query: DnsMessage, response: DnsMessage, retransmissions: u32) -> Self {
        Self {
            query,
            response,
            retransmissions,
        }
    }

    pub fn query(&self) -> &DnsMessage {
        &self.query
    }

    pub fn response(&self) -> &DnsMessage {
        &self.response
    }

    pub fn query_timestamp(&self) -> Timestamp {
        self.query.timestamp
    }

    pub fn response_timestamp(&self) -> Timestamp {
        self.response.timestamp
    }

    /// Number of duplicate queries absorbed by the pending entry before the
    /// response arrived.
    pub fn retransmissions(&self) -> u32 {
        self.retransmissions
    }

    /// Response time; zero when the response was captured before its query.
    pub fn latency(&self) -> Duration {
        self.response
            .timestamp
            .saturating_duration_since(self.query.timestamp)
    }
}
