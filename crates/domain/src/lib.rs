//! qrmatch domain layer: packets, decoded DNS messages, match keys and the
//! run statistics surface.
pub mod config;
pub mod dns_message;
pub mod errors;
pub mod packet;
pub mod sink_item;
pub mod statistics;
pub mod timestamp;

pub use config::{CliOverrides, Config, ConfigError};
pub use dns_message::{
    DecodedMessage, DnsMessage, MatchKey, MatchedPair, MessageRole, Question, Transport,
};
pub use errors::DomainError;
pub use packet::{LinkType, RawPacket};
pub use sink_item::{SinkItem, SinkKind, StructuredRecord};
pub use statistics::PacketStatistics;
pub use timestamp::Timestamp;
