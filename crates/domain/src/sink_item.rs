use crate::{DnsMessage, MatchedPair, RawPacket};
use serde::Serialize;
use std::fmt;

/// Destination of a unit of pipeline output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    /// Query/response records.
    Structured,
    /// Archive of every DNS packet seen.
    RawArchive,
    /// Packets that were not DNS.
    Ignored,
}

impl SinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SinkKind::Structured => "structured",
            SinkKind::RawArchive => "raw",
            SinkKind::Ignored => "ignored",
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A query/response record for the structured sink.
///
/// Unmatched queries and responses are recorded as well so the output
/// describes every DNS message that reached the correlator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuredRecord {
    Matched(MatchedPair),
    UnmatchedQuery(DnsMessage),
    UnmatchedResponse(DnsMessage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkItem {
    StructuredRecord(StructuredRecord),
    RawArchiveEntry(RawPacket),
    IgnoredRawEntry(RawPacket),
}

impl SinkItem {
    pub fn kind(&self) -> SinkKind {
        match self {
            SinkItem::StructuredRecord(_) => SinkKind::Structured,
            SinkItem::RawArchiveEntry(_) => SinkKind::RawArchive,
            SinkItem::IgnoredRawEntry(_) => SinkKind::Ignored,
        }
    }
}
