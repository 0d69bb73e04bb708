use bytes::Bytes;
use pcap_file::pcap::PcapReader;
use pcap_file::PcapError;
use qrmatch_application::ports::CaptureSource;
use qrmatch_domain::{DomainError, LinkType, RawPacket, Timestamp};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

/// Replays a classic pcap file.
///
/// Offline replay has no kernel or interface drops, so no capture counters
/// are reported.
pub struct PcapFileSource<R: Read> {
    reader: PcapReader<R>,
    link_type: LinkType,
    delivered: u64,
}

impl PcapFileSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            DomainError::Capture(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let source = Self::from_reader(BufReader::new(file))?;

        info!(
            path = %path.display(),
            link_type = %source.link_type,
            "Capture file opened"
        );
        Ok(source)
    }
}

impl<R: Read> PcapFileSource<R> {
    pub fn from_reader(reader: R) -> Result<Self, DomainError> {
        let reader = PcapReader::new(reader)
            .map_err(|e| DomainError::Capture(format!("Invalid pcap header: {}", e)))?;

        let link_type = LinkType::from_code(u32::from(reader.header().datalink));
        if let LinkType::Other(code) = link_type {
            return Err(DomainError::UnsupportedLinkType(code));
        }

        Ok(Self {
            reader,
            link_type,
            delivered: 0,
        })
    }

    pub fn link_type(&self) -> LinkType {
        self.link_type
    }
}

impl<R: Read + Send> CaptureSource for PcapFileSource<R> {
    fn next_packet(&mut self) -> Result<Option<RawPacket>, DomainError> {
        match self.reader.next_packet() {
            None => Ok(None),
            Some(Ok(packet)) => {
                self.delivered += 1;
                let raw = RawPacket::new(
                    Timestamp::from_duration(packet.timestamp),
                    self.link_type,
                    Bytes::copy_from_slice(&packet.data),
                )
                .with_original_len(packet.orig_len);
                Ok(Some(raw))
            }
            Some(Err(e)) if is_partial_record(&e) => {
                // A file still being written ends mid-record.
                warn!(
                    delivered = self.delivered,
                    "Capture file ends with a partial record"
                );
                Ok(None)
            }
            Some(Err(e)) => Err(DomainError::Capture(format!(
                "Failed to read packet {}: {}",
                self.delivered + 1,
                e
            ))),
        }
    }
}

fn is_partial_record(e: &PcapError) -> bool {
    match e {
        PcapError::IncompleteBuffer => true,
        PcapError::IoError(io) => io.kind() == io::ErrorKind::UnexpectedEof,
        _ => false,
    }
}
