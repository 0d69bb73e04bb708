use super::io_sink_error;
use pcap_file::pcap::{PcapHeader, PcapPacket, PcapWriter};
use pcap_file::{DataLink, PcapError};
use qrmatch_application::ports::{RecordSink, SinkError};
use qrmatch_domain::{DomainError, LinkType, RawPacket, SinkItem};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

const SNAPLEN: u32 = 262_144;

/// Archives raw packets to a classic pcap file.
///
/// Serves both the raw archive and the ignored-packet output; the file
/// carries the link type of the capture it was opened for.
pub struct PcapArchiveSink<W: Write> {
    writer: Option<PcapWriter<BufWriter<W>>>,
    link_type: LinkType,
    written: u64,
    link_mismatch_reported: bool,
}

impl PcapArchiveSink<File> {
    pub fn create(path: impl AsRef<Path>, link_type: LinkType) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            DomainError::Sink(format!("Failed to create {}: {}", path.display(), e))
        })?;
        let sink = Self::new(file, link_type)?;
        info!(path = %path.display(), link_type = %link_type, "Packet archive opened");
        Ok(sink)
    }
}

impl<W: Write> PcapArchiveSink<W> {
    pub fn new(writer: W, link_type: LinkType) -> Result<Self, DomainError> {
        let header = PcapHeader {
            snaplen: SNAPLEN,
            datalink: DataLink::from(link_type.code()),
            ..Default::default()
        };
        let writer = PcapWriter::with_header(BufWriter::new(writer), header)
            .map_err(|e| DomainError::Sink(format!("Failed to write pcap header: {}", e)))?;

        Ok(Self {
            writer: Some(writer),
            link_type,
            written: 0,
            link_mismatch_reported: false,
        })
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    fn write_packet(&mut self, packet: &RawPacket) -> Result<(), SinkError> {
        if packet.link_type != self.link_type && !self.link_mismatch_reported {
            self.link_mismatch_reported = true;
            warn!(
                archive = %self.link_type,
                packet = %packet.link_type,
                "Packet link type differs from archive link type"
            );
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| SinkError::Fatal("Archive already closed".to_string()))?;

        let record = PcapPacket::new(
            packet.timestamp.as_duration(),
            packet.original_len,
            packet.data.as_ref(),
        );
        writer.write_packet(&record).map_err(pcap_sink_error)?;
        self.written += 1;
        Ok(())
    }
}

impl<W: Write + Send> RecordSink for PcapArchiveSink<W> {
    fn write(&mut self, item: SinkItem) -> Result<(), SinkError> {
        match item {
            SinkItem::RawArchiveEntry(packet) | SinkItem::IgnoredRawEntry(packet) => {
                self.write_packet(&packet)
            }
            SinkItem::StructuredRecord(_) => Err(SinkError::Fatal(
                "Packet archive received a structured record".to_string(),
            )),
        }
    }

    /// Flushes and closes the archive; later writes fail.
    fn flush(&mut self) -> Result<(), SinkError> {
        match self.writer.take() {
            Some(writer) => writer.into_writer().flush().map_err(io_sink_error),
            None => Ok(()),
        }
    }
}

fn pcap_sink_error(e: PcapError) -> SinkError {
    match e {
        PcapError::IoError(io) => io_sink_error(io),
        other => SinkError::Fatal(other.to_string()),
    }
}
