pub mod pcap_file_source;

pub use pcap_file_source::PcapFileSource;
