pub mod ethernet_dns_decoder;

pub use ethernet_dns_decoder::{EthernetDnsDecoder, DEFAULT_DNS_PORT};
