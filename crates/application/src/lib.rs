//! qrmatch application layer: ports to the capture, decode and sink
//! collaborators, and the services that correlate and gate DNS traffic.
pub mod ports;
pub mod services;
pub mod use_cases;
