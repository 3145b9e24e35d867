/// Inbound ports (Driving ports) - Use case interfaces
pub mod scan_port;

pub use scan_port::ScanPort;
