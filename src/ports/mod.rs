/// Ports module defining interfaces for hexagonal architecture
///
/// Inbound ports are what the CLI drives; outbound ports are what the scan
/// core drives.
pub mod inbound;
pub mod outbound;
