/// Vulnerability database adapters
mod local_db;

pub use local_db::{LocalVulnerabilityDb, VulnDbEntry};
