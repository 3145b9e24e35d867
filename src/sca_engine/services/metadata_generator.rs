use crate::sca_engine::domain::ScanMetadata;
use chrono::Utc;
use uuid::Uuid;

/// Produces metadata stamped onto every scan result
pub struct MetadataGenerator;

impl MetadataGenerator {
    /// Current RFC 3339 timestamp and a fresh UUID scan id
    pub fn generate(tool_name: &str, tool_version: &str) -> ScanMetadata {
        ScanMetadata::new(
            format!("urn:uuid:{}", Uuid::new_v4()),
            Utc::now().to_rfc3339(),
            tool_name.to_string(),
            tool_version.to_string(),
        )
    }

    pub fn generate_default() -> ScanMetadata {
        Self::generate("depscan", env!("CARGO_PKG_VERSION"))
    }
}
