use serde::Serialize;

/// ScanMetadata value object describing one scan run
#[derive(Debug, Clone, Serialize)]
pub struct ScanMetadata {
    scan_id: String,
    timestamp: String,
    tool_name: String,
    tool_version: String,
}

impl ScanMetadata {
    pub fn new(
        scan_id: String,
        timestamp: String,
        tool_name: String,
        tool_version: String,
    ) -> Self {
        Self {
            scan_id,
            timestamp,
            tool_name,
            tool_version,
        }
    }

    pub fn scan_id(&self) -> &str {
        &self.scan_id
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn tool_version(&self) -> &str {
        &self.tool_version
    }
}
