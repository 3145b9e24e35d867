use crate::application::dto::ScanResponse;
use crate::ports::outbound::ReportFormatter;
use crate::sca_engine::domain::{SbomDocument, ScanMetadata};
use crate::sca_engine::services::ScanStatistics;
use crate::shared::Result;
use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    metadata: &'a ScanMetadata,
    statistics: &'a ScanStatistics,
    #[serde(skip_serializing_if = "no_warnings")]
    warnings: &'a [String],
    #[serde(flatten)]
    document: SbomDocument,
}

fn no_warnings(warnings: &&[String]) -> bool {
    warnings.is_empty()
}

/// JsonFormatter adapter emitting metadata, statistics and the package
/// relationship document as pretty-printed JSON
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, response: &ScanResponse) -> Result<String> {
        let report = JsonReport {
            metadata: &response.metadata,
            statistics: &response.statistics,
            warnings: &response.warnings,
            document: response.document(),
        };
        serde_json::to_string_pretty(&report)
            .map_err(|e| anyhow::anyhow!("Failed to serialize report: {}", e))
    }
}
