use crate::application::dto::ScanResponse;
use crate::shared::Result;

/// ReportFormatter port turning a finished scan into text
pub trait ReportFormatter {
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, response: &ScanResponse) -> Result<String>;
}
