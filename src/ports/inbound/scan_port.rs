use crate::application::dto::{ScanRequest, ScanResponse};
use crate::shared::Result;
use async_trait::async_trait;

/// ScanPort - Inbound port for the project scan use case
///
/// This is what the CLI drives. A remote lookup failure is reported as a
/// warning in the response unless the request is strict.
#[async_trait]
pub trait ScanPort {
    /// Scans the project directory named in the request
    ///
    /// # Errors
    /// Returns an error if:
    /// - The project directory is missing, not a directory, or a symlink
    /// - The remote source settings are incomplete
    /// - The local vulnerability database cannot be queried
    /// - The remote source fails and the request is strict
    async fn scan(&self, request: ScanRequest) -> Result<ScanResponse>;
}
