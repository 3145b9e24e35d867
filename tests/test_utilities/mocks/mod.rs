/// Mock implementations for testing
mod mock_manifest_collector;
mod mock_progress_reporter;
mod mock_vulnerability_source;

pub use mock_manifest_collector::MockManifestCollector;
pub use mock_progress_reporter::MockProgressReporter;
pub use mock_vulnerability_source::MockVulnerabilitySource;
