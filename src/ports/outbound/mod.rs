/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the scan core uses to reach the
/// file system, vulnerability sources and the console.
pub mod analyzer;
pub mod manifest_collector;
pub mod output_presenter;
pub mod progress_reporter;
pub mod report_formatter;
pub mod vulnerability_source;

pub use analyzer::{AnalyzedFile, Analyzer, ManifestFile};
pub use manifest_collector::ManifestCollector;
pub use output_presenter::OutputPresenter;
pub use progress_reporter::ProgressReporter;
pub use report_formatter::ReportFormatter;
pub use vulnerability_source::VulnerabilitySource;
