use std::path::PathBuf;

/// ScanRequest - Internal request DTO for the scan use case
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Directory to scan for manifests
    pub project_path: PathBuf,
    /// Count shared components once (`true`) or once per occurrence
    pub dedup: bool,
    /// Fail the scan when the remote source fails instead of warning
    pub strict: bool,
    /// Build the graph only; no vulnerability sources are queried
    pub dry_run: bool,
}

impl ScanRequest {
    pub fn new(project_path: PathBuf) -> Self {
        Self {
            project_path,
            dedup: true,
            strict: false,
            dry_run: false,
        }
    }

    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
