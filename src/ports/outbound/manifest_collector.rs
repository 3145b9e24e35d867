use super::ManifestFile;
use crate::shared::Result;
use std::path::Path;

/// ManifestCollector port for gathering manifest files from a project
///
/// This port abstracts the file system walk needed to find every file some
/// analyzer can handle.
pub trait ManifestCollector: Send + Sync {
    /// Collects the files under `project_path` accepted by `accept`
    ///
    /// `accept` receives the `/`-separated path relative to `project_path`.
    ///
    /// # Errors
    /// Returns an error if the project directory cannot be traversed at all;
    /// unreadable individual files are skipped
    fn collect(&self, project_path: &Path, accept: &dyn Fn(&str) -> bool)
        -> Result<Vec<ManifestFile>>;
}
