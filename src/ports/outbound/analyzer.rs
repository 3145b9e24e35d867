use crate::sca_engine::domain::{Language, RawDependencies};
use crate::shared::error::ScaError;
use async_trait::async_trait;

/// A manifest file handed to an analyzer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile {
    /// Path relative to the scanned directory, `/`-separated
    pub relpath: String,
    pub content: String,
}

impl ManifestFile {
    pub fn new(relpath: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            relpath: relpath.into(),
            content: content.into(),
        }
    }

    /// Final path component
    pub fn file_name(&self) -> &str {
        self.relpath.rsplit('/').next().unwrap_or(&self.relpath)
    }
}

/// Outcome of analyzing one manifest file
#[derive(Debug)]
pub struct AnalyzedFile {
    pub path: String,
    pub result: Result<RawDependencies, ScaError>,
}

/// Analyzer port for one package ecosystem
///
/// Analyzers turn manifest contents into raw dependency edge lists; the
/// engine builds and merges the graphs. A failure on one file must not
/// prevent the other files of the batch from being returned.
///
/// Implementations must be `Send + Sync`: each analyzer group runs in its
/// own task.
#[async_trait]
pub trait Analyzer: Send + Sync {
    fn name(&self) -> &'static str;

    fn language(&self) -> Language;

    /// Whether this analyzer understands the file at `path`
    fn can_handle(&self, path: &str) -> bool;

    /// Analyzes a batch of files
    ///
    /// # Arguments
    /// * `parent` - Enclosing artifact when the files were extracted from one
    /// * `files` - Files accepted by [`can_handle`](Self::can_handle)
    ///
    /// # Returns
    /// One entry per input file, in input order
    async fn analyze(&self, parent: Option<&ManifestFile>, files: &[ManifestFile])
        -> Vec<AnalyzedFile>;
}
