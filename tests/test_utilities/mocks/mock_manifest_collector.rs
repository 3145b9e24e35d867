use depscan::prelude::*;
use std::path::Path;

/// Mock ManifestCollector serving in-memory files
pub struct MockManifestCollector {
    pub files: Vec<ManifestFile>,
    pub should_fail: bool,
}

impl MockManifestCollector {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            should_fail: false,
        }
    }

    pub fn with_file(mut self, relpath: &str, content: &str) -> Self {
        self.files.push(ManifestFile::new(relpath, content));
        self
    }

    pub fn with_failure() -> Self {
        Self {
            files: Vec::new(),
            should_fail: true,
        }
    }
}

impl ManifestCollector for MockManifestCollector {
    fn collect(
        &self,
        _project_path: &Path,
        accept: &dyn Fn(&str) -> bool,
    ) -> Result<Vec<ManifestFile>> {
        if self.should_fail {
            anyhow::bail!("Mock manifest collection failure");
        }
        Ok(self
            .files
            .iter()
            .filter(|f| accept(&f.relpath))
            .cloned()
            .collect())
    }
}
