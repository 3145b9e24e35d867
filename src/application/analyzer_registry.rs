use crate::ports::outbound::{Analyzer, ManifestFile};
use std::sync::Arc;

/// Ordered list of ecosystem analyzers.
///
/// A file goes to the first analyzer whose `can_handle` accepts it, so more
/// specific analyzers must be registered before general ones.
#[derive(Clone, Default)]
pub struct AnalyzerRegistry {
    analyzers: Vec<Arc<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzers.push(analyzer);
        self
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|a| a.name()).collect()
    }

    pub fn can_handle(&self, path: &str) -> bool {
        self.analyzers.iter().any(|a| a.can_handle(path))
    }

    /// Groups files by the analyzer that will handle them.
    ///
    /// Groups follow registration order and files keep their input order;
    /// files nobody handles are dropped.
    pub fn dispatch(
        &self,
        files: Vec<ManifestFile>,
    ) -> Vec<(Arc<dyn Analyzer>, Vec<ManifestFile>)> {
        let mut groups: Vec<Vec<ManifestFile>> = vec![Vec::new(); self.analyzers.len()];
        for file in files {
            match self
                .analyzers
                .iter()
                .position(|a| a.can_handle(&file.relpath))
            {
                Some(index) => groups[index].push(file),
                None => tracing::debug!(path = %file.relpath, "no analyzer for file"),
            }
        }

        self.analyzers
            .iter()
            .zip(groups)
            .filter(|(_, files)| !files.is_empty())
            .map(|(analyzer, files)| (Arc::clone(analyzer), files))
            .collect()
    }
}

impl std::fmt::Debug for AnalyzerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
