/// Analyzer adapters - one per supported manifest format
mod cargo_lock;
mod gemfile_lock;
mod spdx;
mod uv_lock;

pub use cargo_lock::CargoLockAnalyzer;
pub use gemfile_lock::GemfileLockAnalyzer;
pub use spdx::{SpdxJsonAnalyzer, SpdxTagValueAnalyzer, SpdxXmlAnalyzer};
pub use uv_lock::UvLockAnalyzer;

use crate::application::AnalyzerRegistry;
use crate::ports::outbound::{AnalyzedFile, ManifestFile};
use crate::sca_engine::domain::RawDependencies;
use crate::shared::error::ScaError;
use std::sync::Arc;

/// Registry with every built-in analyzer, most specific first
pub fn default_registry() -> AnalyzerRegistry {
    AnalyzerRegistry::new()
        .register(Arc::new(SpdxJsonAnalyzer))
        .register(Arc::new(SpdxXmlAnalyzer))
        .register(Arc::new(SpdxTagValueAnalyzer))
        .register(Arc::new(UvLockAnalyzer))
        .register(Arc::new(CargoLockAnalyzer))
        .register(Arc::new(GemfileLockAnalyzer))
}

/// Parses every file independently so one bad file does not hide the rest
fn analyze_each<F>(files: &[ManifestFile], parse: F) -> Vec<AnalyzedFile>
where
    F: Fn(&ManifestFile) -> Result<RawDependencies, ScaError>,
{
    files
        .iter()
        .map(|file| AnalyzedFile {
            path: file.relpath.clone(),
            result: parse(file),
        })
        .collect()
}
