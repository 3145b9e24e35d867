use super::analyze_each;
use crate::ports::outbound::{AnalyzedFile, Analyzer, ManifestFile};
use crate::sca_engine::domain::{DependencyIdentity, Language, RawDependencies};
use crate::shared::error::ScaError;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct UvLock {
    #[serde(default)]
    package: Vec<UvPackage>,
}

#[derive(Debug, Deserialize)]
struct UvPackage {
    name: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    source: Option<UvSource>,
    #[serde(default)]
    dependencies: Vec<UvDependency>,
    #[serde(default, rename = "dev-dependencies")]
    dev_dependencies: HashMap<String, Vec<UvDependency>>,
    #[serde(default, rename = "optional-dependencies")]
    optional_dependencies: HashMap<String, Vec<UvDependency>>,
}

#[derive(Debug, Deserialize)]
struct UvSource {
    #[serde(default)]
    editable: Option<String>,
    #[serde(default, rename = "virtual")]
    virtual_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UvDependency {
    name: String,
    /// Only present when the lock holds several versions of `name`
    #[serde(default)]
    version: Option<String>,
}

impl UvPackage {
    /// The project itself is locked as an editable or virtual source at `.`
    fn is_project(&self) -> bool {
        self.source.as_ref().is_some_and(|source| {
            source.editable.as_deref() == Some(".") || source.virtual_path.as_deref() == Some(".")
        })
    }

    fn identity(&self) -> DependencyIdentity {
        python(&self.name, &self.version)
    }

    fn all_dependencies(&self) -> impl Iterator<Item = &UvDependency> {
        let mut groups: Vec<_> = self
            .dev_dependencies
            .iter()
            .chain(self.optional_dependencies.iter())
            .collect();
        groups.sort_by(|a, b| a.0.cmp(b.0));
        self.dependencies
            .iter()
            .chain(groups.into_iter().flat_map(|(_, deps)| deps.iter()))
    }
}

fn python(name: &str, version: &str) -> DependencyIdentity {
    DependencyIdentity::new("", name, version, Language::Python)
}

/// UvLockAnalyzer for Python projects managed by uv
pub struct UvLockAnalyzer;

impl UvLockAnalyzer {
    fn parse(file: &ManifestFile) -> Result<RawDependencies, ScaError> {
        let lock: UvLock =
            toml::from_str(&file.content).map_err(|e| ScaError::parse(&file.relpath, e))?;

        let mut versions: HashMap<&str, Vec<&str>> = HashMap::new();
        for pkg in &lock.package {
            versions.entry(&pkg.name).or_default().push(&pkg.version);
        }

        let mut raw = RawDependencies::new(&file.relpath);
        if let Some(project) = lock.package.iter().find(|pkg| pkg.is_project()) {
            raw = raw.with_root(project.identity());
        }

        for pkg in &lock.package {
            let parent = pkg.identity();
            raw.add_package(parent.clone());
            for dep in pkg.all_dependencies() {
                let version = match &dep.version {
                    Some(version) => version.as_str(),
                    None => match versions.get(dep.name.as_str()).and_then(|v| v.first()) {
                        Some(&version) => version,
                        None => {
                            tracing::debug!(
                                path = %file.relpath,
                                dependency = %dep.name,
                                "dependency not locked"
                            );
                            continue;
                        }
                    },
                };
                raw.add_edge(parent.clone(), python(&dep.name, version));
            }
        }
        Ok(raw)
    }
}

#[async_trait]
impl Analyzer for UvLockAnalyzer {
    fn name(&self) -> &'static str {
        "uv.lock"
    }

    fn language(&self) -> Language {
        Language::Python
    }

    fn can_handle(&self, path: &str) -> bool {
        path == "uv.lock" || path.ends_with("/uv.lock")
    }

    async fn analyze(
        &self,
        _parent: Option<&ManifestFile>,
        files: &[ManifestFile],
    ) -> Vec<AnalyzedFile> {
        analyze_each(files, Self::parse)
    }
}
