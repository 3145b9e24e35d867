use super::analyze_each;
use crate::ports::outbound::{AnalyzedFile, Analyzer, ManifestFile};
use crate::sca_engine::domain::{DependencyIdentity, Language, RawDependencies};
use crate::shared::error::ScaError;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct CargoLock {
    #[serde(default)]
    package: Vec<CargoPackage>,
}

#[derive(Debug, Deserialize)]
struct CargoPackage {
    name: String,
    version: String,
    /// Absent for workspace members
    #[serde(default)]
    source: Option<String>,
    /// Entries are `name`, `name version` or `name version (source)`
    #[serde(default)]
    dependencies: Vec<String>,
}

fn rust(name: &str, version: &str) -> DependencyIdentity {
    DependencyIdentity::new("", name, version, Language::Rust)
}

/// CargoLockAnalyzer for Rust workspaces
pub struct CargoLockAnalyzer;

impl CargoLockAnalyzer {
    fn parse(file: &ManifestFile) -> Result<RawDependencies, ScaError> {
        let lock: CargoLock =
            toml::from_str(&file.content).map_err(|e| ScaError::parse(&file.relpath, e))?;

        let mut versions: HashMap<&str, &str> = HashMap::new();
        for pkg in &lock.package {
            versions.entry(&pkg.name).or_insert(&pkg.version);
        }

        let mut raw = RawDependencies::new(&file.relpath);
        let members: Vec<&CargoPackage> = lock
            .package
            .iter()
            .filter(|pkg| pkg.source.is_none())
            .collect();
        if let [member] = members.as_slice() {
            raw = raw.with_root(rust(&member.name, &member.version));
        }

        for pkg in &lock.package {
            let parent = rust(&pkg.name, &pkg.version);
            raw.add_package(parent.clone());
            for entry in &pkg.dependencies {
                let mut parts = entry.split_whitespace();
                let Some(name) = parts.next() else {
                    continue;
                };
                let version = match parts.next() {
                    Some(version) => version,
                    None => match versions.get(name).copied() {
                        Some(version) => version,
                        None => {
                            return Err(ScaError::parse(
                                &file.relpath,
                                format!("{} depends on unlocked package {}", pkg.name, name),
                            ))
                        }
                    },
                };
                raw.add_edge(parent.clone(), rust(name, version));
            }
        }
        Ok(raw)
    }
}

#[async_trait]
impl Analyzer for CargoLockAnalyzer {
    fn name(&self) -> &'static str {
        "Cargo.lock"
    }

    fn language(&self) -> Language {
        Language::Rust
    }

    fn can_handle(&self, path: &str) -> bool {
        path == "Cargo.lock" || path.ends_with("/Cargo.lock")
    }

    async fn analyze(
        &self,
        _parent: Option<&ManifestFile>,
        files: &[ManifestFile],
    ) -> Vec<AnalyzedFile> {
        analyze_each(files, Self::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCK: &str = r#"
version = 3

[[package]]
name = "demo"
version = "0.1.0"
dependencies = [
 "serde",
 "syn 2.0.48",
]

[[package]]
name = "serde"
version = "1.0.196"
source = "registry+https://github.com/rust-lang/crates.io-index"
dependencies = [
 "syn 1.0.109 (registry+https://github.com/rust-lang/crates.io-index)",
]

[[package]]
name = "syn"
version = "1.0.109"
source = "registry+https://github.com/rust-lang/crates.io-index"

[[package]]
name = "syn"
version = "2.0.48"
source = "registry+https://github.com/rust-lang/crates.io-index"
"#;

    #[test]
    fn test_parse_edges_with_versions() {
        let raw = CargoLockAnalyzer::parse(&ManifestFile::new("Cargo.lock", LOCK)).unwrap();

        assert_eq!(raw.root, Some(rust("demo", "0.1.0")));
        assert_eq!(raw.packages.len(), 4);
        assert_eq!(
            raw.edges,
            vec![
                (rust("demo", "0.1.0"), rust("serde", "1.0.196")),
                (rust("demo", "0.1.0"), rust("syn", "2.0.48")),
                (rust("serde", "1.0.196"), rust("syn", "1.0.109")),
            ]
        );
    }

    #[test]
    fn test_workspace_with_several_members_has_no_declared_root() {
        let lock = r#"
[[package]]
name = "a"
version = "0.1.0"

[[package]]
name = "b"
version = "0.1.0"
dependencies = ["a"]
"#;
        let raw = CargoLockAnalyzer::parse(&ManifestFile::new("Cargo.lock", lock)).unwrap();
        assert!(raw.root.is_none());
        assert_eq!(raw.edges, vec![(rust("b", "0.1.0"), rust("a", "0.1.0"))]);
    }

    #[test]
    fn test_unlocked_dependency_is_parse_error() {
        let lock = r#"
[[package]]
name = "a"
version = "0.1.0"
dependencies = ["missing"]
"#;
        let err = CargoLockAnalyzer::parse(&ManifestFile::new("x/Cargo.lock", lock)).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
