use crate::adapters::outbound::filesystem::FileSystemReader;
use crate::ports::outbound::VulnerabilitySource;
use crate::sca_engine::domain::{DependencyIdentity, Language, VulnerabilityRecord};
use crate::shared::error::ScaError;
use async_trait::async_trait;
use semver::{Version, VersionReq};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// One entry of the database file
#[derive(Debug, Clone, Deserialize)]
pub struct VulnDbEntry {
    #[serde(default)]
    pub vendor: String,
    pub name: String,
    pub language: Language,
    /// Exact versions, `*` matches any
    #[serde(default)]
    pub versions: Vec<String>,
    /// Semver requirement such as `>=2.0.0, <2.15.0`
    #[serde(default)]
    pub version_range: Option<String>,
    pub vulnerability: VulnerabilityRecord,
}

#[derive(Debug)]
struct CompiledEntry {
    vendor: String,
    versions: Vec<String>,
    range: Option<VersionReq>,
    vulnerability: VulnerabilityRecord,
}

impl CompiledEntry {
    fn matches(&self, identity: &DependencyIdentity) -> bool {
        if !self.vendor.is_empty() && !self.vendor.eq_ignore_ascii_case(&identity.vendor) {
            return false;
        }
        if self
            .versions
            .iter()
            .any(|v| v == "*" || v == &identity.version)
        {
            return true;
        }
        match (&self.range, parse_version(&identity.version)) {
            (Some(range), Some(version)) => range.matches(&version),
            _ => false,
        }
    }
}

/// Lenient semver parse: tolerates a leading `v` and missing minor/patch
fn parse_version(raw: &str) -> Option<Version> {
    let raw = raw.trim().trim_start_matches('v');
    if let Ok(version) = Version::parse(raw) {
        return Some(version);
    }
    let mut parts = raw.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    let patch = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    if parts.next().is_some() {
        return None;
    }
    Some(Version::new(major, minor, patch))
}

/// LocalVulnerabilityDb adapter backed by a JSON file
///
/// Entries are indexed by language and lowercase package name at load time;
/// lookups never touch the file again.
#[derive(Debug, Default)]
pub struct LocalVulnerabilityDb {
    index: HashMap<(Language, String), Vec<CompiledEntry>>,
}

impl LocalVulnerabilityDb {
    /// Loads a JSON array of [`VulnDbEntry`]
    ///
    /// # Errors
    /// `ScaError::LocalSource` if the file cannot be read, is not valid JSON,
    /// or holds an invalid `version_range`
    pub fn load(path: &Path) -> Result<Self, ScaError> {
        let content = FileSystemReader::read_regular_file(path, "vulnerability database")
            .map_err(|e| ScaError::LocalSource {
                details: e.to_string(),
            })?;
        let entries: Vec<VulnDbEntry> =
            serde_json::from_str(&content).map_err(|e| ScaError::LocalSource {
                details: format!("{}: {}", path.display(), e),
            })?;
        let db = Self::from_entries(entries)?;
        tracing::info!(
            path = %path.display(),
            entries = db.len(),
            "loaded local vulnerability database"
        );
        Ok(db)
    }

    pub fn from_entries(entries: Vec<VulnDbEntry>) -> Result<Self, ScaError> {
        let mut index: HashMap<(Language, String), Vec<CompiledEntry>> = HashMap::new();
        for entry in entries {
            let range = entry
                .version_range
                .as_deref()
                .filter(|r| !r.trim().is_empty())
                .map(|r| {
                    VersionReq::parse(r).map_err(|e| ScaError::LocalSource {
                        details: format!("invalid version_range {:?} for {}: {}", r, entry.name, e),
                    })
                })
                .transpose()?;
            index
                .entry((entry.language, entry.name.to_lowercase()))
                .or_default()
                .push(CompiledEntry {
                    vendor: entry.vendor,
                    versions: entry.versions,
                    range,
                    vulnerability: entry.vulnerability,
                });
        }
        Ok(Self { index })
    }

    pub fn len(&self) -> usize {
        self.index.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn records_for(&self, identity: &DependencyIdentity) -> Vec<VulnerabilityRecord> {
        self.index
            .get(&(identity.language, identity.name.to_lowercase()))
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| entry.matches(identity))
                    .map(|entry| entry.vulnerability.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl VulnerabilitySource for LocalVulnerabilityDb {
    fn name(&self) -> &str {
        "local"
    }

    async fn lookup(
        &self,
        identities: &[DependencyIdentity],
    ) -> Result<Vec<Vec<VulnerabilityRecord>>, ScaError> {
        Ok(identities.iter().map(|id| self.records_for(id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sca_engine::domain::Severity;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DB: &str = r#"[
        {"vendor": "org.apache.logging.log4j", "name": "log4j-core", "language": "java",
         "version_range": ">=2.0.0, <2.15.0",
         "vulnerability": {"id": "CVE-2021-44228", "name": "Log4Shell", "security_level_id": 1}},
        {"name": "Requests", "language": "python", "versions": ["2.31.0"],
         "vulnerability": {"id": "CVE-2024-35195", "name": "cert verification",
                           "security_level_id": 3}},
        {"name": "requests", "language": "python", "versions": ["*"],
         "vulnerability": {"id": "", "name": "Apache-2.0"}}
    ]"#;

    fn db() -> LocalVulnerabilityDb {
        let entries: Vec<VulnDbEntry> = serde_json::from_str(DB).unwrap();
        LocalVulnerabilityDb::from_entries(entries).unwrap()
    }

    fn java(vendor: &str, version: &str) -> DependencyIdentity {
        DependencyIdentity::new(vendor, "log4j-core", version, Language::Java)
    }

    #[tokio::test]
    async fn test_range_and_vendor_matching() {
        let results = db()
            .lookup(&[
                java("org.apache.logging.log4j", "2.14.1"),
                java("org.apache.logging.log4j", "2.17.0"),
                java("com.example", "2.14.1"),
            ])
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0][0].id, "CVE-2021-44228");
        assert_eq!(results[0][0].severity(), Severity::Critical);
        assert!(results[1].is_empty());
        assert!(results[2].is_empty());
    }

    #[tokio::test]
    async fn test_name_is_case_insensitive_and_wildcard_matches() {
        let requests = DependencyIdentity::new("", "requests", "2.31.0", Language::Python);
        let results = db().lookup(&[requests]).await.unwrap();
        assert_eq!(results[0].len(), 2);
        assert!(results[0].iter().any(VulnerabilityRecord::is_license_hint));

        let other_language = DependencyIdentity::new("", "requests", "2.31.0", Language::Rust);
        assert!(db().lookup(&[other_language]).await.unwrap()[0].is_empty());
    }

    #[test]
    fn test_parse_version_is_lenient() {
        assert_eq!(parse_version("v1.2.3"), Some(Version::new(1, 2, 3)));
        assert_eq!(parse_version("2.0"), Some(Version::new(2, 0, 0)));
        assert_eq!(parse_version("2024.8.30"), Some(Version::new(2024, 8, 30)));
        assert_eq!(parse_version("1.2.3.4"), None);
        assert_eq!(parse_version("latest"), None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DB.as_bytes()).unwrap();

        let db = LocalVulnerabilityDb::load(file.path()).unwrap();
        assert_eq!(db.len(), 3);
        assert!(!db.is_empty());
    }

    #[test]
    fn test_invalid_files_are_local_source_errors() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        let err = LocalVulnerabilityDb::load(file.path()).unwrap_err();
        assert!(matches!(err, ScaError::LocalSource { .. }));

        let err = LocalVulnerabilityDb::load(Path::new("/nonexistent/vulndb.json")).unwrap_err();
        assert!(matches!(err, ScaError::LocalSource { .. }));

        let bad_range: Vec<VulnDbEntry> = serde_json::from_str(
            r#"[{"name": "x", "language": "rust", "version_range": "not a range",
                 "vulnerability": {"id": "X-1"}}]"#,
        )
        .unwrap();
        assert!(LocalVulnerabilityDb::from_entries(bad_range).is_err());
    }
}
