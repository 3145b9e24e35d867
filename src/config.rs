//! Configuration file support for depscan.
//!
//! Provides YAML-based configuration through `depscan.config.yml` files,
//! including data structures, file loading, and validation.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use depscan::shared::Result;

pub const CONFIG_FILENAME: &str = "depscan.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Local vulnerability database (JSON)
    pub vuln_db: Option<PathBuf>,
    pub remote: Option<RemoteConfig>,
    pub dedup: Option<bool>,
    pub strict: Option<bool>,
    pub format: Option<String>,
    pub output: Option<String>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// Remote vulnerability source section.
#[derive(Debug, Deserialize, Default)]
pub struct RemoteConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
    /// File holding the persisted client id
    pub key_file: Option<PathBuf>,
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

impl ConfigFile {
    pub fn remote_url(&self) -> Option<&str> {
        self.remote.as_ref().and_then(|r| r.url.as_deref())
    }

    pub fn remote_token(&self) -> Option<&str> {
        self.remote.as_ref().and_then(|r| r.token.as_deref())
    }

    pub fn remote_timeout_secs(&self) -> Option<u64> {
        self.remote.as_ref().and_then(|r| r.timeout_secs)
    }

    pub fn remote_key_file(&self) -> Option<&Path> {
        self.remote.as_ref().and_then(|r| r.key_file.as_deref())
    }

    /// Relative paths in the file are resolved against `base`.
    fn resolve_paths(&mut self, base: &Path) {
        if let Some(path) = self.vuln_db.take() {
            self.vuln_db = Some(base.join(path));
        }
        if let Some(remote) = self.remote.as_mut() {
            if let Some(path) = remote.key_file.take() {
                remote.key_file = Some(base.join(path));
            }
        }
    }
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let mut config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }
    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if config.remote_timeout_secs() == Some(0) {
        bail!(
            "Invalid config: remote.timeout_secs must be greater than 0.\n\n\
             💡 Hint: Omit the field to use the default of 30 seconds."
        );
    }
    if let Some(format) = config.format.as_deref() {
        if !matches!(format.to_lowercase().as_str(), "json" | "text" | "txt") {
            bail!(
                "Invalid config: unknown format '{}'.\n\n💡 Hint: Use 'json' or 'text'.",
                format
            );
        }
    }
    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    let nested = config
        .remote
        .iter()
        .flat_map(|r| r.unknown_fields.keys().map(|k| format!("remote.{}", k)));
    for key in config.unknown_fields.keys().cloned().chain(nested) {
        tracing::warn!(field = %key, "unknown config field");
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_valid_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(
            &config_path,
            r#"
vuln_db: db/vulns.json
remote:
  url: https://vuln.example.com
  token: abc123
  timeout_secs: 10
dedup: false
strict: true
format: text
output: report.txt
"#,
        )
        .unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.vuln_db, Some(dir.path().join("db/vulns.json")));
        assert_eq!(config.remote_url(), Some("https://vuln.example.com"));
        assert_eq!(config.remote_token(), Some("abc123"));
        assert_eq!(config.remote_timeout_secs(), Some(10));
        assert!(config.remote_key_file().is_none());
        assert_eq!(config.dedup, Some(false));
        assert_eq!(config.strict, Some(true));
        assert_eq!(config.format.as_deref(), Some("text"));
        assert_eq!(config.output.as_deref(), Some("report.txt"));
    }

    #[test]
    fn test_discover_config_found() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "dedup: true\n").unwrap();

        let config = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.dedup, Some(true));
        assert!(config.remote.is_none());
    }

    #[test]
    fn test_discover_config_not_found() {
        let dir = TempDir::new().unwrap();
        let config = discover_config(dir.path()).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config_from_path(Path::new("/nonexistent/config.yml"));
        let err = format!("{}", result.unwrap_err());
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_load_config_parse_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("bad.yml");
        fs::write(&config_path, "invalid: yaml: [[[broken").unwrap();

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_zero_timeout_validation_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, "remote:\n  timeout_secs: 0\n").unwrap();

        let err = format!("{}", load_config_from_path(&config_path).unwrap_err());
        assert!(err.contains("timeout_secs"));
    }

    #[test]
    fn test_unknown_format_validation_error() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, "format: html\n").unwrap();

        assert!(load_config_from_path(&config_path).is_err());
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(
            &config_path,
            r#"
dedup: true
unknown_field: true
remote:
  url: https://x
  retries: 3
"#,
        )
        .unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.unknown_fields.len(), 1);
        assert!(config.unknown_fields.contains_key("unknown_field"));
        let remote = config.remote.unwrap();
        assert!(remote.unknown_fields.contains_key("retries"));
    }

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();
        assert!(config.vuln_db.is_none());
        assert!(config.remote_url().is_none());
        assert!(config.remote_token().is_none());
        assert!(config.unknown_fields.is_empty());
    }
}
