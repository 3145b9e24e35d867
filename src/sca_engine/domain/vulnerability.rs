use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity bucket of a vulnerability; lower numeric value is more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical = 1,
    High = 2,
    Medium = 3,
    Low = 4,
    /// Sentinel for "no known vulnerability"
    None = 5,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::None,
    ];

    /// Converts a raw `security_level_id`; out-of-range values map to `None`
    pub fn from_level_id(level: u8) -> Self {
        match level {
            1 => Severity::Critical,
            2 => Severity::High,
            3 => Severity::Medium,
            4 => Severity::Low,
            _ => Severity::None,
        }
    }

    pub fn level_id(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
            Severity::None => "NONE",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry returned by a vulnerability source.
///
/// A record whose `id` is empty is a license hint: `name` then carries the
/// license short name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cve_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwe_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default = "default_level")]
    pub security_level_id: u8,
}

fn default_level() -> u8 {
    Severity::None.level_id()
}

impl VulnerabilityRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, severity: Severity) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            security_level_id: severity.level_id(),
            ..Self::default()
        }
    }

    /// A record that signals license information rather than a vulnerability
    pub fn license_hint(license: impl Into<String>) -> Self {
        Self::new("", license, Severity::None)
    }

    pub fn is_license_hint(&self) -> bool {
        self.id.is_empty()
    }

    pub fn severity(&self) -> Severity {
        Severity::from_level_id(self.security_level_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical < Severity::High);
        assert!(Severity::Low < Severity::None);
        assert_eq!(
            [Severity::Low, Severity::High].iter().min(),
            Some(&Severity::High)
        );
    }

    #[test]
    fn test_severity_from_level_id() {
        assert_eq!(Severity::from_level_id(1), Severity::Critical);
        assert_eq!(Severity::from_level_id(4), Severity::Low);
        assert_eq!(Severity::from_level_id(0), Severity::None);
        assert_eq!(Severity::from_level_id(9), Severity::None);
        assert_eq!(Severity::High.level_id(), 2);
    }

    #[test]
    fn test_license_hint() {
        let record = VulnerabilityRecord::license_hint("MIT");
        assert!(record.is_license_hint());
        assert_eq!(record.name, "MIT");
        assert!(!VulnerabilityRecord::new("CVE-2024-1", "rce", Severity::High).is_license_hint());
    }

    #[test]
    fn test_record_deserialize_defaults() {
        let record: VulnerabilityRecord =
            serde_json::from_str(r#"{"id":"CVE-2021-44228","name":"log4shell"}"#).unwrap();
        assert_eq!(record.severity(), Severity::None);
        assert!(record.cve_id.is_none());

        let record: VulnerabilityRecord = serde_json::from_str(
            r#"{"id":"XMIRROR-1","name":"x","cve_id":"CVE-1","security_level_id":2}"#,
        )
        .unwrap();
        assert_eq!(record.severity(), Severity::High);
        assert_eq!(record.cve_id.as_deref(), Some("CVE-1"));
    }
}
