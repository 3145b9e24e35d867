use serde::{Deserialize, Serialize};
use std::fmt;

/// Package ecosystem a dependency belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    JavaScript,
    Python,
    Golang,
    Ruby,
    Rust,
    Erlang,
    Php,
    Groovy,
    Sbom,
    #[default]
    Unknown,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Golang => "golang",
            Language::Ruby => "ruby",
            Language::Rust => "rust",
            Language::Erlang => "erlang",
            Language::Php => "php",
            Language::Groovy => "groovy",
            Language::Sbom => "sbom",
            Language::Unknown => "unknown",
        }
    }

    /// Maps a package-url type (`pkg:<type>/...`) to its ecosystem
    pub fn from_purl_type(purl_type: &str) -> Self {
        match purl_type.to_ascii_lowercase().as_str() {
            "maven" => Language::Java,
            "npm" => Language::JavaScript,
            "pypi" => Language::Python,
            "golang" => Language::Golang,
            "gem" => Language::Ruby,
            "cargo" => Language::Rust,
            "hex" => Language::Erlang,
            "composer" => Language::Php,
            "gradle" => Language::Groovy,
            _ => Language::Unknown,
        }
    }

    /// Extracts the ecosystem from a full package-url such as
    /// `pkg:npm/lodash@4.17.21`
    pub fn from_purl(purl: &str) -> Self {
        purl.strip_prefix("pkg:")
            .and_then(|rest| rest.split('/').next())
            .map(Self::from_purl_type)
            .unwrap_or_default()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The coordinate that identifies one dependency.
///
/// Two graph references with equal identities always resolve to the same
/// node. An identity with an empty `name` marks a synthetic placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DependencyIdentity {
    #[serde(default)]
    pub vendor: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub language: Language,
    /// Ecosystem-specific qualifier (registry source, classifier, ...)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub qualifier: String,
}

impl DependencyIdentity {
    pub fn new(
        vendor: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        language: Language,
    ) -> Self {
        Self {
            vendor: vendor.into(),
            name: name.into(),
            version: version.into(),
            language,
            qualifier: String::new(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = qualifier.into();
        self
    }

    pub fn is_synthetic(&self) -> bool {
        self.name.is_empty()
    }
}

impl fmt::Display for DependencyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.vendor.is_empty() {
            write!(f, "{}:", self.vendor)?;
        }
        write!(f, "{}", self.name)?;
        if !self.version.is_empty() {
            write!(f, "@{}", self.version)?;
        }
        write!(f, " [{}]", self.language)
    }
}
