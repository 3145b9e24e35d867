use async_trait::async_trait;
use depscan::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock VulnerabilitySource answering by package name
#[derive(Default, Clone)]
pub struct MockVulnerabilitySource {
    records: HashMap<String, Vec<VulnerabilityRecord>>,
    failure: Option<ScaErrorKind>,
    /// Number of identities received across all lookups
    pub queried: Arc<AtomicUsize>,
}

#[derive(Clone, Copy)]
enum ScaErrorKind {
    Remote,
    Local,
}

impl MockVulnerabilitySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vulnerability(mut self, name: &str, id: &str, severity: Severity) -> Self {
        self.records
            .entry(name.to_string())
            .or_default()
            .push(VulnerabilityRecord::new(id, format!("{} issue", name), severity));
        self
    }

    pub fn with_license(mut self, name: &str, license: &str) -> Self {
        self.records
            .entry(name.to_string())
            .or_default()
            .push(VulnerabilityRecord::license_hint(license));
        self
    }

    pub fn failing_remote() -> Self {
        Self {
            failure: Some(ScaErrorKind::Remote),
            ..Self::default()
        }
    }

    pub fn failing_local() -> Self {
        Self {
            failure: Some(ScaErrorKind::Local),
            ..Self::default()
        }
    }

    pub fn queried(&self) -> usize {
        self.queried.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VulnerabilitySource for MockVulnerabilitySource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn lookup(
        &self,
        identities: &[DependencyIdentity],
    ) -> std::result::Result<Vec<Vec<VulnerabilityRecord>>, ScaError> {
        self.queried.fetch_add(identities.len(), Ordering::SeqCst);
        match self.failure {
            Some(ScaErrorKind::Remote) => Err(ScaError::remote("status code: 503")),
            Some(ScaErrorKind::Local) => Err(ScaError::LocalSource {
                details: "mock database unavailable".to_string(),
            }),
            None => Ok(identities
                .iter()
                .map(|id| self.records.get(&id.name).cloned().unwrap_or_default())
                .collect()),
        }
    }
}
