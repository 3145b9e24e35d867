use crate::ports::outbound::VulnerabilitySource;
use crate::sca_engine::domain::{DependencyGraph, DependencyIdentity, NodeId, VulnerabilityRecord};
use crate::shared::error::ScaError;
use std::sync::Arc;

/// Endpoint and credential of the remote vulnerability source.
///
/// Both or neither must be set. Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteSettings {
    pub endpoint: Option<String>,
    pub credential: Option<String>,
}

impl RemoteSettings {
    pub fn new(endpoint: Option<String>, credential: Option<String>) -> Self {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Self {
            endpoint: non_empty(endpoint),
            credential: non_empty(credential),
        }
    }

    /// Returns whether the remote source is configured at all
    ///
    /// # Errors
    /// `ScaError::Configuration` when only one of the two values is set
    pub fn validate(&self) -> Result<bool, ScaError> {
        match (&self.endpoint, &self.credential) {
            (Some(_), Some(_)) => Ok(true),
            (None, None) => Ok(false),
            (Some(_), None) => Err(ScaError::missing_credential()),
            (None, Some(_)) => Err(ScaError::missing_endpoint()),
        }
    }
}

/// Counters reported after a matching pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSummary {
    /// Distinct identities sent to the sources
    pub queried: usize,
    pub vulnerabilities_added: usize,
    pub licenses_added: usize,
}

/// VulnerabilityMatcher service annotating a built graph
///
/// Every distinct identity is queried once, however many times it occurs
/// in the graph, and the results are written onto the shared node.
pub struct VulnerabilityMatcher {
    local: Option<Arc<dyn VulnerabilitySource>>,
    remote: Option<Arc<dyn VulnerabilitySource>>,
    settings: RemoteSettings,
}

type LookupOutcome = Option<Result<Vec<Vec<VulnerabilityRecord>>, ScaError>>;

impl VulnerabilityMatcher {
    pub fn new(settings: RemoteSettings) -> Self {
        Self {
            local: None,
            remote: None,
            settings,
        }
    }

    pub fn with_local(mut self, source: Arc<dyn VulnerabilitySource>) -> Self {
        self.local = Some(source);
        self
    }

    pub fn with_remote(mut self, source: Arc<dyn VulnerabilitySource>) -> Self {
        self.remote = Some(source);
        self
    }

    /// Whether any source would be consulted by [`match_graph`](Self::match_graph)
    pub fn has_sources(&self) -> bool {
        let remote_ready = matches!(self.settings.validate(), Ok(true)) && self.remote.is_some();
        self.local.is_some() || remote_ready
    }

    /// Queries the sources for every node reachable from `root` and merges
    /// the answers onto the graph.
    ///
    /// Local records are merged first; remote records only add IDs not seen
    /// yet, and remote records without an ID become licenses.
    ///
    /// # Errors
    /// * `ScaError::Configuration` - incomplete remote settings; nothing is
    ///   queried or annotated
    /// * `ScaError::LocalSource` - the local lookup failed; nothing is
    ///   annotated
    /// * `ScaError::RemoteQuery` - the remote lookup failed; local results
    ///   have already been merged
    pub async fn match_graph(
        &self,
        graph: &mut DependencyGraph,
        root: NodeId,
    ) -> Result<MatchSummary, ScaError> {
        let remote_enabled = self.settings.validate()?;
        let remote = match (&self.remote, remote_enabled) {
            (Some(source), true) => Some(Arc::clone(source)),
            (None, true) => {
                tracing::warn!("remote settings given but no remote source is available");
                None
            }
            _ => None,
        };
        if self.local.is_none() && remote.is_none() {
            tracing::debug!("no vulnerability source configured, skipping matching");
            return Ok(MatchSummary::default());
        }

        let nodes: Vec<NodeId> = graph
            .breadth_first(root)
            .into_iter()
            .filter(|&id| !graph.node(id).is_synthetic())
            .collect();
        let identities: Vec<DependencyIdentity> = nodes
            .iter()
            .map(|&id| graph.node(id).identity().clone())
            .collect();
        tracing::info!(
            components = identities.len(),
            "querying vulnerability sources"
        );

        let (local_outcome, remote_outcome) = tokio::join!(
            Self::lookup(self.local.as_deref(), &identities),
            Self::lookup(remote.as_deref(), &identities),
        );
        let local_records = local_outcome.transpose()?;
        let (remote_records, remote_error) = match remote_outcome {
            Some(Ok(records)) => (Some(records), None),
            Some(Err(err)) => (None, Some(err)),
            None => (None, None),
        };

        let mut summary = MatchSummary {
            queried: identities.len(),
            ..MatchSummary::default()
        };
        Self::warn_if_short(self.local.as_deref(), local_records.as_deref(), nodes.len());
        Self::warn_if_short(remote.as_deref(), remote_records.as_deref(), nodes.len());

        for (index, &id) in nodes.iter().enumerate() {
            let node = graph.node_mut(id);
            let local = local_records.as_ref().and_then(|all| all.get(index));
            for record in local.into_iter().flatten() {
                if record.is_license_hint() {
                    continue;
                }
                if node.add_vulnerability(record.clone()) {
                    summary.vulnerabilities_added += 1;
                }
            }

            let remote = remote_records.as_ref().and_then(|all| all.get(index));
            for record in remote.into_iter().flatten() {
                if record.is_license_hint() {
                    if node.add_license(&record.name) {
                        summary.licenses_added += 1;
                    }
                } else if node.add_vulnerability(record.clone()) {
                    summary.vulnerabilities_added += 1;
                }
            }
        }

        match remote_error {
            Some(err) => Err(err),
            None => Ok(summary),
        }
    }

    async fn lookup(
        source: Option<&dyn VulnerabilitySource>,
        identities: &[DependencyIdentity],
    ) -> LookupOutcome {
        let source = source?;
        let result = source.lookup(identities).await;
        if let Err(err) = &result {
            tracing::warn!(source = source.name(), error = %err, "vulnerability lookup failed");
        }
        Some(result)
    }

    fn warn_if_short(
        source: Option<&dyn VulnerabilitySource>,
        records: Option<&[Vec<VulnerabilityRecord>]>,
        expected: usize,
    ) {
        if let (Some(source), Some(records)) = (source, records) {
            if records.len() < expected {
                tracing::warn!(
                    source = source.name(),
                    received = records.len(),
                    expected,
                    "vulnerability source returned fewer results than requested"
                );
            }
        }
    }
}
