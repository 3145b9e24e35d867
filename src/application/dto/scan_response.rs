use crate::sca_engine::domain::{DependencyGraph, NodeId, SbomDocument, ScanMetadata};
use crate::sca_engine::services::{MatchSummary, ScanStatistics};

/// ScanResponse - Internal response DTO from the scan use case
///
/// Carries the annotated graph itself so formatters can render it however
/// they need.
#[derive(Debug, Clone)]
pub struct ScanResponse {
    pub graph: DependencyGraph,
    /// Synthetic scan root; its children are the scanned files
    pub root: NodeId,
    pub statistics: ScanStatistics,
    pub metadata: ScanMetadata,
    /// `None` when no source was queried (dry run or nothing configured)
    pub match_summary: Option<MatchSummary>,
    /// Non-fatal problems: unparsable files, remote failures
    pub warnings: Vec<String>,
}

impl ScanResponse {
    pub fn document(&self) -> SbomDocument {
        SbomDocument::from_graph(&self.graph, self.root)
    }

    pub fn has_vulnerabilities(&self) -> bool {
        self.statistics.vulnerabilities.total() > 0
    }

    /// Relative paths of the scanned files, in report order
    pub fn files(&self) -> Vec<&str> {
        self.graph
            .node(self.root)
            .child_ids()
            .filter_map(|id| self.graph.node(id).path())
            .collect()
    }
}
