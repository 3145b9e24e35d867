use crate::sca_engine::domain::{DependencyGraph, NodeId, Severity};
use serde::Serialize;
use std::collections::HashSet;

/// Per-severity counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub none: usize,
}

impl SeverityCounts {
    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::None => self.none += 1,
        }
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::None => self.none,
        }
    }

    pub fn total(&self) -> usize {
        Severity::ALL.iter().map(|&s| self.get(s)).sum()
    }

    /// Entries at any real severity, excluding the `none` bucket
    pub fn affected(&self) -> usize {
        self.total() - self.none
    }
}

/// Aggregate numbers of one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStatistics {
    /// Components bucketed by their most severe vulnerability
    pub components: SeverityCounts,
    /// Distinct vulnerability IDs bucketed by severity
    pub vulnerabilities: SeverityCounts,
    /// Distinct license names
    pub licenses: usize,
    pub dedup: bool,
}

impl ScanStatistics {
    /// Walks the graph under `root`.
    ///
    /// With `dedup` a shared component counts once; without it, once per
    /// parent edge. Vulnerabilities are counted once per ID across the scan
    /// either way. Synthetic nodes are never counted.
    pub fn collect(graph: &DependencyGraph, root: NodeId, dedup: bool) -> Self {
        let mut stats = ScanStatistics {
            dedup,
            ..ScanStatistics::default()
        };

        if dedup {
            graph.for_each(root, |node| {
                if !node.is_synthetic() {
                    stats.components.add(node.risk());
                }
                true
            });
        } else {
            graph.for_each_occurrence(root, |node| {
                if !node.is_synthetic() {
                    stats.components.add(node.risk());
                }
            });
        }

        let mut vulnerability_ids: HashSet<&str> = HashSet::new();
        let mut licenses: HashSet<&str> = HashSet::new();
        for id in graph.breadth_first(root) {
            let node = graph.node(id);
            if node.is_synthetic() {
                continue;
            }
            for record in node.vulnerabilities() {
                if vulnerability_ids.insert(record.id.as_str()) {
                    stats.vulnerabilities.add(record.severity());
                }
            }
            licenses.extend(node.licenses().iter().map(String::as_str));
        }
        stats.licenses = licenses.len();

        stats
    }
}
