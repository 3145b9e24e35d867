use super::{DependencyGraph, DependencyIdentity, Language, NodeId, VulnerabilityRecord};
use crate::shared::error::ScaError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One package entry of an exported SBOM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SbomPackage {
    pub spdx_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vendor: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub licenses: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vulnerabilities: Vec<VulnerabilityRecord>,
}

impl SbomPackage {
    fn identity(&self) -> DependencyIdentity {
        DependencyIdentity::new(&self.vendor, &self.name, &self.version, self.language)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipType {
    #[serde(rename = "DEPENDS_ON")]
    DependsOn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SbomRelationship {
    pub element: String,
    pub related: String,
    #[serde(rename = "type")]
    pub kind: RelationshipType,
}

/// Flat package + relationship view of a dependency graph.
///
/// Synthetic placeholder nodes are not exported; relationships through them
/// are dropped with them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SbomDocument {
    pub packages: Vec<SbomPackage>,
    #[serde(default)]
    pub relationships: Vec<SbomRelationship>,
}

impl SbomDocument {
    /// Exports every named node reachable from `root`, each exactly once
    pub fn from_graph(graph: &DependencyGraph, root: NodeId) -> Self {
        let mut document = SbomDocument::default();
        graph.for_each(root, |node| {
            if node.is_synthetic() {
                return true;
            }
            document.packages.push(SbomPackage {
                spdx_id: node.id().sbom_ref(),
                vendor: node.vendor().to_string(),
                name: node.name().to_string(),
                version: node.version().to_string(),
                language: node.language(),
                licenses: node.licenses().to_vec(),
                vulnerabilities: node.vulnerabilities().to_vec(),
            });
            for edge in node.children() {
                if graph.node(edge.target).is_synthetic() {
                    continue;
                }
                document.relationships.push(SbomRelationship {
                    element: node.id().sbom_ref(),
                    related: edge.target.sbom_ref(),
                    kind: RelationshipType::DependsOn,
                });
            }
            true
        });
        document
    }

    /// Rebuilds a graph from the document.
    ///
    /// Disconnected roots are joined under a synthetic root carrying `path`.
    ///
    /// # Errors
    /// `ScaError::Parse` when a relationship names an unknown package
    pub fn into_graph(&self, path: &str) -> Result<(DependencyGraph, NodeId), ScaError> {
        let mut graph = DependencyGraph::new();
        let mut refs: HashMap<&str, NodeId> = HashMap::with_capacity(self.packages.len());
        let mut created = Vec::with_capacity(self.packages.len());

        for package in &self.packages {
            let id = graph.upsert(package.identity());
            let node = graph.node_mut(id);
            for license in &package.licenses {
                node.add_license(license);
            }
            for record in &package.vulnerabilities {
                node.add_vulnerability(record.clone());
            }
            refs.insert(package.spdx_id.as_str(), id);
            created.push(id);
        }

        let resolve = |reference: &str| {
            refs.get(reference).copied().ok_or_else(|| {
                let details = format!("relationship references unknown package {}", reference);
                ScaError::parse(path, details)
            })
        };
        for relationship in &self.relationships {
            let parent = resolve(&relationship.element)?;
            let child = resolve(&relationship.related)?;
            graph.attach_child(parent, child);
        }

        let root = graph.merge_roots(&created, Some(path.to_string()));
        graph.node_mut(root).set_path(path);
        Ok((graph, root))
    }
}
