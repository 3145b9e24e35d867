pub mod dependency_graph;
pub mod identity;
pub mod raw_dependencies;
pub mod sbom_document;
pub mod scan_metadata;
pub mod vulnerability;

pub use dependency_graph::{Attachment, DependencyGraph, Edge, GraphNode, NodeId};
pub use identity::{DependencyIdentity, Language};
pub use raw_dependencies::RawDependencies;
pub use sbom_document::{RelationshipType, SbomDocument, SbomPackage, SbomRelationship};
pub use scan_metadata::ScanMetadata;
pub use vulnerability::{Severity, VulnerabilityRecord};
