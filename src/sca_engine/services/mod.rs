mod graph_builder;
mod metadata_generator;
mod scan_statistics;
mod shared_graph;
mod vulnerability_matcher;

pub use graph_builder::GraphBuilder;
pub use metadata_generator::MetadataGenerator;
pub use scan_statistics::{ScanStatistics, SeverityCounts};
pub use shared_graph::SharedGraph;
pub use vulnerability_matcher::{MatchSummary, RemoteSettings, VulnerabilityMatcher};
