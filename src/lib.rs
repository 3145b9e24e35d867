//! depscan - software composition analysis for multi-ecosystem projects
//!
//! This library walks a project directory, parses every lockfile and SBOM it
//! understands into one unified dependency graph, and annotates the graph
//! with vulnerabilities and licenses from a local database and an optional
//! remote detection service. It follows hexagonal architecture: the engine
//! has no I/O and talks to the outside world through ports.
//!
//! # Architecture
//!
//! - **Engine** (`sca_engine`): dependency graph, graph construction and
//!   vulnerability matching
//! - **Application Layer** (`application`): the scan use case, DTOs and factories
//! - **Ports** (`ports`): interface definitions for infrastructure
//! - **Adapters** (`adapters`): analyzers, vulnerability sources, file system and console
//! - **Shared** (`shared`): common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use depscan::prelude::*;
//! use std::path::{Path, PathBuf};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<()> {
//! let local = LocalVulnerabilityDb::load(Path::new("vulndb.json"))?;
//! let matcher = VulnerabilityMatcher::new(RemoteSettings::default())
//!     .with_local(Arc::new(local));
//!
//! let use_case = ScanProjectUseCase::new(
//!     FileSystemReader::new(),
//!     StderrProgressReporter::new(),
//!     default_registry(),
//!     matcher,
//! );
//!
//! let response = use_case.execute(ScanRequest::new(PathBuf::from("."))).await?;
//! let output = JsonFormatter::new().format(&response)?;
//! println!("{}", output);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod ports;
pub mod sca_engine;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::analyzers::{
        default_registry, CargoLockAnalyzer, GemfileLockAnalyzer, SpdxJsonAnalyzer,
        SpdxTagValueAnalyzer, SpdxXmlAnalyzer, UvLockAnalyzer,
    };
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        FileSystemReader, FileSystemWriter, StdoutPresenter,
    };
    pub use crate::adapters::outbound::formatters::{JsonFormatter, TextFormatter};
    pub use crate::adapters::outbound::network::RemoteVulnerabilitySource;
    pub use crate::adapters::outbound::vulndb::LocalVulnerabilityDb;
    pub use crate::application::dto::{OutputFormat, ScanRequest, ScanResponse};
    pub use crate::application::use_cases::ScanProjectUseCase;
    pub use crate::application::AnalyzerRegistry;
    pub use crate::ports::inbound::ScanPort;
    pub use crate::ports::outbound::{
        Analyzer, ManifestCollector, ManifestFile, OutputPresenter, ProgressReporter,
        ReportFormatter, VulnerabilitySource,
    };
    pub use crate::sca_engine::domain::{
        DependencyGraph, DependencyIdentity, Edge, GraphNode, Language, NodeId, SbomDocument,
        Severity, VulnerabilityRecord,
    };
    pub use crate::sca_engine::services::{
        GraphBuilder, RemoteSettings, ScanStatistics, VulnerabilityMatcher,
    };
    pub use crate::shared::error::ScaError;
    pub use crate::shared::Result;
}
