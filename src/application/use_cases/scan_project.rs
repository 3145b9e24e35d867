use crate::application::analyzer_registry::AnalyzerRegistry;
use crate::application::dto::{ScanRequest, ScanResponse};
use crate::ports::inbound::ScanPort;
use crate::ports::outbound::{AnalyzedFile, ManifestCollector, ManifestFile, ProgressReporter};
use crate::sca_engine::domain::{DependencyGraph, NodeId};
use crate::sca_engine::services::{
    GraphBuilder, MatchSummary, MetadataGenerator, ScanStatistics, SharedGraph,
    VulnerabilityMatcher,
};
use crate::shared::security::validate_project_directory;
use crate::shared::Result;
use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;

/// ScanProjectUseCase - Core use case for scanning a project
///
/// Orchestrates collect → analyze → build → match → aggregate using
/// generic dependency injection for the file system and the console.
///
/// # Type Parameters
/// * `MC` - ManifestCollector implementation
/// * `PR` - ProgressReporter implementation
pub struct ScanProjectUseCase<MC, PR> {
    manifest_collector: MC,
    progress_reporter: PR,
    registry: AnalyzerRegistry,
    matcher: VulnerabilityMatcher,
}

impl<MC, PR> ScanProjectUseCase<MC, PR>
where
    MC: ManifestCollector,
    PR: ProgressReporter,
{
    pub fn new(
        manifest_collector: MC,
        progress_reporter: PR,
        registry: AnalyzerRegistry,
        matcher: VulnerabilityMatcher,
    ) -> Self {
        Self {
            manifest_collector,
            progress_reporter,
            registry,
            matcher,
        }
    }

    /// Executes the scan
    pub async fn execute(&self, request: ScanRequest) -> Result<ScanResponse> {
        validate_project_directory(&request.project_path)?;

        // Step 1: Collect manifests
        self.progress_reporter.report(&format!(
            "🔍 Scanning {}",
            request.project_path.display()
        ));
        let registry = &self.registry;
        let files = self
            .manifest_collector
            .collect(&request.project_path, &|path| registry.can_handle(path))?;
        self.progress_reporter
            .report(&format!("📄 Found {} manifest file(s)", files.len()));

        // Step 2: Analyze and build the shared graph
        let mut warnings = Vec::new();
        let (mut graph, root) = self.build_graph(&request, files, &mut warnings).await?;

        // Step 3: Match vulnerabilities
        let match_summary = if request.dry_run {
            self.progress_reporter
                .report("🏁 Dry run: skipping vulnerability matching");
            None
        } else {
            self.match_vulnerabilities(&request, &mut graph, root, &mut warnings)
                .await?
        };

        // Step 4: Aggregate
        let statistics = ScanStatistics::collect(&graph, root, request.dedup);
        self.progress_reporter.report_completion(&format!(
            "✅ Scanned {} component(s), {} vulnerabilit(y/ies) found",
            statistics.components.total(),
            statistics.vulnerabilities.total()
        ));

        Ok(ScanResponse {
            graph,
            root,
            statistics,
            metadata: MetadataGenerator::generate_default(),
            match_summary,
            warnings,
        })
    }

    /// Runs one task per analyzer group and merges every file graph.
    ///
    /// A file that fails to parse is kept as a placeholder and reported as
    /// a warning; the other files are unaffected.
    async fn build_graph(
        &self,
        request: &ScanRequest,
        files: Vec<ManifestFile>,
        warnings: &mut Vec<String>,
    ) -> Result<(DependencyGraph, NodeId)> {
        let shared = Arc::new(SharedGraph::new(request.project_path.display().to_string()));
        let groups = self.registry.dispatch(files);
        let total = groups.len();

        let handles: Vec<_> = groups
            .into_iter()
            .map(|(analyzer, files)| {
                let shared = Arc::clone(&shared);
                tokio::spawn(async move {
                    tracing::debug!(analyzer = analyzer.name(), files = files.len(), "analyzing");
                    let analyzed = analyzer.analyze(None, &files).await;
                    let mut failures = Vec::new();
                    for AnalyzedFile { path, result } in analyzed {
                        match result {
                            Ok(raw) => {
                                let (file_graph, file_root) = GraphBuilder::build(&raw);
                                shared.attach_file(&file_graph, file_root).await;
                            }
                            Err(err) => {
                                tracing::warn!(
                                    path = %path,
                                    error = %err,
                                    "skipping unparsable file"
                                );
                                shared.attach_placeholder(&path).await;
                                failures.push(err.to_string());
                            }
                        }
                    }
                    failures
                })
            })
            .collect();

        for (done, outcome) in futures::future::join_all(handles)
            .await
            .into_iter()
            .enumerate()
        {
            let failures = outcome.context("analyzer task failed")?;
            warnings.extend(failures);
            self.progress_reporter
                .report_progress(done + 1, total, Some("analyzing manifests"));
        }

        let shared = Arc::try_unwrap(shared)
            .map_err(|_| anyhow::anyhow!("shared graph is still referenced by a task"))?;
        let (graph, root) = shared.into_inner();
        self.progress_reporter.report(&format!(
            "🧩 Built dependency graph with {} node(s)",
            graph.len()
        ));
        tracing::debug!("scan graph\n{}", graph.render_tree(root));
        Ok((graph, root))
    }

    /// Applies the remote failure policy: a remote failure after a good
    /// local lookup keeps the local results and becomes a warning, unless
    /// the request is strict.
    async fn match_vulnerabilities(
        &self,
        request: &ScanRequest,
        graph: &mut DependencyGraph,
        root: NodeId,
        warnings: &mut Vec<String>,
    ) -> Result<Option<MatchSummary>> {
        if !self.matcher.has_sources() {
            // Still validates the remote settings
            self.matcher.match_graph(graph, root).await?;
            return Ok(None);
        }

        self.progress_reporter
            .begin_activity("Querying vulnerability sources...");
        match self.matcher.match_graph(graph, root).await {
            Ok(summary) => Ok(Some(summary)),
            Err(err) if err.is_remote_query() && !request.strict => {
                let message = format!("{} (results are from the local database only)", err);
                self.progress_reporter
                    .report_error(&format!("⚠️  {}", message));
                warnings.push(message);
                Ok(None)
            }
            Err(err) => {
                self.progress_reporter
                    .report_error("❌ Vulnerability matching failed");
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl<MC, PR> ScanPort for ScanProjectUseCase<MC, PR>
where
    MC: ManifestCollector,
    PR: ProgressReporter,
{
    async fn scan(&self, request: ScanRequest) -> Result<ScanResponse> {
        self.execute(request).await
    }
}
