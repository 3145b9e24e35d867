use crate::application::dto::ScanResponse;
use crate::ports::outbound::ReportFormatter;
use crate::sca_engine::domain::Severity;
use crate::sca_engine::services::SeverityCounts;
use crate::shared::Result;
use std::fmt::Write as _;

/// TextFormatter adapter rendering a plain-text report: summary, the
/// dependency tree and one block per vulnerable component
pub struct TextFormatter;

impl TextFormatter {
    pub fn new() -> Self {
        Self
    }

    fn counts_line(label: &str, counts: &SeverityCounts) -> String {
        let buckets: Vec<String> = Severity::ALL
            .iter()
            .map(|&s| format!("{} {}", s.as_str().to_lowercase(), counts.get(s)))
            .collect();
        format!("{}: {} ({})", label, counts.total(), buckets.join(", "))
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for TextFormatter {
    fn format(&self, response: &ScanResponse) -> Result<String> {
        let mut out = String::new();
        let stats = &response.statistics;
        writeln!(
            out,
            "{} {} scan {}",
            response.metadata.tool_name(),
            response.metadata.tool_version(),
            response.metadata.scan_id()
        )?;
        let components = Self::counts_line("Components", &stats.components);
        writeln!(out, "{}", components)?;
        let vulnerabilities = Self::counts_line("Vulnerabilities", &stats.vulnerabilities);
        writeln!(out, "{}", vulnerabilities)?;
        writeln!(out, "Licenses: {}", stats.licenses)?;

        writeln!(out, "\nDependency tree:")?;
        out.push_str(&response.graph.render_tree(response.root));

        let mut vulnerable = Vec::new();
        response.graph.for_each(response.root, |node| {
            if !node.is_synthetic() && !node.vulnerabilities().is_empty() {
                vulnerable.push(node);
            }
            true
        });
        if !vulnerable.is_empty() {
            writeln!(out, "\nFindings:")?;
            for node in vulnerable {
                writeln!(out, "  {}", node.identity())?;
                for record in node.vulnerabilities() {
                    writeln!(
                        out,
                        "    - {} [{}] {}",
                        record.id,
                        record.severity(),
                        record.name
                    )?;
                }
            }
        }

        if !response.warnings.is_empty() {
            writeln!(out, "\nWarnings:")?;
            for warning in &response.warnings {
                writeln!(out, "  - {}", warning)?;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sca_engine::domain::{
        DependencyGraph, DependencyIdentity, Language, NodeId, VulnerabilityRecord,
    };
    use crate::sca_engine::services::{MetadataGenerator, ScanStatistics};

    #[test]
    fn test_text_report_lists_findings_and_warnings() {
        let mut graph = DependencyGraph::new();
        let root = graph.add_synthetic(Some(".".into()));
        let app = graph.upsert(DependencyIdentity::new("", "app", "1.0.0", Language::Rust));
        let time = graph.upsert(DependencyIdentity::new("", "time", "0.1.43", Language::Rust));
        graph.attach_child(root, app);
        graph.attach_child(app, time);
        let record = VulnerabilityRecord::new(
            "RUSTSEC-2020-0071",
            "segfault in localtime_r",
            Severity::Medium,
        );
        graph.node_mut(time).add_vulnerability(record);
        let statistics = ScanStatistics::collect(&graph, root, true);
        let response = ScanResponse {
            graph,
            root,
            statistics,
            metadata: MetadataGenerator::generate_default(),
            match_summary: None,
            warnings: vec!["remote source unavailable".to_string()],
        };

        let output = TextFormatter::new().format(&response).unwrap();
        assert!(output.contains("Components: 2 (critical 0, high 0, medium 1, low 0, none 1)"));
        assert!(output.contains("Vulnerabilities: 1"));
        assert!(output.contains("  app@1.0.0 [rust]\n    time@0.1.43 [rust]"));
        assert!(output.contains("    - RUSTSEC-2020-0071 [MEDIUM] segfault in localtime_r"));
        assert!(output.contains("Warnings:\n  - remote source unavailable"));
    }

    fn response_for(graph: DependencyGraph, root: NodeId) -> ScanResponse {
        let statistics = ScanStatistics::collect(&graph, root, true);
        ScanResponse {
            graph,
            root,
            statistics,
            metadata: MetadataGenerator::generate_default(),
            match_summary: None,
            warnings: vec![],
        }
    }

    #[test]
    fn test_findings_follow_tree_order() {
        let mut graph = DependencyGraph::new();
        let root = graph.add_synthetic(None);
        let web = graph.upsert(DependencyIdentity::new("", "web", "1.0.0", Language::JavaScript));
        let qs = graph.upsert(DependencyIdentity::new("", "qs", "6.11.0", Language::JavaScript));
        let ms = graph.upsert(DependencyIdentity::new("", "ms", "2.0.0", Language::JavaScript));
        graph.attach_child(root, web);
        graph.attach_child(web, qs);
        graph.attach_child(web, ms);
        for (id, cve) in [(ms, "CVE-2017-20162"), (qs, "CVE-2022-24999")] {
            graph
                .node_mut(id)
                .add_vulnerability(VulnerabilityRecord::new(cve, "x", Severity::High));
        }

        let output = TextFormatter::new()
            .format(&response_for(graph, root))
            .unwrap();
        let qs_at = output.find("- CVE-2022-24999").unwrap();
        let ms_at = output.find("- CVE-2017-20162").unwrap();
        assert!(qs_at < ms_at);
        assert!(!output.contains("Warnings:"));
    }

    #[test]
    fn test_clean_report_has_no_findings_section() {
        let mut graph = DependencyGraph::new();
        let root = graph.add_synthetic(None);
        let app = graph.upsert(DependencyIdentity::new("", "app", "1.0.0", Language::Rust));
        graph.attach_child(root, app);

        let output = TextFormatter::new()
            .format(&response_for(graph, root))
            .unwrap();
        assert!(output.contains("Vulnerabilities: 0"));
        assert!(!output.contains("Findings:"));
    }
}
