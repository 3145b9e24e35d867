use clap::Parser;
use depscan::application::dto::OutputFormat;
use std::path::PathBuf;

/// Build a unified dependency graph from project manifests and match it
/// against known vulnerabilities
#[derive(Parser, Debug)]
#[command(name = "depscan")]
#[command(version)]
#[command(about = "Software composition analysis for multi-ecosystem projects", long_about = None)]
pub struct Args {
    /// Path to the project directory (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Configuration file (defaults to depscan.config.yml in the project directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Local vulnerability database (JSON)
    #[arg(long, value_name = "FILE")]
    pub vuln_db: Option<PathBuf>,

    /// Remote vulnerability source endpoint
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Remote vulnerability source token (falls back to DEPSCAN_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Output format: json or text
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Count shared dependencies once per occurrence instead of once
    #[arg(long)]
    pub no_dedup: bool,

    /// Fail when the remote source fails instead of keeping local results
    #[arg(long)]
    pub strict: bool,

    /// Build the dependency graph without querying vulnerability sources
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with code 1 when any vulnerability is found
    #[arg(long)]
    pub fail_on_vulnerabilities: bool,

    /// Log filter, overridden by RUST_LOG (e.g. debug, depscan=trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
