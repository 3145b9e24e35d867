mod cli;
mod config;

use cli::Args;
use config::{discover_config, load_config_from_path, ConfigFile, CONFIG_FILENAME};
use depscan::adapters::outbound::analyzers::default_registry;
use depscan::adapters::outbound::console::StderrProgressReporter;
use depscan::adapters::outbound::filesystem::FileSystemReader;
use depscan::adapters::outbound::network::{
    default_key_file, load_or_create_client_id, RemoteVulnerabilitySource,
};
use depscan::adapters::outbound::vulndb::LocalVulnerabilityDb;
use depscan::application::dto::{OutputFormat, ScanRequest, ScanResponse};
use depscan::application::factories::{FormatterFactory, PresenterFactory, PresenterType};
use depscan::application::use_cases::ScanProjectUseCase;
use depscan::sca_engine::domain::Severity;
use depscan::sca_engine::services::{RemoteSettings, VulnerabilityMatcher};
use depscan::shared::error::ExitCode;
use depscan::shared::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const TOKEN_ENV: &str = "DEPSCAN_TOKEN";

#[tokio::main]
async fn main() {
    // clap exits with code 2 on invalid arguments
    let args = Args::parse_args();
    init_tracing(&args.log_level);

    match run(args).await {
        Ok(code) => process::exit(code.as_i32()),
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            // Display error chain
            for cause in e.chain().skip(1) {
                eprintln!("\nCaused by: {}", cause);
            }

            eprintln!();
            process::exit(ExitCode::ApplicationError.as_i32());
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Command-line flags merged over the configuration file
#[derive(Debug)]
struct Settings {
    project_path: PathBuf,
    vuln_db: Option<PathBuf>,
    remote: RemoteSettings,
    timeout: Duration,
    key_file: PathBuf,
    format: OutputFormat,
    output: Option<String>,
    dedup: bool,
    strict: bool,
    dry_run: bool,
    fail_on_vulnerabilities: bool,
}

impl Settings {
    fn resolve(args: Args, file: ConfigFile, env_token: Option<String>) -> Result<Self> {
        let file_format = file
            .format
            .as_deref()
            .map(str::parse::<OutputFormat>)
            .transpose()
            .map_err(anyhow::Error::msg)?;
        let url = args.url.or_else(|| file.remote_url().map(str::to_string));
        let token = args
            .token
            .or_else(|| file.remote_token().map(str::to_string))
            .or(env_token);
        let timeout_secs = file
            .remote_timeout_secs()
            .unwrap_or(RemoteVulnerabilitySource::DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            project_path: args.path.unwrap_or_else(|| PathBuf::from(".")),
            vuln_db: args.vuln_db.or_else(|| file.vuln_db.clone()),
            remote: RemoteSettings::new(url, token),
            timeout: Duration::from_secs(timeout_secs),
            key_file: file
                .remote_key_file()
                .map(PathBuf::from)
                .unwrap_or_else(default_key_file),
            format: args.format.or(file_format).unwrap_or_default(),
            output: args.output.or(file.output),
            dedup: !args.no_dedup && file.dedup.unwrap_or(true),
            strict: args.strict || file.strict.unwrap_or(false),
            dry_run: args.dry_run,
            fail_on_vulnerabilities: args.fail_on_vulnerabilities,
        })
    }

    fn matcher(&self) -> Result<VulnerabilityMatcher> {
        let mut matcher = VulnerabilityMatcher::new(self.remote.clone());
        if self.dry_run {
            return Ok(matcher);
        }

        if let Some(path) = &self.vuln_db {
            matcher = matcher.with_local(Arc::new(LocalVulnerabilityDb::load(path)?));
        }
        // A half-configured remote is reported by the matcher itself
        if let (Some(url), Some(token)) = (&self.remote.endpoint, &self.remote.credential) {
            let client_id = load_or_create_client_id(&self.key_file);
            let remote = RemoteVulnerabilitySource::new(url, token, client_id, self.timeout)?;
            matcher = matcher.with_remote(Arc::new(remote));
        }
        Ok(matcher)
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let project_path = args.path.clone().unwrap_or_else(|| PathBuf::from("."));
    let file = match &args.config {
        Some(path) => {
            let config = load_config_from_path(path)?;
            eprintln!("📄 Loaded config from: {}", path.display());
            config
        }
        None => match discover_config(&project_path)? {
            Some(config) => {
                eprintln!(
                    "📄 Auto-discovered config file: {}",
                    project_path.join(CONFIG_FILENAME).display()
                );
                config
            }
            None => ConfigFile::default(),
        },
    };
    let settings = Settings::resolve(args, file, std::env::var(TOKEN_ENV).ok())?;
    tracing::debug!(
        format = ?settings.format,
        dedup = settings.dedup,
        strict = settings.strict,
        "resolved settings"
    );

    // Create adapters (Dependency Injection)
    let use_case = ScanProjectUseCase::new(
        FileSystemReader::new(),
        StderrProgressReporter::new(),
        default_registry(),
        settings.matcher()?,
    );

    let request = ScanRequest::new(settings.project_path.clone())
        .with_dedup(settings.dedup)
        .with_strict(settings.strict)
        .with_dry_run(settings.dry_run);
    let response = use_case.execute(request).await?;

    eprintln!("{}", FormatterFactory::progress_message(settings.format));
    let formatter = FormatterFactory::create(settings.format);
    let report = formatter.format(&response)?;

    let presenter_type = PresenterType::from_output(settings.output.as_deref());
    let presenter = PresenterFactory::create(presenter_type);
    presenter.present(&report)?;

    print_summary(&response);

    if settings.fail_on_vulnerabilities && response.has_vulnerabilities() {
        return Ok(ExitCode::VulnerabilitiesDetected);
    }
    Ok(ExitCode::Success)
}

fn print_summary(response: &ScanResponse) {
    let stats = &response.statistics;
    eprintln!();
    eprintln!(
        "{} {} component(s), {} distinct vulnerabilit(y/ies), {} license(s)",
        "Summary:".bold(),
        stats.components.total(),
        stats.vulnerabilities.total(),
        stats.licenses
    );
    for severity in Severity::ALL {
        let count = stats.vulnerabilities.get(severity);
        if count == 0 {
            continue;
        }
        let label = format!("{:>8}", severity.as_str());
        match severity {
            Severity::Critical => eprintln!("  {} {}", label.red().bold(), count),
            Severity::High => eprintln!("  {} {}", label.red(), count),
            Severity::Medium => eprintln!("  {} {}", label.yellow(), count),
            Severity::Low => eprintln!("  {} {}", label.blue(), count),
            Severity::None => eprintln!("  {} {}", label.dimmed(), count),
        }
    }
    for warning in &response.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("depscan").chain(extra.iter().copied())).unwrap()
    }

    fn file(yaml: &str) -> ConfigFile {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn test_defaults_without_config() {
        let settings = Settings::resolve(args(&[]), ConfigFile::default(), None).unwrap();
        assert_eq!(settings.project_path, PathBuf::from("."));
        assert_eq!(settings.format, OutputFormat::Json);
        assert!(settings.dedup);
        assert!(!settings.strict);
        assert_eq!(settings.remote, RemoteSettings::default());
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_cli_overrides_file() {
        let config = file(
            "format: text\ndedup: true\n\
             remote:\n  url: https://file\n  token: file-token\n  timeout_secs: 5\n",
        );
        let settings = Settings::resolve(
            args(&["--format", "json", "--no-dedup", "--url", "https://cli"]),
            config,
            None,
        )
        .unwrap();
        assert_eq!(settings.format, OutputFormat::Json);
        assert!(!settings.dedup);
        assert_eq!(settings.remote.endpoint.as_deref(), Some("https://cli"));
        assert_eq!(settings.remote.credential.as_deref(), Some("file-token"));
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_env_token_is_last_resort() {
        let settings =
            Settings::resolve(args(&[]), file("strict: true\n"), Some("env-token".into())).unwrap();
        assert_eq!(settings.remote.credential.as_deref(), Some("env-token"));
        assert!(settings.strict);

        let settings = Settings::resolve(
            args(&["--token", "cli"]),
            ConfigFile::default(),
            Some("env".into()),
        )
        .unwrap();
        assert_eq!(settings.remote.credential.as_deref(), Some("cli"));
    }

    #[test]
    fn test_dry_run_matcher_has_no_sources() {
        let settings = Settings::resolve(
            args(&["--dry-run", "--vuln-db", "/nonexistent/db.json"]),
            ConfigFile::default(),
            None,
        )
        .unwrap();
        assert!(!settings.matcher().unwrap().has_sources());
    }

    #[test]
    fn test_missing_vuln_db_is_error() {
        let settings = Settings::resolve(
            args(&["--vuln-db", "/nonexistent/db.json"]),
            ConfigFile::default(),
            None,
        )
        .unwrap();
        assert!(settings.matcher().is_err());
    }
}
