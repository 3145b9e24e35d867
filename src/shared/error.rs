use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between different
/// types of failures and successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - scan completed (vulnerabilities may have been reported)
    Success = 0,
    /// Vulnerabilities were detected and `--fail-on-vulnerabilities` was given
    VulnerabilitiesDetected = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (configuration, remote query, file I/O error, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::VulnerabilitiesDetected => write!(f, "Vulnerabilities Detected (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Errors raised while scanning a project.
///
/// Uses thiserror to derive Display and Error traits automatically.
/// None of these leave a partially corrupted graph behind: a failure means
/// something is missing from the result, never that built state was damaged.
#[derive(Debug, Error)]
pub enum ScaError {
    /// Remote vulnerability source settings are incomplete
    #[error("Configuration error: {reason}\n\n💡 Hint: Set both the remote url and the remote token, or neither")]
    Configuration { reason: String },

    /// Transport or application-level failure of the remote vulnerability source
    #[error("Remote vulnerability query failed: {details}")]
    RemoteQuery { details: String },

    /// The local vulnerability database could not be loaded or queried
    #[error("Local vulnerability database error: {details}\n\n💡 Hint: Please verify the vuln_db path and that the file contains a JSON array of entries")]
    LocalSource { details: String },

    /// An analyzer could not parse one manifest file
    #[error("Failed to parse manifest: {path}\nDetails: {details}")]
    Parse { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Invalid project path: {path}\nReason: {reason}\n\n💡 Hint: Please specify a valid project directory")]
    InvalidProjectPath { path: PathBuf, reason: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Security violation: {path}\nReason: {reason}\n\n💡 Hint: {hint}")]
    SecurityError {
        path: PathBuf,
        reason: String,
        hint: String,
    },
}

impl ScaError {
    pub fn missing_credential() -> Self {
        ScaError::Configuration {
            reason: "missing credential".to_string(),
        }
    }

    pub fn missing_endpoint() -> Self {
        ScaError::Configuration {
            reason: "missing endpoint".to_string(),
        }
    }

    pub fn remote(details: impl fmt::Display) -> Self {
        ScaError::RemoteQuery {
            details: details.to_string(),
        }
    }

    pub fn parse(path: impl Into<PathBuf>, details: impl fmt::Display) -> Self {
        ScaError::Parse {
            path: path.into(),
            details: details.to_string(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, ScaError::Configuration { .. })
    }

    pub fn is_remote_query(&self) -> bool {
        matches!(self, ScaError::RemoteQuery { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::VulnerabilitiesDetected.as_i32(), 1);
        assert_eq!(ExitCode::InvalidArguments.as_i32(), 2);
        assert_eq!(ExitCode::ApplicationError.as_i32(), 3);
    }

    #[test]
    fn test_exit_code_display() {
        assert_eq!(format!("{}", ExitCode::Success), "Success (0)");
        assert_eq!(
            format!("{}", ExitCode::VulnerabilitiesDetected),
            "Vulnerabilities Detected (1)"
        );
        assert_eq!(
            format!("{}", ExitCode::ApplicationError),
            "Application Error (3)"
        );
    }

    #[test]
    fn test_missing_credential_display() {
        let error = ScaError::missing_credential();
        let display = format!("{}", error);
        assert!(display.contains("missing credential"));
        assert!(display.contains("💡 Hint:"));
        assert!(error.is_configuration());
        assert!(!error.is_remote_query());
    }

    #[test]
    fn test_missing_endpoint_display() {
        let error = ScaError::missing_endpoint();
        assert!(format!("{}", error).contains("missing endpoint"));
    }

    #[test]
    fn test_remote_query_display() {
        let error = ScaError::remote("status code: 502");
        assert!(error.is_remote_query());
        assert!(format!("{}", error).contains("status code: 502"));
    }

    #[test]
    fn test_parse_error_display() {
        let error = ScaError::parse("app/Cargo.lock", "expected `=`");
        let display = format!("{}", error);
        assert!(display.contains("Failed to parse manifest"));
        assert!(display.contains("app/Cargo.lock"));
        assert!(display.contains("expected `=`"));
    }

    #[test]
    fn test_invalid_project_path_display() {
        let error = ScaError::InvalidProjectPath {
            path: PathBuf::from("/invalid/path"),
            reason: "Directory does not exist".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Invalid project path"));
        assert!(display.contains("/invalid/path"));
        assert!(display.contains("Directory does not exist"));
    }

    #[test]
    fn test_security_error_display() {
        let error = ScaError::SecurityError {
            path: PathBuf::from("/test/symlink"),
            reason: "Symbolic links are not allowed".to_string(),
            hint: "Use a regular file instead".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Security violation"));
        assert!(display.contains("Use a regular file instead"));
    }
}
