use crate::shared::error::ScaError;
use crate::shared::Result;
use std::fs;
use std::path::Path;

/// Maximum manifest size accepted by the collector (100 MB)
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validates that `path` is an existing, real (non-symlink) directory
///
/// # Security
/// Uses `symlink_metadata()` so the link itself is inspected, then
/// canonicalizes the path to reject traversal through dangling components.
///
/// # Errors
/// Returns `ScaError::InvalidProjectPath` describing the first failed check
pub fn validate_project_directory(path: &Path) -> Result<()> {
    let invalid = |reason: String| ScaError::InvalidProjectPath {
        path: path.to_path_buf(),
        reason,
    };

    if !path.exists() {
        return Err(invalid("Directory does not exist".to_string()).into());
    }

    let metadata = fs::symlink_metadata(path)
        .map_err(|e| invalid(format!("Failed to read path metadata: {}", e)))?;

    if metadata.is_symlink() {
        return Err(invalid(
            "Security: Project path is a symbolic link. For security reasons, symbolic links are not allowed."
                .to_string(),
        )
        .into());
    }

    if !metadata.is_dir() {
        return Err(invalid("Not a directory".to_string()).into());
    }

    let canonical = path
        .canonicalize()
        .map_err(|e| invalid(format!("Failed to canonicalize path: {}", e)))?;
    if !canonical.is_dir() {
        return Err(invalid("Resolved path is not a directory".to_string()).into());
    }

    Ok(())
}

/// Validates that a path exists and is a regular file (not a directory or symlink)
///
/// # Arguments
/// * `path` - The path to validate
/// * `file_description` - Description of the file for error messages (e.g., "Cargo.lock")
pub fn validate_regular_file(path: &Path, file_description: &str) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| {
        anyhow::anyhow!("Failed to read {} metadata: {}", file_description, e)
    })?;

    if metadata.is_symlink() {
        return Err(ScaError::SecurityError {
            path: path.to_path_buf(),
            reason: "File is a symbolic link".to_string(),
            hint: "Symbolic links are skipped; point the scan at the real file".to_string(),
        }
        .into());
    }

    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }

    validate_file_size(metadata.len(), path, MAX_FILE_SIZE)
}

/// Validates file size is within acceptable limits
///
/// # Errors
/// Returns an error if the file size exceeds `max_size`
pub fn validate_file_size(file_size: u64, path: &Path, max_size: u64) -> Result<()> {
    if file_size > max_size {
        anyhow::bail!(
            "Security: {} is too large ({} bytes). Maximum allowed size is {} bytes.",
            path.display(),
            file_size,
            max_size
        );
    }
    Ok(())
}
