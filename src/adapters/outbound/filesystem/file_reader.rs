use crate::ports::outbound::{ManifestCollector, ManifestFile};
use crate::shared::error::ScaError;
use crate::shared::security::validate_regular_file;
use crate::shared::Result;
use std::fs;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into
const IGNORED_DIRS: &[&str] = &[".git", ".hg", ".svn", ".venv", "node_modules", "target"];

/// FileSystemReader adapter walking a project directory
///
/// Implements the ManifestCollector port. Symbolic links are never
/// followed and oversized files are skipped.
pub struct FileSystemReader;

impl FileSystemReader {
    pub fn new() -> Self {
        Self
    }

    /// Reads a file after the symlink, type and size checks
    ///
    /// # Errors
    /// `ScaError::FileReadError` wrapping the failed check or I/O error
    pub fn read_regular_file(path: &Path, description: &str) -> Result<String> {
        validate_regular_file(path, description)
            .and_then(|_| fs::read_to_string(path).map_err(anyhow::Error::from))
            .map_err(|e| {
                ScaError::FileReadError {
                    path: path.to_path_buf(),
                    details: e.to_string(),
                }
                .into()
            })
    }

    fn is_ignored(entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| IGNORED_DIRS.contains(&name))
    }

    fn relative_path(root: &Path, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(root).ok()?;
        let parts: Option<Vec<&str>> = relative.iter().map(|c| c.to_str()).collect();
        Some(parts?.join("/"))
    }
}

impl Default for FileSystemReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestCollector for FileSystemReader {
    fn collect(
        &self,
        project_path: &Path,
        accept: &dyn Fn(&str) -> bool,
    ) -> Result<Vec<ManifestFile>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(project_path)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(ScaError::InvalidProjectPath {
                        path: project_path.to_path_buf(),
                        reason: err.to_string(),
                    }
                    .into());
                }
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            if entry.path_is_symlink() {
                tracing::debug!(path = %entry.path().display(), "skipping symbolic link");
                continue;
            }
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(relpath) = Self::relative_path(project_path, entry.path()) else {
                tracing::debug!(path = %entry.path().display(), "skipping non UTF-8 path");
                continue;
            };
            if !accept(&relpath) {
                continue;
            }

            match Self::read_regular_file(entry.path(), &relpath) {
                Ok(content) => files.push(ManifestFile::new(relpath, content)),
                Err(err) => tracing::warn!(path = %relpath, error = %err, "skipping manifest"),
            }
        }

        tracing::debug!(count = files.len(), "collected manifest files");
        Ok(files)
    }
}
