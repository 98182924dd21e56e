//! Runtime configuration and manifest discovery.
//!
//! Configuration is via environment variables:
//! - `XCPROJ_PROJECT` - manifest to edit when `--project` is not given
//! - `RUST_LOG` - log filter (default: `xcproj=warn`)

use std::path::{Path, PathBuf};

use crate::error::{ProjectError, Result};

/// File extension of project manifests.
pub const MANIFEST_EXTENSION: &str = "xcproj";

const DEFAULT_LOG_FILTER: &str = "xcproj=warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub project: Option<PathBuf>,
    pub log_filter: String,
}

impl Config {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            project: var("XCPROJ_PROJECT")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            log_filter: var("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    /// Picks the manifest to open: the explicit path, then the configured
    /// one, then the single manifest in `dir`.
    pub fn locate_project(&self, explicit: Option<&Path>, dir: &Path) -> Result<PathBuf> {
        if let Some(path) = explicit.or(self.project.as_deref()) {
            return Ok(path.to_path_buf());
        }
        find_project_in(dir)
    }
}

/// The only `*.xcproj` entry in `dir`.
pub fn find_project_in(dir: &Path) -> Result<PathBuf> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == MANIFEST_EXTENSION))
        .collect();
    found.sort();

    match found.len() {
        0 => Err(ProjectError::ProjectNotFound(format!(
            "No .{} found in {}. Use --project to specify path.",
            MANIFEST_EXTENSION,
            dir.display()
        ))),
        1 => Ok(found.remove(0)),
        _ => Err(ProjectError::ProjectNotFound(format!(
            "Multiple .{} files found in {}. Use --project to specify which one.",
            MANIFEST_EXTENSION,
            dir.display()
        ))),
    }
}
