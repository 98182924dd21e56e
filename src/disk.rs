//! Filesystem port for the physical side effects of graph edits.
//!
//! Graph edits are authoritative; these calls are best-effort. Every editor
//! operation that touches disk reports what happened as a [`DiskOutcome`]
//! instead of failing after the logical edit has been applied.

use std::io;
use std::path::{Path, PathBuf};

/// Filesystem operations the editor and reporter need.
///
/// Abstracting the filesystem lets the editor run against in-memory fixtures.
pub trait Disk {
    /// Returns `true` if the path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Creates a directory and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Deletes a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be removed.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Recursively deletes a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist or cannot be removed.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Live adapter backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveDisk;

impl Disk for LiveDisk {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }
}

/// What a best-effort filesystem step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiskOutcome {
    /// No filesystem change was requested or applicable.
    Untouched,
    /// Directories created, outermost first.
    Created(Vec<PathBuf>),
    Deleted(PathBuf),
    /// The step failed; the logical edit still stands.
    Failed { path: PathBuf, reason: String },
}

impl DiskOutcome {
    pub fn failed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        let path = path.into();
        let reason = reason.to_string();
        tracing::warn!("Filesystem change failed for {}: {}", path.display(), reason);
        Self::Failed { path, reason }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of an editor operation: the logical value plus its disk outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit<T> {
    pub value: T,
    pub disk: DiskOutcome,
}

impl<T> Edit<T> {
    pub fn logical(value: T) -> Self {
        Self {
            value,
            disk: DiskOutcome::Untouched,
        }
    }
}
