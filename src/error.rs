//! Error type shared by the graph editor, the reporter and the project store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while opening, editing, querying or saving a project.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Could not open project: {0}")]
    ProjectNotFound(String),

    #[error("Project already exists: {}", .0.display())]
    ProjectExists(PathBuf),

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error("File or group not found: {0}")]
    NotFound(String),

    #[error("Cannot move group {group} into {destination}: destination is inside the group")]
    CyclicMove { group: String, destination: String },

    #[error("The main group cannot be removed")]
    MainGroup,

    #[error("Corrupt manifest: {0}")]
    CorruptManifest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Project store error: {0}")]
    Store(#[from] rusqlite::Error),
}

pub type Result<T, E = ProjectError> = std::result::Result<T, E>;
