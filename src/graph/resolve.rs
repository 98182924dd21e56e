//! Name-based addressing of groups and file references.
//!
//! Sibling display names are not unique. Every lookup takes the first match
//! in child order; file lookup walks the tree depth-first.

use super::ProjectGraph;
use crate::error::{ProjectError, Result};
use crate::models::NodeId;

/// Non-empty segments of a slash-delimited group path.
pub(crate) fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

impl ProjectGraph {
    /// First child group of `parent` displayed as `name`.
    pub(crate) fn child_group(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent).iter().copied().find(|id| {
            self.node(*id)
                .is_some_and(|node| node.is_group() && node.name == name)
        })
    }

    /// Resolves `App/Controllers/Auth` to a group. An empty path (or `/`)
    /// is the main group.
    pub fn resolve_group(&self, path: &str) -> Result<NodeId> {
        let mut current = self.root_id();
        for segment in segments(path) {
            current = self
                .child_group(current, segment)
                .ok_or_else(|| ProjectError::GroupNotFound(path.to_string()))?;
        }
        tracing::debug!("Resolved group {:?} to {}", path, current);
        Ok(current)
    }

    /// Finds a file reference whose display name equals `name_or_path` or
    /// whose real path ends with it. Blank input never matches.
    pub fn resolve_file(&self, name_or_path: &str) -> Result<NodeId> {
        if name_or_path.trim().is_empty() {
            return Err(ProjectError::FileNotFound(name_or_path.to_string()));
        }
        let found = self.files().into_iter().find(|id| {
            let Some(node) = self.node(*id) else {
                return false;
            };
            node.name == name_or_path
                || node
                    .as_file()
                    .is_some_and(|file| file.path.to_string_lossy().ends_with(name_or_path))
        });
        match found {
            Some(id) => {
                tracing::debug!("Resolved file {:?} to {}", name_or_path, id);
                Ok(id)
            }
            None => Err(ProjectError::FileNotFound(name_or_path.to_string())),
        }
    }
}
