//! Target membership: which targets compile or bundle a file.
//!
//! Membership is only ever read from the phase lists themselves, so there is
//! no cached flag to go stale when phases are edited independently.

use uuid::Uuid;

use super::ProjectGraph;
use crate::error::{ProjectError, Result};
use crate::models::{BuildPhase, FileType, NodeId, Target};

/// Whether a file of this type joins a target's sources phase by default.
pub fn should_build(file_type: &FileType) -> bool {
    file_type.is_source_code() || file_type.is_script()
}

impl ProjectGraph {
    /// Adds `file` to the sources phase of `target` when its type is
    /// buildable. Returns whether an assignment was made.
    pub fn maybe_add(&mut self, file: NodeId, target_id: Uuid) -> bool {
        let Some(file_type) = self
            .node(file)
            .and_then(|node| node.as_file())
            .map(|f| f.file_type.clone())
        else {
            return false;
        };
        if !should_build(&file_type) {
            tracing::debug!("Leaving {} ({}) unassigned", file, file_type);
            return false;
        }
        let Some(target) = self.targets_mut().iter_mut().find(|t| t.id == target_id) else {
            return false;
        };
        if target.sources.contains(&file) {
            return false;
        }
        target.sources.push(file);
        tracing::debug!("Added {} to sources of {}", file, target.name);
        true
    }

    /// Targets whose sources or resources phase lists `file`, in target order.
    pub fn members_of(&self, file: NodeId) -> Vec<&Target> {
        self.targets()
            .iter()
            .filter(|target| target.references(file))
            .collect()
    }

    /// Names of [`members_of`](Self::members_of), sorted.
    pub fn member_names(&self, file: NodeId) -> Vec<String> {
        let mut names: Vec<String> = self
            .members_of(file)
            .into_iter()
            .map(|t| t.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Places `file` in the given phase of the named target regardless of its
    /// type, creating the resources phase if the target has none.
    ///
    /// Returns `false` when the file was already listed there.
    pub fn assign(&mut self, file: NodeId, target_name: &str, phase: BuildPhase) -> Result<bool> {
        if self.node(file).and_then(|node| node.as_file()).is_none() {
            return Err(ProjectError::FileNotFound(file.to_string()));
        }
        let target = self
            .targets_mut()
            .iter_mut()
            .find(|t| t.name == target_name)
            .ok_or_else(|| ProjectError::TargetNotFound(target_name.to_string()))?;
        let list = match phase {
            BuildPhase::Sources => &mut target.sources,
            BuildPhase::Resources => target.resources.get_or_insert_with(Vec::new),
        };
        if list.contains(&file) {
            return Ok(false);
        }
        list.push(file);
        tracing::info!("Assigned {} to {} of {}", file, phase.as_str(), target_name);
        Ok(true)
    }

    /// Removes every phase entry for `files` across all targets.
    pub(crate) fn forget_memberships(&mut self, files: &[NodeId]) -> usize {
        let mut removed = 0;
        for target in self.targets_mut() {
            for file in files {
                removed += target.forget(*file);
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::models::Node;

    fn graph_with(path: &str) -> (ProjectGraph, NodeId, Uuid) {
        let mut graph = ProjectGraph::new("Demo");
        let target = graph.add_target("App", true);
        let root = graph.root_id();
        let file = graph.insert_child(root, Node::file(PathBuf::from(path)));
        (graph, file, target)
    }

    #[test]
    fn source_files_join_sources_phase() {
        let (mut graph, file, target) = graph_with("/w/main.swift");
        assert!(graph.maybe_add(file, target));
        assert_eq!(graph.targets()[0].sources, vec![file]);
        assert_eq!(graph.member_names(file), vec!["App"]);
    }

    #[test]
    fn scripts_join_sources_phase() {
        let (mut graph, file, target) = graph_with("/w/build.sh");
        assert!(graph.maybe_add(file, target));
    }

    #[test]
    fn other_types_stay_unassigned() {
        let (mut graph, file, target) = graph_with("/w/Info.plist");
        assert!(!graph.maybe_add(file, target));
        assert!(graph.members_of(file).is_empty());
    }

    #[test]
    fn maybe_add_does_not_duplicate() {
        let (mut graph, file, target) = graph_with("/w/main.swift");
        assert!(graph.maybe_add(file, target));
        assert!(!graph.maybe_add(file, target));
        assert_eq!(graph.targets()[0].sources.len(), 1);
    }

    #[test]
    fn assign_forces_resources_membership() {
        let (mut graph, file, _) = graph_with("/w/Logo.png");
        let tool_id = graph.add_target("Tool", false);

        assert!(graph.assign(file, "Tool", BuildPhase::Resources).unwrap());
        assert!(!graph.assign(file, "Tool", BuildPhase::Resources).unwrap());
        let tool = graph.targets().iter().find(|t| t.id == tool_id).unwrap();
        assert_eq!(tool.phase(BuildPhase::Resources), &[file]);
        assert_eq!(graph.member_names(file), vec!["Tool"]);
    }

    #[test]
    fn assign_to_unknown_target_fails() {
        let (mut graph, file, _) = graph_with("/w/Logo.png");
        let err = graph.assign(file, "Nope", BuildPhase::Sources).unwrap_err();
        assert!(matches!(err, ProjectError::TargetNotFound(name) if name == "Nope"));
    }

    #[test]
    fn membership_is_read_from_phases() {
        let (mut graph, file, target) = graph_with("/w/main.swift");
        graph.maybe_add(file, target);
        graph.targets_mut()[0].sources.clear();
        assert!(graph.members_of(file).is_empty());
    }
}
