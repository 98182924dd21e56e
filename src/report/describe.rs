//! Detailed information about a single file or group.

use std::path::Path;

use serde::Serialize;

use crate::disk::Disk;
use crate::error::{ProjectError, Result};
use crate::graph::ProjectGraph;
use crate::models::NodeId;

/// Information about a file reference or a group, tagged by `type` when
/// serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Description {
    File(FileInfo),
    Group(GroupInfo),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub file_type: String,
    pub path: String,
    pub exists: bool,
    /// Names of the targets whose phases list the file, in target order.
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Child display names in child order.
    pub children: Vec<String>,
    pub children_count: usize,
}

/// Describes `path`, trying it as a file first and as a group second.
pub fn describe(graph: &ProjectGraph, path: &str, disk: &dyn Disk) -> Result<Description> {
    if path.trim().is_empty() {
        return Err(ProjectError::NotFound(path.to_string()));
    }
    if let Ok(file) = graph.resolve_file(path) {
        return Ok(Description::File(file_info(graph, file, disk)));
    }
    if let Ok(group) = graph.resolve_group(path) {
        return Ok(Description::Group(group_info(graph, group)));
    }

    let last = path.rsplit('/').find(|s| !s.is_empty()).unwrap_or(path);
    if Path::new(last).extension().is_some() {
        Err(ProjectError::FileNotFound(path.to_string()))
    } else {
        Err(ProjectError::GroupNotFound(path.to_string()))
    }
}

fn file_info(graph: &ProjectGraph, id: NodeId, disk: &dyn Disk) -> FileInfo {
    let node = graph.node(id);
    let (file_type, real_path) = node
        .and_then(|n| n.as_file())
        .map(|f| (f.file_type.to_string(), f.path.clone()))
        .unwrap_or_default();
    FileInfo {
        name: node.map(|n| n.name.clone()).unwrap_or_default(),
        file_type,
        path: real_path.to_string_lossy().into_owned(),
        exists: disk.exists(&real_path),
        targets: graph
            .members_of(id)
            .into_iter()
            .map(|t| t.name.clone())
            .collect(),
    }
}

fn group_info(graph: &ProjectGraph, id: NodeId) -> GroupInfo {
    let children: Vec<String> = graph
        .children(id)
        .iter()
        .filter_map(|child| graph.node(*child))
        .map(|child| child.name.clone())
        .collect();
    GroupInfo {
        name: graph.node(id).map(|n| n.name.clone()).unwrap_or_default(),
        path: graph
            .real_path(id)
            .map(|p| p.to_string_lossy().into_owned()),
        children_count: children.len(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::LiveDisk;
    use crate::graph::AddFileOptions;

    fn graph() -> ProjectGraph {
        let mut graph = ProjectGraph::new("Demo").with_source_root("/work");
        graph.add_target("App", true);
        let options = AddFileOptions {
            group: Some("Utils".into()),
            create_groups: true,
            ..Default::default()
        };
        graph
            .add_file(Path::new("/nonexistent/Utils/helper.swift"), &options)
            .unwrap();
        graph
    }

    #[test]
    fn describes_files() {
        let graph = graph();
        let Description::File(info) = describe(&graph, "helper.swift", &LiveDisk).unwrap() else {
            panic!("expected file info");
        };
        assert_eq!(info.file_type, "sourcecode.swift");
        assert_eq!(info.path, "/nonexistent/Utils/helper.swift");
        assert!(!info.exists);
        assert_eq!(info.targets, vec!["App"]);
    }

    #[test]
    fn describes_groups() {
        let graph = graph();
        let Description::Group(info) = describe(&graph, "Utils", &LiveDisk).unwrap() else {
            panic!("expected group info");
        };
        assert_eq!(info.children, vec!["helper.swift"]);
        assert_eq!(info.children_count, 1);
        assert_eq!(info.path.as_deref(), Some("/work"));
    }

    #[test]
    fn classifies_misses() {
        let graph = graph();
        assert!(matches!(
            describe(&graph, "gone.swift", &LiveDisk),
            Err(ProjectError::FileNotFound(_))
        ));
        assert!(matches!(
            describe(&graph, "Legacy", &LiveDisk),
            Err(ProjectError::GroupNotFound(_))
        ));
        assert!(matches!(
            describe(&graph, "  ", &LiveDisk),
            Err(ProjectError::NotFound(_))
        ));
    }

    #[test]
    fn serializes_with_type_tag() {
        let graph = graph();
        let json = serde_json::to_value(describe(&graph, "Utils", &LiveDisk).unwrap()).unwrap();
        assert_eq!(json["type"], "group");
        assert_eq!(json["children_count"], 1);
    }
}
