//! Read-only views over the project graph: console tree, flat path list,
//! JSON summary and per-node descriptions.

mod describe;
mod tree_render;

use serde::Serialize;

use crate::graph::ProjectGraph;

pub use describe::{describe, Description, FileInfo, GroupInfo};
pub use tree_render::render_tree;

/// Project name and every file's real path, in tree order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub project: String,
    pub files: Vec<String>,
}

/// Real paths of every file reference, depth-first in child order.
pub fn render_flat(graph: &ProjectGraph) -> Vec<String> {
    graph
        .files()
        .into_iter()
        .filter_map(|id| graph.node(id)?.as_file())
        .map(|file| file.path.to_string_lossy().into_owned())
        .collect()
}

pub fn summary(graph: &ProjectGraph) -> ProjectSummary {
    ProjectSummary {
        project: graph.name().to_string(),
        files: render_flat(graph),
    }
}
