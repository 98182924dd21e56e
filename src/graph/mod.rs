//! The in-memory project graph.
//!
//! Nodes live in an arena keyed by [`NodeId`]. Ownership is the single-parent
//! tree formed by [`Node::parent`] and [`Group::children`]; target membership
//! is the independent many-to-many relation stored in each [`Target`]'s phase
//! lists. Path resolution, editing and membership live in the submodules as
//! further `impl ProjectGraph` blocks.

mod editor;
mod membership;
mod paths;
mod resolve;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{ProjectError, Result};
use crate::models::*;

pub use editor::AddFileOptions;
pub use membership::should_build;
pub use paths::absolutize;

/// Display name of the root group created with every project.
pub const MAIN_GROUP: &str = "Main Group";

/// A project: its group tree, file references and targets.
#[derive(Debug, Clone)]
pub struct ProjectGraph {
    name: String,
    root: NodeId,
    nodes: HashMap<NodeId, Node>,
    targets: Vec<Target>,
    source_root: Option<PathBuf>,
}

impl ProjectGraph {
    /// Creates a project containing only the main group.
    pub fn new(name: impl Into<String>) -> Self {
        let root = Node::group(MAIN_GROUP, None);
        let root_id = root.id;
        Self {
            name: name.into(),
            root: root_id,
            nodes: HashMap::from([(root_id, root)]),
            targets: Vec::new(),
            source_root: None,
        }
    }

    /// Rebuilds a graph from stored parts, checking the tree and membership
    /// invariants along the way.
    ///
    /// `nodes` must already carry their `children` lists in child order.
    pub fn from_parts(
        name: impl Into<String>,
        root: NodeId,
        nodes: Vec<Node>,
        targets: Vec<Target>,
    ) -> Result<Self> {
        let nodes: HashMap<NodeId, Node> = nodes.into_iter().map(|n| (n.id, n)).collect();

        let root_node = nodes
            .get(&root)
            .ok_or_else(|| ProjectError::CorruptManifest("main group is missing".into()))?;
        if !root_node.is_group() || root_node.parent.is_some() {
            return Err(ProjectError::CorruptManifest(
                "main group must be a parentless group".into(),
            ));
        }

        // Walk from the root: every node must be reached exactly once, through
        // a parent that agrees with the child's own parent link.
        let mut seen = HashSet::from([root]);
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            for child in nodes[&id].children() {
                let node = nodes.get(child).ok_or_else(|| {
                    ProjectError::CorruptManifest(format!("dangling child {}", child))
                })?;
                if node.parent != Some(id) || !seen.insert(*child) {
                    return Err(ProjectError::CorruptManifest(format!(
                        "node {} has inconsistent ownership",
                        child
                    )));
                }
                stack.push(*child);
            }
        }
        if seen.len() != nodes.len() {
            return Err(ProjectError::CorruptManifest(format!(
                "{} node(s) are not reachable from the main group",
                nodes.len() - seen.len()
            )));
        }

        for target in &targets {
            let listed = target
                .sources
                .iter()
                .chain(target.resources.iter().flatten());
            for id in listed {
                if nodes.get(id).and_then(Node::as_file).is_none() {
                    return Err(ProjectError::CorruptManifest(format!(
                        "target {} lists unknown file {}",
                        target.name, id
                    )));
                }
            }
        }

        Ok(Self {
            name: name.into(),
            root,
            nodes,
            targets,
            source_root: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Folder the main group maps to. `None` for purely in-memory projects.
    pub fn source_root(&self) -> Option<&Path> {
        self.source_root.as_deref()
    }

    pub fn set_source_root(&mut self, root: impl Into<PathBuf>) {
        self.source_root = Some(root.into());
    }

    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.set_source_root(root);
        self
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(Node::children).unwrap_or(&[])
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Registers a new target. Targets come from project configuration; the
    /// editor only changes their phase membership.
    pub fn add_target(&mut self, name: impl Into<String>, with_resources: bool) -> Uuid {
        let target = Target::new(name, with_resources);
        let id = target.id;
        tracing::info!("Added target {}", target.name);
        self.targets.push(target);
        id
    }

    pub(crate) fn targets_mut(&mut self) -> &mut [Target] {
        &mut self.targets
    }

    /// Every node below `id` in depth-first child order, `id` itself first.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(&current) {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    /// All file references in depth-first child order.
    pub fn files(&self) -> Vec<NodeId> {
        self.subtree(self.root)
            .into_iter()
            .filter(|id| self.nodes[id].as_file().is_some())
            .collect()
    }

    /// All group display paths (root excluded), depth-first.
    pub fn group_paths(&self) -> Vec<String> {
        self.subtree(self.root)
            .into_iter()
            .filter(|id| *id != self.root && self.nodes[id].is_group())
            .map(|id| self.path_of(id))
            .collect()
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    /// Slash-joined display names from (but excluding) the main group.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current.and_then(|id| self.nodes.get(&id)) {
            if node.id == self.root {
                break;
            }
            names.push(node.name.as_str());
            current = node.parent;
        }
        names.reverse();
        names.join("/")
    }

    /// Resolved on-disk location of a node.
    ///
    /// Files carry absolute paths. Groups resolve against the source root,
    /// appending the `path` component of every group on the way down.
    pub fn real_path(&self, id: NodeId) -> Option<PathBuf> {
        let node = self.nodes.get(&id)?;
        match &node.kind {
            NodeKind::File(file) => Some(file.path.clone()),
            NodeKind::Group(group) => {
                let base = match node.parent {
                    Some(parent) => self.real_path(parent)?,
                    None => self.source_root.clone()?,
                };
                Some(match &group.path {
                    Some(component) => base.join(component),
                    None => base,
                })
            }
        }
    }

    // Node primitives. Callers are responsible for membership cleanup.

    pub(crate) fn insert_child(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = node.id;
        node.parent = Some(parent);
        self.nodes.insert(id, node);
        self.attach(id, parent);
        id
    }

    pub(crate) fn attach(&mut self, id: NodeId, parent: NodeId) {
        if let Some(group) = self.nodes.get_mut(&parent).and_then(Node::as_group_mut) {
            group.children.push(id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(parent);
        }
    }

    /// Unlinks `id` from its parent, returning the former parent and the
    /// child's position so the link can be restored.
    pub(crate) fn detach(&mut self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.nodes.get_mut(&id)?.parent.take()?;
        let group = self.nodes.get_mut(&parent).and_then(Node::as_group_mut)?;
        let index = group.children.iter().position(|child| *child == id)?;
        group.children.remove(index);
        Some((parent, index))
    }

    /// Drops a detached subtree from the arena.
    pub(crate) fn discard(&mut self, id: NodeId) -> Vec<Node> {
        self.subtree(id)
            .into_iter()
            .filter_map(|id| self.nodes.remove(&id))
            .collect()
    }
}
