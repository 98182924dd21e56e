use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FileType;

/// Stable identity of a node in the group tree.
///
/// Paths are derived from display names and may be ambiguous; membership and
/// ownership are always keyed by `NodeId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node of the group tree.
///
/// Every node except the main group has exactly one `parent`, which is always
/// a group listing this node among its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    /// Display name, used for path addressing.
    pub name: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Group(Group),
    File(FileReference),
}

/// A folder-like container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// On-disk folder, relative to the parent group's folder. `None` means
    /// the group is purely logical and shares its parent's folder.
    pub path: Option<PathBuf>,
    /// Owned children in insertion order. Display order is computed by the
    /// reporter; lookups use this order for tie-breaks.
    pub children: Vec<NodeId>,
}

/// A leaf pointing at one file on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReference {
    pub file_type: FileType,
    /// Absolute path of the file.
    pub path: PathBuf,
}

impl Node {
    pub fn group(name: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            name: name.into(),
            kind: NodeKind::Group(Group {
                path,
                children: Vec::new(),
            }),
        }
    }

    /// Builds a file reference named after the final component of `path`.
    pub fn file(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            id: NodeId::new(),
            parent: None,
            name,
            kind: NodeKind::File(FileReference {
                file_type: FileType::from_path(&path),
                path,
            }),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group(_))
    }

    pub fn as_group(&self) -> Option<&Group> {
        match &self.kind {
            NodeKind::Group(group) => Some(group),
            NodeKind::File(_) => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut Group> {
        match &mut self.kind {
            NodeKind::Group(group) => Some(group),
            NodeKind::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileReference> {
        match &self.kind {
            NodeKind::File(file) => Some(file),
            NodeKind::Group(_) => None,
        }
    }

    /// Children owned by this node; empty for file references.
    pub fn children(&self) -> &[NodeId] {
        self.as_group()
            .map(|group| group.children.as_slice())
            .unwrap_or(&[])
    }
}
