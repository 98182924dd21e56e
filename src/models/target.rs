use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::NodeId;

/// A build unit holding ordered build-phase file lists.
///
/// Targets reference file nodes; they never own them. A file is a member of
/// a target when its id appears in either phase list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: Uuid,
    pub name: String,
    pub sources: Vec<NodeId>,
    /// `None` when the target has no resources phase at all.
    pub resources: Option<Vec<NodeId>>,
}

/// The build phases a file can be listed in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BuildPhase {
    Sources,
    Resources,
}

impl BuildPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sources => "sources",
            Self::Resources => "resources",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sources" => Some(Self::Sources),
            "resources" => Some(Self::Resources),
            _ => None,
        }
    }
}

impl Target {
    pub fn new(name: impl Into<String>, with_resources: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sources: Vec::new(),
            resources: with_resources.then(Vec::new),
        }
    }

    pub fn phase(&self, phase: BuildPhase) -> &[NodeId] {
        match phase {
            BuildPhase::Sources => &self.sources,
            BuildPhase::Resources => self.resources.as_deref().unwrap_or(&[]),
        }
    }

    /// Whether either phase lists `file`.
    pub fn references(&self, file: NodeId) -> bool {
        self.sources.contains(&file)
            || self
                .resources
                .as_ref()
                .is_some_and(|resources| resources.contains(&file))
    }

    /// Drops `file` from both phases. Returns how many entries were removed.
    pub fn forget(&mut self, file: NodeId) -> usize {
        let before = self.sources.len() + self.resources.as_ref().map_or(0, Vec::len);
        self.sources.retain(|id| *id != file);
        if let Some(resources) = self.resources.as_mut() {
            resources.retain(|id| *id != file);
        }
        before - self.sources.len() - self.resources.as_ref().map_or(0, Vec::len)
    }
}
