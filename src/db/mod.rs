//! The project store: loads a manifest into a [`ProjectGraph`] and writes it
//! back.
//!
//! A manifest is a SQLite database. `save` replaces the stored graph inside a
//! single transaction, so a manifest on disk is always either the previous
//! complete graph or the new one.

mod schema;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use uuid::Uuid;

use crate::error::{ProjectError, Result};
use crate::graph::{absolutize, ProjectGraph};
use crate::models::*;

pub struct ProjectStore {
    conn: Connection,
    path: Option<PathBuf>,
}

struct NodeRow {
    id: String,
    parent_id: Option<String>,
    kind: String,
    name: String,
    path: Option<String>,
    file_type: Option<String>,
}

impl ProjectStore {
    /// Writes a new manifest at `path` holding `graph`.
    pub fn create(path: impl AsRef<Path>, graph: &ProjectGraph) -> Result<Self> {
        let path = absolutize(path.as_ref())?;
        if path.exists() {
            return Err(ProjectError::ProjectExists(path));
        }
        let conn = Connection::open(&path)?;
        schema::create_schema(&conn)?;
        let mut store = Self {
            conn,
            path: Some(path),
        };
        store.save(graph)?;
        tracing::info!("Created project {}", graph.name());
        Ok(store)
    }

    /// Opens an existing manifest. Never creates one.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = absolutize(path.as_ref())?;
        let not_found = |reason: String| {
            ProjectError::ProjectNotFound(format!("{}: {}", path.display(), reason))
        };

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&path, flags).map_err(|e| not_found(e.to_string()))?;
        match schema::has_schema(&conn) {
            Ok(true) => {}
            Ok(false) => return Err(not_found("not a project manifest".into())),
            Err(e) => return Err(not_found(e.to_string())),
        }
        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    /// A store without a backing file, for tests.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::create_schema(&conn)?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Reads the stored graph. The manifest's directory becomes the
    /// graph's source root.
    pub fn load(&self) -> Result<ProjectGraph> {
        let (name, root): (String, String) = self
            .conn
            .query_row("SELECT name, root_id FROM project WHERE id = 1", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()?
            .ok_or_else(|| ProjectError::CorruptManifest("missing project record".into()))?;
        let root = parse_node_id(&root)?;

        let nodes = self.load_nodes()?;
        let targets = self.load_targets()?;
        let mut graph = ProjectGraph::from_parts(name, root, nodes, targets)?;
        if let Some(dir) = self.path.as_deref().and_then(Path::parent) {
            graph.set_source_root(dir);
        }
        tracing::info!(
            "Loaded project {} ({} nodes, {} targets)",
            graph.name(),
            graph.node_count(),
            graph.targets().len()
        );
        Ok(graph)
    }

    fn load_nodes(&self) -> Result<Vec<Node>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, parent_id, kind, name, path, file_type
             FROM nodes ORDER BY parent_id, position",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(NodeRow {
                    id: row.get(0)?,
                    parent_id: row.get(1)?,
                    kind: row.get(2)?,
                    name: row.get(3)?,
                    path: row.get(4)?,
                    file_type: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut order = Vec::with_capacity(rows.len());
        let mut nodes: HashMap<NodeId, Node> = HashMap::with_capacity(rows.len());
        let mut links = Vec::new();
        for row in rows {
            let id = parse_node_id(&row.id)?;
            let kind = match row.kind.as_str() {
                "group" => NodeKind::Group(Group {
                    path: row.path.map(PathBuf::from),
                    children: Vec::new(),
                }),
                "file" => {
                    let path = row.path.map(PathBuf::from).ok_or_else(|| {
                        ProjectError::CorruptManifest(format!("file {} has no path", row.id))
                    })?;
                    let file_type = row
                        .file_type
                        .map(FileType::new)
                        .unwrap_or_else(|| FileType::from_path(&path));
                    NodeKind::File(FileReference { file_type, path })
                }
                other => {
                    return Err(ProjectError::CorruptManifest(format!(
                        "unknown node kind {}",
                        other
                    )))
                }
            };
            let parent = row.parent_id.as_deref().map(parse_node_id).transpose()?;
            if let Some(parent) = parent {
                links.push((parent, id));
            }
            order.push(id);
            nodes.insert(
                id,
                Node {
                    id,
                    parent,
                    name: row.name,
                    kind,
                },
            );
        }

        // Rows arrive sorted by (parent, position), so pushing preserves
        // child order.
        for (parent, child) in links {
            let group = nodes
                .get_mut(&parent)
                .and_then(Node::as_group_mut)
                .ok_or_else(|| {
                    ProjectError::CorruptManifest(format!("node {} has no valid parent", child))
                })?;
            group.children.push(child);
        }

        Ok(order.into_iter().filter_map(|id| nodes.remove(&id)).collect())
    }

    fn load_targets(&self) -> Result<Vec<Target>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, has_resources FROM targets ORDER BY position")?;
        let mut targets = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i32>(2)? != 0,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|(id, name, has_resources)| {
                let id = Uuid::parse_str(&id)
                    .map_err(|_| ProjectError::CorruptManifest(format!("bad target id {}", id)))?;
                Ok(Target {
                    id,
                    name,
                    sources: Vec::new(),
                    resources: has_resources.then(Vec::new),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT target_id, phase, node_id FROM phase_files
             ORDER BY target_id, phase, position",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for (target_id, phase, node_id) in entries {
            let target = targets
                .iter_mut()
                .find(|t| t.id.to_string() == target_id)
                .ok_or_else(|| {
                    ProjectError::CorruptManifest(format!("phase entry for unknown target {}", target_id))
                })?;
            let file = parse_node_id(&node_id)?;
            match BuildPhase::from_str(&phase) {
                Some(BuildPhase::Sources) => target.sources.push(file),
                Some(BuildPhase::Resources) => {
                    target.resources.get_or_insert_with(Vec::new).push(file)
                }
                None => {
                    return Err(ProjectError::CorruptManifest(format!(
                        "unknown build phase {}",
                        phase
                    )))
                }
            }
        }
        Ok(targets)
    }

    /// Replaces the stored graph with `graph` in one transaction.
    pub fn save(&mut self, graph: &ProjectGraph) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM phase_files; DELETE FROM targets; DELETE FROM nodes; DELETE FROM project;",
        )?;
        tx.execute(
            "INSERT INTO project (id, name, root_id, saved_at) VALUES (1, ?, ?, ?)",
            (
                graph.name(),
                graph.root_id().to_string(),
                Utc::now().to_rfc3339(),
            ),
        )?;

        {
            let mut insert_node = tx.prepare(
                "INSERT INTO nodes (id, parent_id, position, kind, name, path, file_type)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )?;
            for id in graph.subtree(graph.root_id()) {
                let Some(node) = graph.node(id) else {
                    continue;
                };
                let position = node
                    .parent
                    .and_then(|parent| graph.children(parent).iter().position(|c| *c == id))
                    .unwrap_or(0);
                let (kind, path, file_type) = match &node.kind {
                    NodeKind::Group(group) => (
                        "group",
                        group.path.as_ref().map(|p| p.to_string_lossy().into_owned()),
                        None,
                    ),
                    NodeKind::File(file) => (
                        "file",
                        Some(file.path.to_string_lossy().into_owned()),
                        Some(file.file_type.as_str().to_string()),
                    ),
                };
                insert_node.execute((
                    id.to_string(),
                    node.parent.map(|p| p.to_string()),
                    position as i64,
                    kind,
                    &node.name,
                    path,
                    file_type,
                ))?;
            }

            let mut insert_target = tx.prepare(
                "INSERT INTO targets (id, position, name, has_resources) VALUES (?, ?, ?, ?)",
            )?;
            let mut insert_entry = tx.prepare(
                "INSERT INTO phase_files (target_id, phase, position, node_id) VALUES (?, ?, ?, ?)",
            )?;
            for (position, target) in graph.targets().iter().enumerate() {
                insert_target.execute((
                    target.id.to_string(),
                    position as i64,
                    &target.name,
                    if target.resources.is_some() { 1 } else { 0 },
                ))?;
                for phase in [BuildPhase::Sources, BuildPhase::Resources] {
                    for (position, file) in target.phase(phase).iter().enumerate() {
                        insert_entry.execute((
                            target.id.to_string(),
                            phase.as_str(),
                            position as i64,
                            file.to_string(),
                        ))?;
                    }
                }
            }
        }

        tx.commit()?;
        tracing::info!("Saved project {} ({} nodes)", graph.name(), graph.node_count());
        Ok(())
    }
}

fn parse_node_id(s: &str) -> Result<NodeId> {
    NodeId::parse(s).ok_or_else(|| ProjectError::CorruptManifest(format!("bad node id {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trips_empty_project() {
        let mut store = ProjectStore::open_memory().unwrap();
        let graph = ProjectGraph::new("Empty");
        store.save(&graph).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.name(), "Empty");
        assert_eq!(loaded.root_id(), graph.root_id());
        assert_eq!(loaded.node_count(), 1);
        assert_eq!(loaded.source_root(), None);
    }

    #[test]
    fn test_load_without_project_record_is_corrupt() {
        let store = ProjectStore::open_memory().unwrap();
        assert!(matches!(store.load(), Err(ProjectError::CorruptManifest(_))));
    }

    #[test]
    fn test_dangling_parent_is_corrupt() {
        let mut store = ProjectStore::open_memory().unwrap();
        store.save(&ProjectGraph::new("Demo")).unwrap();
        store
            .conn
            .execute(
                "INSERT INTO nodes (id, parent_id, position, kind, name) VALUES (?, ?, 0, 'group', 'Lost')",
                (NodeId::new().to_string(), NodeId::new().to_string()),
            )
            .unwrap();
        assert!(matches!(store.load(), Err(ProjectError::CorruptManifest(_))));
    }

    #[test]
    fn test_open_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProjectStore::open(dir.path().join("Missing.xcproj")).err().unwrap();
        assert!(matches!(err, ProjectError::ProjectNotFound(_)));
        assert!(!dir.path().join("Missing.xcproj").exists());
    }
}
