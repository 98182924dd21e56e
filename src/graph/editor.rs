//! Mutations of the group tree.
//!
//! Every operation validates and resolves before it mutates, so a failed
//! call leaves the graph exactly as it found it. Filesystem side effects run
//! after the logical edit and are reported through [`DiskOutcome`].

use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::resolve::segments;
use super::{absolutize, ProjectGraph};
use crate::disk::{Disk, DiskOutcome, Edit};
use crate::error::{ProjectError, Result};
use crate::models::{Node, NodeId};

/// Where a new file goes and which targets consider it.
#[derive(Debug, Clone, Default)]
pub struct AddFileOptions {
    /// Destination group path; the main group when `None`.
    pub group: Option<String>,
    /// Targets to offer the file to; every target when empty.
    pub targets: Vec<String>,
    /// Create the destination group path if it is missing, then retry once.
    pub create_groups: bool,
}

impl ProjectGraph {
    /// Adds a reference to an existing file and offers it to targets.
    pub fn add_file(&mut self, real_path: &Path, options: &AddFileOptions) -> Result<NodeId> {
        match self.insert_file(real_path, options) {
            Err(ProjectError::GroupNotFound(path)) if options.create_groups => {
                tracing::info!("Creating group: {}", path);
                self.within_new_groups(&path, |graph| graph.insert_file(real_path, options))
            }
            other => other,
        }
    }

    /// Creates the missing groups along `path` and runs `edit`. If `edit`
    /// fails, the groups created here are removed again.
    fn within_new_groups<T>(
        &mut self,
        path: &str,
        edit: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let (_, created) = self.ensure_groups(path, false);
        let result = edit(self);
        // Later groups all sit below the first one created.
        if let (Err(_), Some(first)) = (&result, created.first()) {
            self.detach(*first);
            let dropped = self.discard(*first);
            tracing::debug!("Rolled back {} group(s) for {}", dropped.len(), path);
        }
        result
    }

    fn insert_file(&mut self, real_path: &Path, options: &AddFileOptions) -> Result<NodeId> {
        let group = match options.group.as_deref() {
            Some(path) => self.resolve_group(path)?,
            None => self.root_id(),
        };
        let absolute = absolutize(real_path)?;
        let targets = self.select_targets(&options.targets);

        let file = self.insert_child(group, Node::file(absolute));
        for target in targets {
            self.maybe_add(file, target);
        }
        tracing::info!("Added file {}", self.path_of(file));
        Ok(file)
    }

    fn select_targets(&self, names: &[String]) -> Vec<Uuid> {
        if names.is_empty() {
            return self.targets().iter().map(|t| t.id).collect();
        }
        for name in names {
            if self.target(name).is_none() {
                tracing::warn!("Unknown target {}, skipping", name);
            }
        }
        self.targets()
            .iter()
            .filter(|t| names.contains(&t.name))
            .map(|t| t.id)
            .collect()
    }

    /// Removes a file reference and every target membership pointing at it.
    ///
    /// With `delete_from_disk` the file is deleted afterwards; a failed delete
    /// is reported in the outcome and does not undo the removal.
    pub fn remove_file(
        &mut self,
        name_or_path: &str,
        delete_from_disk: bool,
        disk: &dyn Disk,
    ) -> Result<Edit<Node>> {
        let id = self.resolve_file(name_or_path)?;
        let dropped = self.forget_memberships(&[id]);
        self.detach(id);
        let node = self
            .discard(id)
            .into_iter()
            .next()
            .ok_or_else(|| ProjectError::FileNotFound(name_or_path.to_string()))?;
        tracing::info!("Removed file {} ({} membership(s))", node.name, dropped);

        let disk = match node.as_file() {
            Some(file) if delete_from_disk => match disk.remove_file(&file.path) {
                Ok(()) => DiskOutcome::Deleted(file.path.clone()),
                Err(err) => DiskOutcome::failed(&file.path, err),
            },
            _ => DiskOutcome::Untouched,
        };
        Ok(Edit { value: node, disk })
    }

    /// Creates every missing group along `path`. Existing groups are reused,
    /// so adding the same path twice is a no-op.
    ///
    /// With `create_folder`, new groups get their own on-disk folder, created
    /// for newly added segments only.
    pub fn add_group(&mut self, path: &str, create_folder: bool, disk: &dyn Disk) -> Edit<NodeId> {
        let (group, created) = self.ensure_groups(path, create_folder);
        if created.is_empty() {
            tracing::debug!("Group {} already exists", path);
        } else {
            tracing::info!("Created {} group(s) for {}", created.len(), path);
        }
        if !create_folder || created.is_empty() {
            return Edit::logical(group);
        }

        let mut folders = Vec::with_capacity(created.len());
        for id in created {
            let Some(folder) = self.real_path(id) else {
                return Edit {
                    value: group,
                    disk: DiskOutcome::failed(self.path_of(id), "project has no source root"),
                };
            };
            if let Err(err) = disk.create_dir_all(&folder) {
                return Edit {
                    value: group,
                    disk: DiskOutcome::failed(folder, err),
                };
            }
            folders.push(folder);
        }
        Edit {
            value: group,
            disk: DiskOutcome::Created(folders),
        }
    }

    fn ensure_groups(&mut self, path: &str, with_folders: bool) -> (NodeId, Vec<NodeId>) {
        let mut current = self.root_id();
        let mut created = Vec::new();
        for segment in segments(path) {
            current = match self.child_group(current, segment) {
                Some(existing) => existing,
                None => {
                    let folder = with_folders.then(|| PathBuf::from(segment));
                    let id = self.insert_child(current, Node::group(segment, folder));
                    created.push(id);
                    id
                }
            };
        }
        (current, created)
    }

    /// Removes a group with all of its descendants and their memberships.
    ///
    /// Returns the removed nodes, the group first. `delete_folder` only
    /// applies to groups that own an on-disk folder.
    pub fn remove_group(
        &mut self,
        path: &str,
        delete_folder: bool,
        disk: &dyn Disk,
    ) -> Result<Edit<Vec<Node>>> {
        let id = self.resolve_group(path)?;
        if id == self.root_id() {
            return Err(ProjectError::MainGroup);
        }
        let owns_folder = self
            .node(id)
            .and_then(Node::as_group)
            .is_some_and(|group| group.path.is_some());
        let folder = self.real_path(id);

        let files: Vec<NodeId> = self
            .subtree(id)
            .into_iter()
            .filter(|child| self.node(*child).and_then(Node::as_file).is_some())
            .collect();
        let dropped = self.forget_memberships(&files);
        self.detach(id);
        let removed = self.discard(id);
        tracing::info!(
            "Removed group {} ({} node(s), {} membership(s))",
            path,
            removed.len(),
            dropped
        );

        let disk = match (delete_folder, owns_folder, folder) {
            (true, true, Some(folder)) => match disk.remove_dir_all(&folder) {
                Ok(()) => DiskOutcome::Deleted(folder),
                Err(err) => DiskOutcome::failed(folder, err),
            },
            (true, true, None) => DiskOutcome::failed(path, "project has no source root"),
            (true, false, _) => {
                tracing::warn!("Group {} has no folder of its own, nothing deleted", path);
                DiskOutcome::Untouched
            }
            (false, _, _) => DiskOutcome::Untouched,
        };
        Ok(Edit {
            value: removed,
            disk,
        })
    }

    /// Moves a file reference to another group. Target membership is kept.
    pub fn move_file(&mut self, name_or_path: &str, destination: &str) -> Result<()> {
        let file = self.resolve_file(name_or_path)?;
        let group = self.resolve_group(destination)?;
        self.relink(file, group)?;
        tracing::info!("Moved file {} to {}", name_or_path, destination);
        Ok(())
    }

    /// Moves a group subtree under another group.
    ///
    /// Moving a group into itself or one of its descendants is a
    /// [`ProjectError::CyclicMove`].
    pub fn move_group(&mut self, path: &str, destination: &str) -> Result<()> {
        let group = self.resolve_group(path)?;
        let parent = self.resolve_group(destination)?;
        if self.contains(group, parent) {
            return Err(ProjectError::CyclicMove {
                group: path.to_string(),
                destination: destination.to_string(),
            });
        }
        self.relink(group, parent)?;
        tracing::info!("Moved group {} to {}", path, destination);
        Ok(())
    }

    /// Detaches `id` and attaches it under `parent` in one step. If the new
    /// parent cannot take it, the original link is restored.
    fn relink(&mut self, id: NodeId, parent: NodeId) -> Result<()> {
        let (previous, index) = self.detach(id).ok_or(ProjectError::MainGroup)?;
        if self.node(parent).is_some_and(Node::is_group) {
            self.attach(id, parent);
            return Ok(());
        }
        if let Some(group) = self.nodes.get_mut(&previous).and_then(Node::as_group_mut) {
            group.children.insert(index, id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(previous);
        }
        Err(ProjectError::GroupNotFound(parent.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::io;

    use super::*;
    use crate::models::BuildPhase;

    /// Disk fake that remembers directories and refuses configured paths.
    #[derive(Default)]
    struct FakeDisk {
        dirs: RefCell<HashSet<PathBuf>>,
        refuse: Option<PathBuf>,
    }

    impl Disk for FakeDisk {
        fn exists(&self, path: &Path) -> bool {
            self.dirs.borrow().contains(path)
        }

        fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            if self.refuse.as_deref() == Some(path) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "refused"));
            }
            self.dirs.borrow_mut().insert(path.to_path_buf());
            Ok(())
        }

        fn remove_file(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }

        fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
            if self.dirs.borrow_mut().remove(path) {
                Ok(())
            } else {
                Err(io::Error::new(io::ErrorKind::NotFound, "no such directory"))
            }
        }
    }

    fn project() -> ProjectGraph {
        let mut graph = ProjectGraph::new("Demo").with_source_root("/work");
        graph.add_target("App", true);
        graph.add_target("Tests", false);
        graph
    }

    fn add(graph: &mut ProjectGraph, path: &str, group: Option<&str>) -> NodeId {
        let options = AddFileOptions {
            group: group.map(String::from),
            ..Default::default()
        };
        graph.add_file(Path::new(path), &options).unwrap()
    }

    #[test]
    fn add_file_defaults_to_main_group_and_all_targets() {
        let mut graph = project();
        let file = add(&mut graph, "/work/main.swift", None);

        assert_eq!(graph.children(graph.root_id()), &[file]);
        assert_eq!(graph.member_names(file), vec!["App", "Tests"]);
    }

    #[test]
    fn add_file_only_offers_named_targets() {
        let mut graph = project();
        let options = AddFileOptions {
            targets: vec!["Tests".into(), "Ghost".into()],
            ..Default::default()
        };
        let file = graph.add_file(Path::new("/work/Spec.swift"), &options).unwrap();
        assert_eq!(graph.member_names(file), vec!["Tests"]);
    }

    #[test]
    fn add_file_into_missing_group_leaves_graph_untouched() {
        let mut graph = project();
        let before = graph.node_count();
        let options = AddFileOptions {
            group: Some("Sources".into()),
            ..Default::default()
        };

        let err = graph.add_file(Path::new("/work/x.swift"), &options).unwrap_err();
        assert!(matches!(err, ProjectError::GroupNotFound(_)));
        assert_eq!(graph.node_count(), before);
    }

    #[test]
    fn add_file_creates_missing_groups_when_asked() {
        let mut graph = project();
        let options = AddFileOptions {
            group: Some("Sources/Models".into()),
            targets: vec!["App".into()],
            create_groups: true,
        };
        let file = graph.add_file(Path::new("/work/User.swift"), &options).unwrap();
        assert_eq!(graph.path_of(file), "Sources/Models/User.swift");
    }

    #[test]
    fn add_group_is_idempotent() {
        let mut graph = project();
        let disk = FakeDisk::default();
        let first = graph.add_group("A/B", false, &disk);
        let second = graph.add_group("A/B", false, &disk);

        assert_eq!(first.value, second.value);
        assert_eq!(graph.group_paths(), vec!["A", "A/B"]);
        assert_eq!(second.disk, DiskOutcome::Untouched);
    }

    #[test]
    fn add_group_creates_folders_for_new_segments_only() {
        let mut graph = project();
        let disk = FakeDisk::default();
        graph.add_group("A", false, &disk);

        let edit = graph.add_group("A/B/C", true, &disk);
        assert_eq!(
            edit.disk,
            DiskOutcome::Created(vec![PathBuf::from("/work/B"), PathBuf::from("/work/B/C")])
        );
    }

    #[test]
    fn add_group_folder_failure_keeps_groups() {
        let mut graph = project();
        let disk = FakeDisk {
            refuse: Some(PathBuf::from("/work/Gen")),
            ..Default::default()
        };
        let edit = graph.add_group("Gen", true, &disk);

        assert!(edit.disk.is_failure());
        assert_eq!(graph.resolve_group("Gen").unwrap(), edit.value);
    }

    #[test]
    fn remove_file_drops_all_memberships() {
        let mut graph = project();
        let file = add(&mut graph, "/work/Utils/helper.swift", None);
        graph.assign(file, "App", BuildPhase::Resources).unwrap();

        let edit = graph.remove_file("helper.swift", false, &FakeDisk::default()).unwrap();
        assert_eq!(edit.value.id, file);
        assert!(graph.targets().iter().all(|t| !t.references(file)));
        assert!(graph.node(file).is_none());
    }

    #[test]
    fn remove_file_reports_failed_delete_without_rollback() {
        let mut graph = project();
        add(&mut graph, "/work/gone.swift", None);

        let edit = graph.remove_file("gone.swift", true, &FakeDisk::default()).unwrap();
        assert!(edit.disk.is_failure());
        assert!(graph.resolve_file("gone.swift").is_err());
    }

    #[test]
    fn remove_group_cascades_memberships() {
        let mut graph = project();
        graph.add_group("Legacy", false, &FakeDisk::default());
        let a = add(&mut graph, "/work/Legacy/a.swift", Some("Legacy"));
        let b = add(&mut graph, "/work/Legacy/b.m", Some("Legacy"));

        let edit = graph.remove_group("Legacy", false, &FakeDisk::default()).unwrap();
        assert_eq!(edit.value.len(), 3);
        for file in [a, b] {
            assert!(graph.members_of(file).is_empty());
        }
        assert!(graph.targets().iter().all(|t| t.sources.is_empty()));
    }

    #[test]
    fn remove_group_only_deletes_owned_folders() {
        let mut graph = project();
        let disk = FakeDisk::default();
        graph.add_group("Owned", true, &disk);
        graph.add_group("Logical", false, &disk);

        let owned = graph.remove_group("Owned", true, &disk).unwrap();
        assert_eq!(owned.disk, DiskOutcome::Deleted(PathBuf::from("/work/Owned")));

        let logical = graph.remove_group("Logical", true, &disk).unwrap();
        assert_eq!(logical.disk, DiskOutcome::Untouched);
    }

    #[test]
    fn remove_group_keeps_logical_removal_when_folder_delete_fails() {
        let mut graph = project();
        graph.add_group("Gen", true, &FakeDisk::default());
        let file = add(&mut graph, "/work/Gen/out.swift", Some("Gen"));
        assert_eq!(graph.member_names(file), vec!["App", "Tests"]);

        // A fresh disk has no record of the folder, so the delete is refused.
        let edit = graph.remove_group("Gen", true, &FakeDisk::default()).unwrap();
        assert!(edit.disk.is_failure());
        assert!(matches!(
            graph.resolve_group("Gen"),
            Err(ProjectError::GroupNotFound(_))
        ));
        assert!(graph.targets().iter().all(|t| !t.references(file)));
    }

    #[test]
    fn failed_edit_rolls_back_new_groups() {
        let mut graph = project();
        graph.add_group("A", false, &FakeDisk::default());
        let paths = graph.group_paths();
        let before = graph.node_count();

        let result: Result<()> = graph.within_new_groups("A/B/C", |graph| {
            assert!(graph.resolve_group("A/B/C").is_ok());
            Err(ProjectError::NotFound("A/B/C".into()))
        });

        assert!(result.is_err());
        assert_eq!(graph.group_paths(), paths);
        assert_eq!(graph.node_count(), before);
    }

    #[test]
    fn successful_edit_keeps_new_groups() {
        let mut graph = project();
        let found = graph
            .within_new_groups("A/B", |graph| graph.resolve_group("A/B"))
            .unwrap();
        assert_eq!(graph.path_of(found), "A/B");
    }

    #[test]
    fn main_group_cannot_be_removed() {
        let mut graph = project();
        let err = graph.remove_group("", false, &FakeDisk::default()).unwrap_err();
        assert!(matches!(err, ProjectError::MainGroup));
    }

    #[test]
    fn move_file_keeps_membership() {
        let mut graph = project();
        let disk = FakeDisk::default();
        graph.add_group("Utils", false, &disk);
        let core = graph.add_group("Core", false, &disk).value;
        let file = add(&mut graph, "/work/helper.swift", Some("Utils"));

        graph.move_file("helper.swift", "Core").unwrap();
        assert_eq!(graph.children(core), &[file]);
        assert!(graph.children(graph.resolve_group("Utils").unwrap()).is_empty());
        assert_eq!(graph.member_names(file), vec!["App", "Tests"]);
    }

    #[test]
    fn move_group_rejects_cycles() {
        let mut graph = project();
        graph.add_group("A/B", false, &FakeDisk::default());
        let paths = graph.group_paths();

        let err = graph.move_group("A", "A/B").unwrap_err();
        assert!(matches!(err, ProjectError::CyclicMove { .. }));
        assert!(matches!(graph.move_group("A", "A"), Err(ProjectError::CyclicMove { .. })));
        assert_eq!(graph.group_paths(), paths);
    }

    #[test]
    fn move_group_carries_subtree() {
        let mut graph = project();
        let disk = FakeDisk::default();
        graph.add_group("A/B", false, &disk);
        graph.add_group("C", false, &disk);

        graph.move_group("A", "C").unwrap();
        assert_eq!(graph.group_paths(), vec!["C", "C/A", "C/A/B"]);
    }
}
