//! Console tree rendering for the group hierarchy.
//!
//! Files and groups are interleaved and sorted by display name; equal names
//! keep their child order. Groups are followed by their own children,
//! indented one level deeper.

use crate::graph::ProjectGraph;
use crate::models::{FileType, NodeId, NodeKind};

const GROUP: &str = "📁";
const SWIFT: &str = "🔷";
const C_FAMILY: &str = "📘";
const OBJC: &str = "📙";
const PLIST: &str = "📋";
const IMAGE: &str = "🖼️ ";
const ASSET_CATALOG: &str = "🎨";
const OTHER: &str = "📄";

const INDENT: &str = "  ";

/// Get the icon for a file type.
fn file_icon(file_type: &FileType) -> &'static str {
    match file_type.as_str() {
        "sourcecode.swift" => SWIFT,
        "text.plist.xml" => PLIST,
        "folder.assetcatalog" => ASSET_CATALOG,
        t if t.starts_with("sourcecode.c") => C_FAMILY,
        t if t.starts_with("sourcecode.objc") => OBJC,
        _ if file_type.is_image() => IMAGE,
        _ => OTHER,
    }
}

/// Render the children of `group`, one line per node, starting at `depth`.
///
/// With `show_targets`, file lines end in ` [A, B]` listing the sorted names
/// of the targets that reference the file; the suffix is omitted when none do.
///
/// Example output:
/// ```text
/// 🔷 AppDelegate.swift [App]
/// 📁 Models/
///   🔷 User.swift [App, AppTests]
/// 📋 Info.plist
/// ```
pub fn render_tree(
    graph: &ProjectGraph,
    group: NodeId,
    depth: usize,
    show_targets: bool,
) -> Vec<String> {
    let mut lines = Vec::new();
    render_children(graph, group, depth, show_targets, &mut lines);
    lines
}

fn render_children(
    graph: &ProjectGraph,
    group: NodeId,
    depth: usize,
    show_targets: bool,
    lines: &mut Vec<String>,
) {
    let mut children: Vec<_> = graph
        .children(group)
        .iter()
        .filter_map(|id| graph.node(*id))
        .collect();
    // Stable sort keeps child order among equal names.
    children.sort_by(|a, b| a.name.cmp(&b.name));

    let prefix = INDENT.repeat(depth);
    for child in children {
        match &child.kind {
            NodeKind::Group(_) => {
                lines.push(format!("{}{} {}/", prefix, GROUP, child.name));
                render_children(graph, child.id, depth + 1, show_targets, lines);
            }
            NodeKind::File(file) => {
                let mut line = format!("{}{} {}", prefix, file_icon(&file.file_type), child.name);
                if show_targets {
                    let names = graph.member_names(child.id);
                    if !names.is_empty() {
                        line.push_str(&format!(" [{}]", names.join(", ")));
                    }
                }
                lines.push(line);
            }
        }
    }
}
