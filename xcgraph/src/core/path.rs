//! Path resolution over the group tree.
//!
//! Pure functions: they read the graph and the project directory they are
//! handed, and never touch the filesystem.

use std::path::{Path, PathBuf};

use crate::core::graph::Graph;
use crate::core::types::{Node, NodeId, SourceTree};

/// Absolute location of a group, file reference or synchronized group.
///
/// Returns `None` for SDK and built-products references (they have no fixed
/// location in the project tree), for nodes without a path-bearing kind, and
/// for group-relative nodes that are detached from the main group.
pub fn resolve_path(graph: &Graph, id: NodeId, project_dir: &Path) -> Option<PathBuf> {
    match graph.get(id)? {
        Node::Group(_) => group_directory(graph, id, project_dir),
        Node::FileReference(file) => {
            resolve_declared(graph, id, &file.path, file.source_tree, project_dir)
        }
        Node::SynchronizedGroup(group) => {
            resolve_declared(graph, id, &group.path, group.source_tree, project_dir)
        }
        Node::BuildStep(_)
        | Node::Join(_)
        | Node::Target(_)
        | Node::DependencyEdge(_)
        | Node::ConfigurationList(_)
        | Node::Configuration(_)
        | Node::PackageReference(_) => None,
    }
}

/// Directory that group-relative children of `group` resolve against.
///
/// A group without a `path` is purely organizational and shares its parent's
/// directory.
pub fn group_directory(graph: &Graph, group: NodeId, project_dir: &Path) -> Option<PathBuf> {
    let node = graph.group(group)?;
    match node.path.as_deref() {
        Some(path) => resolve_declared(graph, group, path, node.source_tree, project_dir),
        None => match node.source_tree {
            SourceTree::Sdk | SourceTree::BuiltProductsDir => None,
            SourceTree::Absolute | SourceTree::SourceRoot => Some(project_dir.to_path_buf()),
            SourceTree::Group => parent_directory(graph, group, project_dir),
        },
    }
}

fn resolve_declared(
    graph: &Graph,
    id: NodeId,
    path: &str,
    source_tree: SourceTree,
    project_dir: &Path,
) -> Option<PathBuf> {
    match source_tree {
        SourceTree::Absolute => Some(PathBuf::from(path)),
        SourceTree::SourceRoot => Some(project_dir.join(path)),
        SourceTree::Group => parent_directory(graph, id, project_dir).map(|dir| dir.join(path)),
        SourceTree::Sdk | SourceTree::BuiltProductsDir => None,
    }
}

fn parent_directory(graph: &Graph, id: NodeId, project_dir: &Path) -> Option<PathBuf> {
    if id == graph.root_group() {
        return Some(project_dir.to_path_buf());
    }
    let parent = graph.parent_of(id)?;
    group_directory(graph, parent, project_dir)
}

/// Return the `/`-separated display path from the main group to `id`.
///
/// The main group itself renders as an empty string; its descendants render
/// without a leading separator (`Features/Login/Login.swift`).
pub fn node_path(graph: &Graph, id: NodeId) -> Option<String> {
    let mut segments = Vec::new();
    let mut current = id;
    while current != graph.root_group() {
        segments.push(display_name(graph, current)?.to_string());
        current = graph.parent_of(current)?;
        if segments.len() > graph.len() {
            return None;
        }
    }
    segments.reverse();
    Some(segments.join("/"))
}

/// Display name of a group member.
pub fn display_name(graph: &Graph, id: NodeId) -> Option<&str> {
    match graph.get(id)? {
        Node::Group(group) => Some(group.display_name()),
        Node::FileReference(file) => Some(file.display_name()),
        Node::SynchronizedGroup(group) => Some(group.display_name()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FileKind, FileReference, Group};

    fn file(path: &str, source_tree: SourceTree) -> Node {
        Node::FileReference(FileReference {
            path: path.to_string(),
            name: None,
            source_tree,
            file_kind: FileKind::Source,
        })
    }

    fn dir_group(name: &str, path: Option<&str>) -> Node {
        Node::Group(Group {
            name: Some(name.to_string()),
            path: path.map(str::to_string),
            source_tree: SourceTree::Group,
            children: Vec::new(),
        })
    }

    #[test]
    fn group_relative_file_resolves_through_ancestor_paths() {
        let mut graph = Graph::new();
        let root = graph.root_group();
        let app = graph.add(dir_group("App", Some("App")));
        let virtual_group = graph.add(dir_group("Features", None));
        let login = graph.add(file("Login.swift", SourceTree::Group));
        graph.attach_child(root, app);
        graph.attach_child(app, virtual_group);
        graph.attach_child(virtual_group, login);

        let resolved = resolve_path(&graph, login, Path::new("/work")).expect("resolved");
        assert_eq!(resolved, PathBuf::from("/work/App/Login.swift"));
        assert_eq!(
            node_path(&graph, login),
            Some("App/Features/Login.swift".to_string())
        );
    }

    #[test]
    fn source_root_and_absolute_ignore_groups() {
        let mut graph = Graph::new();
        let root = graph.root_group();
        let nested = graph.add(dir_group("Nested", Some("Nested")));
        let project_relative = graph.add(file("Sources/A.swift", SourceTree::SourceRoot));
        let absolute = graph.add(file("/opt/shared/B.swift", SourceTree::Absolute));
        graph.attach_child(root, nested);
        graph.attach_child(nested, project_relative);
        graph.attach_child(nested, absolute);

        let dir = Path::new("/work");
        assert_eq!(
            resolve_path(&graph, project_relative, dir),
            Some(PathBuf::from("/work/Sources/A.swift"))
        );
        assert_eq!(
            resolve_path(&graph, absolute, dir),
            Some(PathBuf::from("/opt/shared/B.swift"))
        );
    }

    #[test]
    fn sdk_and_detached_nodes_do_not_resolve() {
        let mut graph = Graph::new();
        let sdk = graph.add(file("System/Library/Frameworks/UIKit.framework", SourceTree::Sdk));
        let detached = graph.add(file("Lost.swift", SourceTree::Group));
        graph.attach_child(graph.root_group(), sdk);

        let dir = Path::new("/work");
        assert_eq!(resolve_path(&graph, sdk, dir), None);
        assert_eq!(resolve_path(&graph, detached, dir), None);
        assert_eq!(node_path(&graph, detached), None);
    }
}
