//! Group-tree operations: hierarchical creation, subtree collection and
//! cascading subtree removal.

use crate::core::files::{remove_file_by_id, remove_synchronized_group};
use crate::core::graph::Graph;
use crate::core::path::node_path;
use crate::core::types::{Group, Node, NodeId};
use crate::error::{GraphError, GraphResult};

/// Everything reachable below a group, collected depth-first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subtree {
    pub files: Vec<NodeId>,
    pub synchronized: Vec<NodeId>,
    /// Descendant groups, excluding the group the walk started from.
    pub groups: Vec<NodeId>,
}

/// Result of [`remove_subtree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedSubtree {
    pub group: NodeId,
    pub files_removed: usize,
    pub groups_removed: usize,
}

fn split_group_path(path: &str) -> GraphResult<Vec<&str>> {
    let segments: Vec<&str> = path
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();
    if let Some(bad) = segments.iter().find(|s| **s == "." || **s == "..") {
        return Err(GraphError::invalid(
            path,
            format!("group path segment '{bad}' is not allowed"),
        ));
    }
    Ok(segments)
}

/// Walk `path` from the main group, creating any missing groups, and return
/// the leaf. An empty path names the main group.
///
/// Existing children match on display name or path, case-sensitively, so
/// calling this twice with the same path returns the same group.
pub fn ensure_group_path(graph: &mut Graph, path: &str) -> GraphResult<NodeId> {
    let segments = split_group_path(path)?;
    let mut current = graph.root_group();
    for segment in segments {
        current = match child_group(graph, current, segment) {
            Some(existing) => existing,
            None => {
                let created = graph.add(Node::Group(Group::named(segment)));
                graph.attach_child(current, created);
                created
            }
        };
    }
    Ok(current)
}

/// Resolve `path` to an existing group without creating anything.
pub fn find_group_path(graph: &Graph, path: &str) -> GraphResult<Option<NodeId>> {
    let segments = split_group_path(path)?;
    let mut current = graph.root_group();
    for segment in segments {
        match child_group(graph, current, segment) {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

fn child_group(graph: &Graph, parent: NodeId, segment: &str) -> Option<NodeId> {
    let group = graph.group(parent)?;
    group.children.iter().copied().find(|child| {
        graph
            .group(*child)
            .is_some_and(|group| group.matches_segment(segment))
    })
}

/// Collect every file reference, synchronized group and group below `group`.
pub fn collect_subtree(graph: &Graph, group: NodeId) -> Subtree {
    let mut subtree = Subtree::default();
    let mut visiting = vec![group];
    collect_inner(graph, group, &mut subtree, &mut visiting);
    subtree
}

fn collect_inner(graph: &Graph, group: NodeId, subtree: &mut Subtree, visiting: &mut Vec<NodeId>) {
    let Some(node) = graph.group(group) else {
        return;
    };
    for child in &node.children {
        match graph.get(*child) {
            Some(Node::FileReference(_)) => {
                if !subtree.files.contains(child) {
                    subtree.files.push(*child);
                }
            }
            Some(Node::SynchronizedGroup(_)) => {
                if !subtree.synchronized.contains(child) {
                    subtree.synchronized.push(*child);
                }
            }
            Some(Node::Group(_)) => {
                // A corrupted document could list an ancestor as a child.
                if visiting.contains(child) || subtree.groups.contains(child) {
                    continue;
                }
                subtree.groups.push(*child);
                visiting.push(*child);
                collect_inner(graph, *child, subtree, visiting);
                visiting.pop();
            }
            Some(_) | None => {}
        }
    }
}

/// Remove `group` and everything below it.
///
/// Files are removed through the file cascade so no join survives them. The
/// main group and the products group are refused with
/// [`GraphError::NotRemovable`].
pub fn remove_subtree(graph: &mut Graph, group: NodeId) -> GraphResult<RemovedSubtree> {
    let label = node_path(graph, group).unwrap_or_else(|| group.to_string());
    if group == graph.root_group() || Some(group) == graph.products_group() {
        return Err(GraphError::NotRemovable(label));
    }
    if graph.group(group).is_none() {
        return Err(GraphError::GroupNotFound(label));
    }

    let subtree = collect_subtree(graph, group);
    if let Some(products) = graph.products_group() {
        if subtree.groups.contains(&products) {
            return Err(GraphError::NotRemovable(label));
        }
    }

    for file in &subtree.files {
        remove_file_by_id(graph, *file);
    }
    for synchronized in &subtree.synchronized {
        remove_synchronized_group(graph, *synchronized);
    }
    for child in &subtree.groups {
        graph.remove(*child);
    }
    for parent in graph.groups_containing(group) {
        graph.detach_child(parent, group);
    }
    graph.remove(group);

    Ok(RemovedSubtree {
        group,
        files_removed: subtree.files.len() + subtree.synchronized.len(),
        groups_removed: subtree.groups.len() + 1,
    })
}

/// Resolve `path` and remove that group's subtree.
pub fn remove_group(graph: &mut Graph, path: &str) -> GraphResult<RemovedSubtree> {
    let group = find_group_path(graph, path)?
        .ok_or_else(|| GraphError::GroupNotFound(path.to_string()))?;
    remove_subtree(graph, group)
}
