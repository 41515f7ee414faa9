//! File-reference lifecycle: add, add folder, move, remove.
//!
//! Removal is two-phase. [`collect_joins`] is a pure scan that gathers every
//! join pointing at a file into identity-keyed sets; only then does the
//! cascade unlink and delete. Duplicate joins for the same file (a known
//! corruption) are distinct ids in those sets, so each is removed exactly once.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::core::classifier::classify;
use crate::core::graph::Graph;
use crate::core::groups::ensure_group_path;
use crate::core::sanitize::is_path_safe;
use crate::core::types::{
    FileReference, Node, NodeId, NodeKind, SourceTree, StepKind, SynchronizedGroup, leaf_name,
};
use crate::error::{GraphError, GraphResult};

/// Exact names skipped when walking a folder.
const IGNORED_NAMES: &[&str] = &[
    ".DS_Store",
    "Thumbs.db",
    "desktop.ini",
    ".git",
    ".svn",
    ".hg",
    "xcuserdata",
    "DerivedData",
    "__MACOSX",
];

/// Suffixes of editor and merge leftovers skipped when walking a folder.
const IGNORED_SUFFIXES: &[&str] = &["~", ".swp", ".swo", ".bak", ".orig", ".tmp", ".rej"];

/// True for hidden, system and backup entries that never become references.
pub fn is_ignored_entry(name: &str, extra: &[String]) -> bool {
    name.starts_with('.')
        || IGNORED_NAMES.contains(&name)
        || IGNORED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
        || extra.iter().any(|pattern| pattern == name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddFileOutcome {
    Added { file: NodeId, joins: Vec<NodeId> },
    /// A reference with the same leaf name already exists.
    Skipped { existing: NodeId },
}

/// Directory snapshot handed to [`add_folder`]. File entries are stored as
/// reference paths verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderListing {
    pub name: String,
    pub files: Vec<String>,
    pub folders: Vec<FolderListing>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderOutcome {
    pub group: NodeId,
    pub added: Vec<NodeId>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedFile {
    pub file: NodeId,
    pub joins_removed: usize,
    pub groups_unlinked: usize,
}

/// Joins pointing at one file, grouped by owning step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinCollection {
    pub by_step: BTreeMap<NodeId, BTreeSet<NodeId>>,
    pub all: BTreeSet<NodeId>,
}

fn storage_path(path: &str) -> (String, SourceTree) {
    let trimmed = path.trim_end_matches('/');
    let trimmed = if trimmed.is_empty() { path } else { trimmed };
    let tree = if trimmed.starts_with('/') {
        SourceTree::Absolute
    } else {
        SourceTree::SourceRoot
    };
    (trimmed.to_string(), tree)
}

/// Display name recorded for a stored path: the leaf when the path has
/// directories, nothing when the path already is the leaf.
fn default_name(stored: &str) -> Option<String> {
    stored.contains('/').then(|| leaf_name(stored).to_string())
}

fn require_safe(path: &str) -> GraphResult<()> {
    if is_path_safe(path) {
        Ok(())
    } else {
        Err(GraphError::invalid(path, "path failed sanitization"))
    }
}

/// Existing reference whose leaf name equals `leaf`.
pub fn find_by_leaf(graph: &Graph, leaf: &str) -> Option<NodeId> {
    graph.iter().find_map(|(id, node)| match node {
        Node::FileReference(file) if file.leaf_name() == leaf => Some(id),
        _ => None,
    })
}

/// Add the file at `path` to the group at `group_path` and join it to each
/// target's build steps.
///
/// Compilable files join the sources step (created if missing); other kinds
/// join the resources step when the target has one.
pub fn add_file(
    graph: &mut Graph,
    path: &str,
    group_path: &str,
    targets: &[String],
) -> GraphResult<AddFileOutcome> {
    require_safe(path)?;
    let target_ids = graph.require_targets(targets)?;

    let (stored, source_tree) = storage_path(path);
    if let Some(existing) = find_by_leaf(graph, leaf_name(&stored)) {
        warn!(path, existing = %existing, "file already exists, skipping");
        return Ok(AddFileOutcome::Skipped { existing });
    }

    let group = ensure_group_path(graph, group_path)?;
    let file_kind = classify(path);
    let file = graph.add(Node::FileReference(FileReference {
        name: default_name(&stored),
        path: stored,
        source_tree,
        file_kind,
    }));
    graph.attach_child(group, file);

    let mut joins = Vec::new();
    for target in target_ids {
        let step = if file_kind.is_compilable() {
            Some(graph.ensure_step(target, StepKind::Sources))
        } else {
            graph.find_step(target, StepKind::Resources)
        };
        if let Some(step) = step {
            joins.push(graph.add_join(step, file, Vec::new()));
        }
    }
    Ok(AddFileOutcome::Added { file, joins })
}

/// Mirror `listing` as a group named after the folder under `group_path`.
///
/// With `recursive`, subfolders become nested groups and are processed before
/// the folder's own files; without it only top-level files are added.
pub fn add_folder(
    graph: &mut Graph,
    listing: &FolderListing,
    group_path: &str,
    targets: &[String],
    recursive: bool,
) -> GraphResult<FolderOutcome> {
    graph.require_targets(targets)?;
    check_listing(listing, recursive)?;

    let base = join_group_path(group_path, &listing.name);
    let group = ensure_group_path(graph, &base)?;
    let mut outcome = FolderOutcome {
        group,
        added: Vec::new(),
        skipped: Vec::new(),
    };
    add_listing(graph, listing, &base, targets, recursive, &mut outcome)?;
    Ok(outcome)
}

fn check_listing(listing: &FolderListing, recursive: bool) -> GraphResult<()> {
    require_safe(&listing.name)?;
    if listing.name.contains('/') || listing.name == ".." || listing.name == "." {
        return Err(GraphError::invalid(&listing.name, "not a folder name"));
    }
    for file in &listing.files {
        require_safe(file)?;
    }
    if recursive {
        for folder in &listing.folders {
            check_listing(folder, recursive)?;
        }
    }
    Ok(())
}

fn add_listing(
    graph: &mut Graph,
    listing: &FolderListing,
    base: &str,
    targets: &[String],
    recursive: bool,
    outcome: &mut FolderOutcome,
) -> GraphResult<()> {
    if recursive {
        for folder in &listing.folders {
            let sub_path = join_group_path(base, &folder.name);
            ensure_group_path(graph, &sub_path)?;
            add_listing(graph, folder, &sub_path, targets, recursive, outcome)?;
        }
    }
    for file in &listing.files {
        match add_file(graph, file, base, targets)? {
            AddFileOutcome::Added { file, .. } => outcome.added.push(file),
            AddFileOutcome::Skipped { .. } => outcome.skipped.push(file.clone()),
        }
    }
    Ok(())
}

fn join_group_path(parent: &str, child: &str) -> String {
    let parent = parent.trim_matches('/');
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}/{child}")
    }
}

/// Add a synchronized group for the directory at `path` and join it to each
/// target's sources step. Synchronized groups never join resources or
/// copy-files steps.
pub fn add_synchronized_folder(
    graph: &mut Graph,
    path: &str,
    group_path: &str,
    targets: &[String],
) -> GraphResult<NodeId> {
    require_safe(path)?;
    let target_ids = graph.require_targets(targets)?;
    let (stored, source_tree) = storage_path(path);
    let exists = graph.iter().any(|(_, node)| {
        matches!(node, Node::SynchronizedGroup(group) if group.path == stored)
    });
    if exists {
        return Err(GraphError::AlreadyExists {
            what: "synchronized folder",
            name: stored,
        });
    }

    let parent = ensure_group_path(graph, group_path)?;
    let synchronized = graph.add(Node::SynchronizedGroup(SynchronizedGroup {
        name: default_name(&stored),
        path: stored,
        source_tree,
    }));
    graph.attach_child(parent, synchronized);
    for target in target_ids {
        let step = graph.ensure_step(target, StepKind::Sources);
        graph.add_join(step, synchronized, Vec::new());
    }
    Ok(synchronized)
}

/// Locate a file reference, trying in order: exact path, exact display name,
/// leaf file name, path suffix. First match wins.
pub fn find_file(graph: &Graph, query: &str) -> Option<NodeId> {
    let query = query.trim_end_matches('/');
    if query.is_empty() {
        return None;
    }
    let files: Vec<(NodeId, &FileReference)> = graph
        .iter()
        .filter_map(|(id, node)| match node {
            Node::FileReference(file) => Some((id, file)),
            _ => None,
        })
        .collect();
    let leaf = leaf_name(query);

    let by_path = files.iter().find(|(_, f)| f.path == query);
    let by_name = || files.iter().find(|(_, f)| f.name.as_deref() == Some(query));
    let by_leaf = || files.iter().find(|(_, f)| f.leaf_name() == leaf);
    let by_suffix = || {
        files.iter().find(|(_, f)| {
            f.path.ends_with(&format!("/{query}")) || query.ends_with(&format!("/{}", f.path))
        })
    };
    by_path
        .or_else(by_name)
        .or_else(by_leaf)
        .or_else(by_suffix)
        .map(|(id, _)| *id)
}

/// Change a reference's path in place. Group membership and joins are
/// untouched; a display name that defaulted to the old leaf follows the move.
pub fn move_file(graph: &mut Graph, old: &str, new: &str) -> GraphResult<NodeId> {
    let id = find_file(graph, old).ok_or_else(|| GraphError::FileNotFound(old.to_string()))?;
    require_safe(new)?;
    let (stored, new_tree) = storage_path(new);

    let Some(file) = graph.file_mut(id) else {
        return Err(GraphError::FileNotFound(old.to_string()));
    };
    let old_leaf = leaf_name(&file.path).to_string();
    let name_defaulted = match file.name.as_deref() {
        None => true,
        Some(name) => name == file.path || name == old_leaf,
    };
    if name_defaulted {
        file.name = default_name(&stored);
    }
    file.source_tree = match (file.source_tree, new_tree) {
        (_, SourceTree::Absolute) => SourceTree::Absolute,
        (SourceTree::Absolute, tree) => tree,
        (tree, _) => tree,
    };
    file.path = stored;
    Ok(id)
}

/// Pure scan: every join, in any build step or loose in the pool, whose file
/// is `file`.
pub fn collect_joins(graph: &Graph, file: NodeId) -> JoinCollection {
    let mut collection = JoinCollection::default();
    for step_id in graph.nodes_of_kind(NodeKind::BuildStep) {
        let Some(step) = graph.step(step_id) else {
            continue;
        };
        for join_id in &step.joins {
            if graph.join(*join_id).is_some_and(|join| join.file == file) {
                collection.by_step.entry(step_id).or_default().insert(*join_id);
                collection.all.insert(*join_id);
            }
        }
    }
    for join_id in graph.nodes_of_kind(NodeKind::Join) {
        if graph.join(join_id).is_some_and(|join| join.file == file) {
            collection.all.insert(join_id);
        }
    }
    collection
}

/// Resolve `query` with [`find_file`] and cascade-remove the match.
pub fn remove_file(graph: &mut Graph, query: &str) -> GraphResult<RemovedFile> {
    let id = find_file(graph, query).ok_or_else(|| GraphError::FileNotFound(query.to_string()))?;
    Ok(remove_file_by_id(graph, id))
}

/// Remove a file reference and every join and group link that points at it.
pub fn remove_file_by_id(graph: &mut Graph, file: NodeId) -> RemovedFile {
    let removed = cascade_remove_member(graph, file);
    for target_id in graph.targets().to_vec() {
        if let Some(target) = graph.target_mut(target_id) {
            if target.product == Some(file) {
                target.product = None;
            }
        }
    }
    removed
}

/// Remove a synchronized group and its joins.
pub fn remove_synchronized_group(graph: &mut Graph, group: NodeId) -> RemovedFile {
    cascade_remove_member(graph, group)
}

fn cascade_remove_member(graph: &mut Graph, member: NodeId) -> RemovedFile {
    let collection = collect_joins(graph, member);
    let groups = graph.groups_containing(member);

    for (step_id, joins) in &collection.by_step {
        if let Some(step) = graph.step_mut(*step_id) {
            step.joins.retain(|join| !joins.contains(join));
        }
    }
    for join in &collection.all {
        graph.remove(*join);
    }
    for group in &groups {
        graph.detach_child(*group, member);
    }
    graph.remove(member);

    RemovedFile {
        file: member,
        joins_removed: collection.all.len(),
        groups_unlinked: groups.len(),
    }
}
