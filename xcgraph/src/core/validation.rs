//! Consistency checks and repairs for recoverable document corruption.
//!
//! Detectors are pure: they read the graph and, for path checks, ask an
//! [`FsProbe`] what exists on disk. Repairs go through the same cascades as
//! the user-facing remove operations.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::core::files::{remove_file_by_id, remove_synchronized_group};
use crate::core::graph::Graph;
use crate::core::groups::remove_subtree;
use crate::core::path::resolve_path;
use crate::core::types::{FileKind, Node, NodeId, NodeKind, SourceTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => f.write_str("file"),
            EntryKind::Directory => f.write_str("directory"),
        }
    }
}

/// Filesystem facts needed by the path checks.
pub trait FsProbe {
    /// What exists at `path`, or `None` when nothing does.
    fn entry_kind(&self, path: &Path) -> Option<EntryKind>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// File reference not reachable from the main group.
    OrphanFile { file: NodeId, path: String },
    /// Join that is missing, or whose file no longer exists.
    DanglingJoin {
        step: NodeId,
        join: NodeId,
        file: Option<NodeId>,
    },
    /// Group child id with no node behind it.
    DanglingMember { group: NodeId, member: NodeId },
    /// More than one join for the same file in one step.
    DuplicateJoin {
        step: NodeId,
        file: NodeId,
        count: usize,
    },
    MissingPath { node: NodeId, path: PathBuf },
    KindMismatch {
        node: NodeId,
        path: PathBuf,
        expected: EntryKind,
        found: EntryKind,
    },
}

impl Finding {
    /// Node a path finding refers to.
    fn path_node(&self) -> Option<NodeId> {
        match self {
            Finding::MissingPath { node, .. } | Finding::KindMismatch { node, .. } => Some(*node),
            _ => None,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::OrphanFile { file, path } => {
                write!(f, "orphan file {file} '{path}' is not in any group")
            }
            Finding::DanglingJoin {
                step,
                join,
                file: Some(file),
            } => write!(f, "join {join} in step {step} points at missing file {file}"),
            Finding::DanglingJoin {
                step,
                join,
                file: None,
            } => write!(f, "step {step} lists missing join {join}"),
            Finding::DanglingMember { group, member } => {
                write!(f, "group {group} lists missing member {member}")
            }
            Finding::DuplicateJoin { step, file, count } => {
                write!(f, "step {step} joins file {file} {count} times")
            }
            Finding::MissingPath { node, path } => {
                write!(f, "{node} path does not exist: {}", path.display())
            }
            Finding::KindMismatch {
                node,
                path,
                expected,
                found,
            } => write!(
                f,
                "{node} expected a {expected} at {} but found a {found}",
                path.display()
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

/// File references in the pool that the main group cannot reach.
pub fn detect_orphans(graph: &Graph) -> Vec<Finding> {
    let reachable = reachable_members(graph);
    graph
        .iter()
        .filter_map(|(id, node)| match node {
            Node::FileReference(file) if !reachable.contains(&id) => Some(Finding::OrphanFile {
                file: id,
                path: file.path.clone(),
            }),
            _ => None,
        })
        .collect()
}

fn reachable_members(graph: &Graph) -> HashSet<NodeId> {
    let mut seen = HashSet::new();
    let mut stack = vec![graph.root_group()];
    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        if let Some(group) = graph.group(current) {
            stack.extend(group.children.iter().copied());
        }
    }
    seen
}

/// Joins listed by a build step that are missing or point at a missing file.
pub fn detect_dangling_joins(graph: &Graph) -> Vec<Finding> {
    let mut findings = Vec::new();
    for step_id in graph.nodes_of_kind(NodeKind::BuildStep) {
        let Some(step) = graph.step(step_id) else {
            continue;
        };
        for join_id in &step.joins {
            match graph.join(*join_id) {
                None => findings.push(Finding::DanglingJoin {
                    step: step_id,
                    join: *join_id,
                    file: None,
                }),
                Some(join) if !graph.get(join.file).is_some_and(Node::is_joinable) => {
                    findings.push(Finding::DanglingJoin {
                        step: step_id,
                        join: *join_id,
                        file: Some(join.file),
                    });
                }
                Some(_) => {}
            }
        }
    }
    findings
}

/// Group children that do not exist in the pool.
pub fn detect_dangling_members(graph: &Graph) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (id, node) in graph.iter() {
        let Node::Group(group) = node else {
            continue;
        };
        for child in &group.children {
            if !graph.get(*child).is_some_and(Node::is_group_member) {
                findings.push(Finding::DanglingMember {
                    group: id,
                    member: *child,
                });
            }
        }
    }
    findings
}

/// Steps that join the same file more than once.
pub fn detect_duplicate_joins(graph: &Graph) -> Vec<Finding> {
    let mut findings = Vec::new();
    for step_id in graph.nodes_of_kind(NodeKind::BuildStep) {
        let Some(step) = graph.step(step_id) else {
            continue;
        };
        let mut counts: BTreeMap<NodeId, usize> = BTreeMap::new();
        for join in step.joins.iter().filter_map(|id| graph.join(*id)) {
            *counts.entry(join.file).or_default() += 1;
        }
        findings.extend(
            counts
                .into_iter()
                .filter(|(_, count)| *count > 1)
                .map(|(file, count)| Finding::DuplicateJoin {
                    step: step_id,
                    file,
                    count,
                }),
        );
    }
    findings
}

fn expected_entry(kind: FileKind) -> Option<EntryKind> {
    match kind {
        FileKind::Unknown => None,
        kind if kind.is_directory() => Some(EntryKind::Directory),
        _ => Some(EntryKind::File),
    }
}

/// Nodes subject to path checks, with the entry kind each should resolve to.
fn path_checked_nodes(graph: &Graph) -> Vec<(NodeId, Option<EntryKind>)> {
    let exempt = |tree: SourceTree| matches!(tree, SourceTree::Sdk | SourceTree::BuiltProductsDir);
    graph
        .iter()
        .filter_map(|(id, node)| match node {
            Node::FileReference(file) if !exempt(file.source_tree) => {
                Some((id, expected_entry(file.file_kind)))
            }
            Node::SynchronizedGroup(group) if !exempt(group.source_tree) => {
                Some((id, Some(EntryKind::Directory)))
            }
            Node::Group(group)
                if group.path.is_some()
                    && !exempt(group.source_tree)
                    && id != graph.root_group()
                    && Some(id) != graph.products_group() =>
            {
                Some((id, Some(EntryKind::Directory)))
            }
            _ => None,
        })
        .collect()
}

/// Resolve every path-bearing node and report missing entries and
/// file/directory mismatches. Detached nodes do not resolve and are skipped;
/// [`detect_orphans`] reports them.
pub fn detect_invalid_paths<P: FsProbe>(graph: &Graph, fs: &P, project_dir: &Path) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (id, expected) in path_checked_nodes(graph) {
        let Some(path) = resolve_path(graph, id, project_dir) else {
            continue;
        };
        match (fs.entry_kind(&path), expected) {
            (None, _) => findings.push(Finding::MissingPath { node: id, path }),
            (Some(found), Some(expected)) if found != expected => {
                findings.push(Finding::KindMismatch {
                    node: id,
                    path,
                    expected,
                    found,
                });
            }
            _ => {}
        }
    }
    findings
}

/// Remove every node [`detect_invalid_paths`] flags. Returns how many flagged
/// nodes are gone afterwards.
pub fn repair_invalid_paths<P: FsProbe>(graph: &mut Graph, fs: &P, project_dir: &Path) -> usize {
    let flagged: BTreeSet<NodeId> = detect_invalid_paths(graph, fs, project_dir)
        .iter()
        .filter_map(Finding::path_node)
        .collect();

    // Groups first so nested flagged members go with their subtree.
    let (groups, members): (Vec<NodeId>, Vec<NodeId>) = flagged
        .iter()
        .copied()
        .partition(|id| graph.group(*id).is_some());
    for group in groups {
        if !graph.contains(group) {
            continue;
        }
        if let Err(err) = remove_subtree(graph, group) {
            warn!(group = %group, error = %err, "cannot remove group with invalid path");
        }
    }
    for member in members {
        match graph.get(member).map(Node::kind) {
            Some(NodeKind::FileReference) => {
                remove_file_by_id(graph, member);
            }
            Some(NodeKind::SynchronizedGroup) => {
                remove_synchronized_group(graph, member);
            }
            _ => {}
        }
    }

    flagged.iter().filter(|id| !graph.contains(**id)).count()
}

/// Keep the first join per file in each step and delete the rest.
pub fn dedupe_joins(graph: &mut Graph) -> usize {
    let mut redundant: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
    for step_id in graph.nodes_of_kind(NodeKind::BuildStep) {
        let Some(step) = graph.step(step_id) else {
            continue;
        };
        let mut seen = HashSet::new();
        for join_id in &step.joins {
            if let Some(join) = graph.join(*join_id) {
                if !seen.insert(join.file) {
                    redundant.entry(step_id).or_default().insert(*join_id);
                }
            }
        }
    }

    let mut removed = 0;
    for (step_id, joins) in &redundant {
        if let Some(step) = graph.step_mut(*step_id) {
            step.joins.retain(|id| !joins.contains(id));
        }
        for join in joins {
            graph.remove(*join);
            removed += 1;
        }
    }
    removed
}

/// Drop dangling joins from their steps and dangling ids from group
/// children. Returns how many references were dropped.
pub fn repair_dangling_joins(graph: &mut Graph) -> usize {
    let joins = detect_dangling_joins(graph);
    let members = detect_dangling_members(graph);

    for finding in &joins {
        if let Finding::DanglingJoin { step, join, .. } = finding {
            if let Some(step) = graph.step_mut(*step) {
                step.joins.retain(|id| id != join);
            }
            graph.remove(*join);
        }
    }
    for finding in &members {
        if let Finding::DanglingMember { group, member } = finding {
            graph.detach_child(*group, *member);
        }
    }
    joins.len() + members.len()
}

/// Run every detector.
pub fn validate_document<P: FsProbe>(
    graph: &Graph,
    fs: &P,
    project_dir: &Path,
) -> ValidationReport {
    let mut findings = detect_orphans(graph);
    findings.extend(detect_dangling_joins(graph));
    findings.extend(detect_dangling_members(graph));
    findings.extend(detect_duplicate_joins(graph));
    findings.extend(detect_invalid_paths(graph, fs, project_dir));
    ValidationReport { findings }
}
