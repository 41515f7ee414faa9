//! Arena-backed node store for a project document.
//!
//! `Graph` owns every node keyed by [`NodeId`] plus the document roots (main
//! group, products group, target list, package list, project configurations).
//! A child→parent index for group members is maintained alongside the arena so
//! parent lookups never scan the whole pool.
//!
//! Pool primitives (`add`, `remove`) only touch pool membership. Callers unlink
//! references before deleting; anything left behind is reported by
//! [`crate::core::validation`].

use std::collections::{BTreeMap, HashMap};

use crate::core::types::{
    BuildStep, Configuration, ConfigurationList, DependencyEdge, FileReference, Group, Join, Node,
    NodeId, NodeKind, PackageReference, SourceTree, StepKind, SynchronizedGroup, Target,
};
use crate::error::{GraphError, GraphResult};

/// Names of the two configurations every configuration list starts with.
pub const STANDARD_CONFIGURATIONS: [&str; 2] = ["Debug", "Release"];

/// Name of the group holding built products.
pub const PRODUCTS_GROUP_NAME: &str = "Products";

/// Document roots, serialized next to the node pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphRoots {
    pub root_group: NodeId,
    pub products_group: Option<NodeId>,
    pub targets: Vec<NodeId>,
    pub packages: Vec<NodeId>,
    pub configuration_list: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    nodes: BTreeMap<NodeId, Node>,
    parents: HashMap<NodeId, NodeId>,
    next_id: u64,
    roots: GraphRoots,
}

impl Graph {
    /// Empty project: main group containing a products group, no targets, and a
    /// project-level configuration list with the standard configurations.
    pub fn new() -> Self {
        let placeholder = NodeId(0);
        let mut graph = Self {
            nodes: BTreeMap::new(),
            parents: HashMap::new(),
            next_id: 1,
            roots: GraphRoots {
                root_group: placeholder,
                products_group: None,
                targets: Vec::new(),
                packages: Vec::new(),
                configuration_list: placeholder,
            },
        };

        let root = graph.add(Node::Group(Group {
            name: None,
            path: None,
            source_tree: SourceTree::Group,
            children: Vec::new(),
        }));
        let products = graph.add(Node::Group(Group::named(PRODUCTS_GROUP_NAME)));
        graph.roots.root_group = root;
        graph.attach_child(root, products);
        graph.roots.products_group = Some(products);
        graph.roots.configuration_list = graph.add_configuration_list(&[]);
        graph
    }

    /// Rebuild a graph from persisted parts. Structural checks are the
    /// caller's job (see [`crate::core::invariants`]).
    pub fn from_parts(roots: GraphRoots, nodes: BTreeMap<NodeId, Node>, next_id: u64) -> Self {
        let floor = nodes.keys().next_back().map(|id| id.0 + 1).unwrap_or(1);
        let mut graph = Self {
            nodes,
            parents: HashMap::new(),
            next_id: next_id.max(floor),
            roots,
        };
        graph.rebuild_parent_index();
        graph
    }

    pub fn roots(&self) -> &GraphRoots {
        &self.roots
    }

    pub fn root_group(&self) -> NodeId {
        self.roots.root_group
    }

    pub fn products_group(&self) -> Option<NodeId> {
        self.roots.products_group
    }

    pub fn targets(&self) -> &[NodeId] {
        &self.roots.targets
    }

    pub fn packages(&self) -> &[NodeId] {
        &self.roots.packages
    }

    pub fn project_configuration_list(&self) -> NodeId {
        self.roots.configuration_list
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert `node` under a freshly allocated id.
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    /// Delete `id` from the pool. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.parents.remove(&id);
        self.nodes.remove(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Ids of every node of `kind`, in id order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.kind() == kind)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn group(&self, id: NodeId) -> Option<&Group> {
        match self.nodes.get(&id) {
            Some(Node::Group(group)) => Some(group),
            _ => None,
        }
    }

    pub fn group_mut(&mut self, id: NodeId) -> Option<&mut Group> {
        match self.nodes.get_mut(&id) {
            Some(Node::Group(group)) => Some(group),
            _ => None,
        }
    }

    pub fn file(&self, id: NodeId) -> Option<&FileReference> {
        match self.nodes.get(&id) {
            Some(Node::FileReference(file)) => Some(file),
            _ => None,
        }
    }

    pub fn file_mut(&mut self, id: NodeId) -> Option<&mut FileReference> {
        match self.nodes.get_mut(&id) {
            Some(Node::FileReference(file)) => Some(file),
            _ => None,
        }
    }

    pub fn synchronized_group(&self, id: NodeId) -> Option<&SynchronizedGroup> {
        match self.nodes.get(&id) {
            Some(Node::SynchronizedGroup(group)) => Some(group),
            _ => None,
        }
    }

    pub fn step(&self, id: NodeId) -> Option<&BuildStep> {
        match self.nodes.get(&id) {
            Some(Node::BuildStep(step)) => Some(step),
            _ => None,
        }
    }

    pub fn step_mut(&mut self, id: NodeId) -> Option<&mut BuildStep> {
        match self.nodes.get_mut(&id) {
            Some(Node::BuildStep(step)) => Some(step),
            _ => None,
        }
    }

    pub fn join(&self, id: NodeId) -> Option<&Join> {
        match self.nodes.get(&id) {
            Some(Node::Join(join)) => Some(join),
            _ => None,
        }
    }

    pub fn join_mut(&mut self, id: NodeId) -> Option<&mut Join> {
        match self.nodes.get_mut(&id) {
            Some(Node::Join(join)) => Some(join),
            _ => None,
        }
    }

    pub fn target(&self, id: NodeId) -> Option<&Target> {
        match self.nodes.get(&id) {
            Some(Node::Target(target)) => Some(target),
            _ => None,
        }
    }

    pub fn target_mut(&mut self, id: NodeId) -> Option<&mut Target> {
        match self.nodes.get_mut(&id) {
            Some(Node::Target(target)) => Some(target),
            _ => None,
        }
    }

    pub fn edge(&self, id: NodeId) -> Option<&DependencyEdge> {
        match self.nodes.get(&id) {
            Some(Node::DependencyEdge(edge)) => Some(edge),
            _ => None,
        }
    }

    pub fn configuration_list(&self, id: NodeId) -> Option<&ConfigurationList> {
        match self.nodes.get(&id) {
            Some(Node::ConfigurationList(list)) => Some(list),
            _ => None,
        }
    }

    pub fn configuration(&self, id: NodeId) -> Option<&Configuration> {
        match self.nodes.get(&id) {
            Some(Node::Configuration(configuration)) => Some(configuration),
            _ => None,
        }
    }

    pub fn configuration_mut(&mut self, id: NodeId) -> Option<&mut Configuration> {
        match self.nodes.get_mut(&id) {
            Some(Node::Configuration(configuration)) => Some(configuration),
            _ => None,
        }
    }

    pub fn package(&self, id: NodeId) -> Option<&PackageReference> {
        match self.nodes.get(&id) {
            Some(Node::PackageReference(package)) => Some(package),
            _ => None,
        }
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    /// Append `child` to `parent`'s children and record the back-reference.
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(group) = self.group_mut(parent) {
            group.children.push(child);
            self.parents.insert(child, parent);
        }
    }

    /// Drop every occurrence of `child` from `parent`'s children.
    pub fn detach_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(group) = self.group_mut(parent) {
            group.children.retain(|id| *id != child);
        }
        if self.parents.get(&child) == Some(&parent) {
            self.parents.remove(&child);
        }
    }

    /// Every group listing `child`, found by scanning the pool.
    ///
    /// A well-formed document yields at most one group; corrupted documents
    /// may list a member twice.
    pub fn groups_containing(&self, child: NodeId) -> Vec<NodeId> {
        self.iter()
            .filter_map(|(id, node)| match node {
                Node::Group(group) if group.children.contains(&child) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn rebuild_parent_index(&mut self) {
        self.parents.clear();
        for (id, node) in &self.nodes {
            if let Node::Group(group) = node {
                for child in &group.children {
                    self.parents.entry(*child).or_insert(*id);
                }
            }
        }
    }

    pub fn find_target(&self, name: &str) -> Option<NodeId> {
        self.roots
            .targets
            .iter()
            .copied()
            .find(|id| self.target(*id).is_some_and(|target| target.name == name))
    }

    pub fn require_target(&self, name: &str) -> GraphResult<NodeId> {
        self.find_target(name)
            .ok_or_else(|| GraphError::TargetNotFound(name.to_string()))
    }

    /// Resolve every name before any caller mutates, so a typo fails the
    /// whole operation up front.
    pub fn require_targets(&self, names: &[String]) -> GraphResult<Vec<NodeId>> {
        names.iter().map(|name| self.require_target(name)).collect()
    }

    pub fn target_name(&self, id: NodeId) -> String {
        self.target(id)
            .map(|target| target.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub(crate) fn push_target(&mut self, id: NodeId) {
        self.roots.targets.push(id);
    }

    pub(crate) fn unlist_target(&mut self, id: NodeId) {
        self.roots.targets.retain(|existing| *existing != id);
    }

    pub(crate) fn push_package(&mut self, id: NodeId) {
        self.roots.packages.push(id);
    }

    pub(crate) fn unlist_package(&mut self, id: NodeId) {
        self.roots.packages.retain(|existing| *existing != id);
    }

    /// First step of `kind` on `target`.
    pub fn find_step(&self, target: NodeId, kind: StepKind) -> Option<NodeId> {
        let target = self.target(target)?;
        target
            .steps
            .iter()
            .copied()
            .find(|id| self.step(*id).is_some_and(|step| step.kind == kind))
    }

    /// Existing step of `kind` on `target`, or a new empty one appended to it.
    pub fn ensure_step(&mut self, target: NodeId, kind: StepKind) -> NodeId {
        if let Some(existing) = self.find_step(target, kind) {
            return existing;
        }
        let step = self.add(Node::BuildStep(BuildStep::new(kind)));
        if let Some(target) = self.target_mut(target) {
            target.steps.push(step);
        }
        step
    }

    /// Create a join from `file` into `step`.
    pub fn add_join(&mut self, step: NodeId, file: NodeId, attributes: Vec<String>) -> NodeId {
        let join = self.add(Node::Join(Join { file, attributes }));
        if let Some(step) = self.step_mut(step) {
            step.joins.push(join);
        }
        join
    }

    /// True when some join in `step` already points at `file`.
    pub fn step_references(&self, step: NodeId, file: NodeId) -> bool {
        self.step(step).is_some_and(|step| {
            step.joins
                .iter()
                .any(|join| self.join(*join).is_some_and(|join| join.file == file))
        })
    }

    /// New configuration list holding the standard configurations. `settings`
    /// pairs apply to every configuration.
    pub fn add_configuration_list(&mut self, settings: &[(&str, &str)]) -> NodeId {
        let shared: BTreeMap<String, String> = settings
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        let configurations = STANDARD_CONFIGURATIONS
            .iter()
            .map(|name| {
                self.add(Node::Configuration(Configuration {
                    name: name.to_string(),
                    settings: shared.clone(),
                }))
            })
            .collect();
        self.add(Node::ConfigurationList(ConfigurationList {
            configurations,
            default_configuration: STANDARD_CONFIGURATIONS[1].to_string(),
        }))
    }

    /// Configuration ids of `list`, in declared order.
    pub fn configurations_of(&self, list: NodeId) -> Vec<NodeId> {
        self.configuration_list(list)
            .map(|list| list.configurations.clone())
            .unwrap_or_default()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FileKind;

    fn file(path: &str) -> Node {
        Node::FileReference(FileReference {
            path: path.to_string(),
            name: None,
            source_tree: SourceTree::Group,
            file_kind: FileKind::Source,
        })
    }

    #[test]
    fn new_graph_has_main_and_products_groups() {
        let graph = Graph::new();
        let root = graph.group(graph.root_group()).expect("root group");
        let products = graph.products_group().expect("products group");
        assert_eq!(root.children, vec![products]);
        assert_eq!(graph.parent_of(products), Some(graph.root_group()));

        let configs = graph.configurations_of(graph.project_configuration_list());
        let names: Vec<&str> = configs
            .iter()
            .filter_map(|id| graph.configuration(*id))
            .map(|config| config.name.as_str())
            .collect();
        assert_eq!(names, vec!["Debug", "Release"]);
    }

    #[test]
    fn identical_nodes_get_distinct_ids() {
        let mut graph = Graph::new();
        let a = graph.add(file("a.swift"));
        let b = graph.add(file("a.swift"));
        assert_ne!(a, b);
        assert_eq!(graph.get(a), graph.get(b));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut graph = Graph::new();
        let id = graph.add(file("a.swift"));
        assert!(graph.remove(id).is_some());
        assert!(graph.remove(id).is_none());
        assert!(!graph.contains(id));
    }

    #[test]
    fn nodes_of_kind_filters_by_variant() {
        let mut graph = Graph::new();
        let a = graph.add(file("a.swift"));
        let b = graph.add(file("b.swift"));
        assert_eq!(graph.nodes_of_kind(NodeKind::FileReference), vec![a, b]);
        assert_eq!(graph.nodes_of_kind(NodeKind::Group).len(), 2);
    }

    #[test]
    fn from_parts_rebuilds_parent_index_and_id_floor() {
        let graph = Graph::new();
        let nodes: BTreeMap<NodeId, Node> = graph.iter().map(|(id, n)| (id, n.clone())).collect();
        let rebuilt = Graph::from_parts(graph.roots().clone(), nodes, 0);
        assert_eq!(rebuilt, graph);

        let products = graph.products_group().expect("products");
        assert_eq!(rebuilt.parent_of(products), Some(graph.root_group()));
    }

    #[test]
    fn detach_child_clears_back_reference() {
        let mut graph = Graph::new();
        let root = graph.root_group();
        let id = graph.add(file("a.swift"));
        graph.attach_child(root, id);
        graph.detach_child(root, id);
        assert_eq!(graph.parent_of(id), None);
        assert!(graph.groups_containing(id).is_empty());
    }
}
