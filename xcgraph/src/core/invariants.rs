//! Structural invariants checked when a document is loaded.
//!
//! These are the violations that make a document unusable for any engine
//! (wrong node kinds behind root ids, a group cycle, a group with two
//! parents). Recoverable corruption such as orphan files, dangling joins or
//! duplicate joins is left to [`crate::core::validation`] so it can be repaired.

use std::collections::{HashMap, HashSet};

use crate::core::graph::Graph;
use crate::core::types::{Node, NodeId, NodeKind, Target};

/// Check structural invariants:
/// - Root ids point at nodes of the expected kind
/// - Target and package lists hold no duplicates
/// - Targets reference build steps, dependency edges and a configuration list
/// - Groups form a tree: no group has two parents, no cycles
pub fn validate_invariants(graph: &Graph) -> Vec<String> {
    let mut errors = Vec::new();
    let roots = graph.roots();

    expect_kind(
        graph,
        roots.root_group,
        NodeKind::Group,
        "root group",
        &mut errors,
    );
    if let Some(products) = roots.products_group {
        expect_kind(graph, products, NodeKind::Group, "products group", &mut errors);
    }
    expect_kind(
        graph,
        roots.configuration_list,
        NodeKind::ConfigurationList,
        "project configuration list",
        &mut errors,
    );

    let mut seen = HashSet::new();
    for id in &roots.targets {
        if !seen.insert(*id) {
            errors.push(format!("target {} listed twice", id));
        }
        expect_kind(graph, *id, NodeKind::Target, "target list entry", &mut errors);
        if let Some(target) = graph.target(*id) {
            validate_target(graph, *id, target, &mut errors);
        }
    }

    seen.clear();
    for id in &roots.packages {
        if !seen.insert(*id) {
            errors.push(format!("package {} listed twice", id));
        }
        expect_kind(
            graph,
            *id,
            NodeKind::PackageReference,
            "package list entry",
            &mut errors,
        );
    }

    validate_group_tree(graph, &mut errors);
    errors
}

fn validate_target(graph: &Graph, id: NodeId, target: &Target, errors: &mut Vec<String>) {
    let label = format!("target '{}' ({})", target.name, id);
    expect_kind(
        graph,
        target.configuration_list,
        NodeKind::ConfigurationList,
        &format!("{label} configuration list"),
        errors,
    );
    for step in &target.steps {
        expect_kind(graph, *step, NodeKind::BuildStep, &format!("{label} step"), errors);
    }
    for edge in &target.dependencies {
        expect_kind(
            graph,
            *edge,
            NodeKind::DependencyEdge,
            &format!("{label} dependency"),
            errors,
        );
    }
}

fn expect_kind(graph: &Graph, id: NodeId, kind: NodeKind, label: &str, errors: &mut Vec<String>) {
    match graph.get(id) {
        None => errors.push(format!("{label}: {id} missing")),
        Some(node) if node.kind() != kind => errors.push(format!(
            "{label}: {id} is a {} (expected {kind})",
            node.kind()
        )),
        Some(_) => {}
    }
}

/// Every group may be listed by at most one parent and no group may reach
/// itself through `children`.
fn validate_group_tree(graph: &Graph, errors: &mut Vec<String>) {
    let mut parents: HashMap<NodeId, NodeId> = HashMap::new();
    for (id, node) in graph.iter() {
        let Node::Group(group) = node else {
            continue;
        };
        for child in &group.children {
            if graph.group(*child).is_none() {
                continue;
            }
            if let Some(previous) = parents.insert(*child, id) {
                if previous != id {
                    errors.push(format!(
                        "group {} has two parents: {} and {}",
                        child, previous, id
                    ));
                }
            }
        }
    }

    if parents.contains_key(&graph.root_group()) {
        errors.push(format!("root group {} has a parent", graph.root_group()));
    }

    // Walking up the parent map from any group must terminate.
    for start in parents.keys() {
        let mut visited = HashSet::new();
        let mut current = *start;
        while let Some(parent) = parents.get(&current) {
            if !visited.insert(current) {
                errors.push(format!("group cycle through {}", start));
                break;
            }
            current = *parent;
        }
    }
}
