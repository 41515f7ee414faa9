//! Plain-text rendering of the group tree and targets for `list`.

use crate::core::graph::Graph;
use crate::core::types::{Node, NodeId};

/// Render the group tree, then each target with its steps and dependencies.
///
/// Files carry a `[Target/step, ...]` suffix naming every step that joins
/// them.
pub fn render_outline(graph: &Graph) -> String {
    let mut lines = vec!["Groups:".to_string()];
    let mut visiting = Vec::new();
    render_group(graph, graph.root_group(), 0, &mut visiting, &mut lines);

    lines.push("Targets:".to_string());
    for target_id in graph.targets() {
        let Some(target) = graph.target(*target_id) else {
            continue;
        };
        lines.push(format!("  {} ({:?})", target.name, target.product_type));
        for step_id in &target.steps {
            if let Some(step) = graph.step(*step_id) {
                lines.push(format!("    {}: {} file(s)", step.kind, step.joins.len()));
            }
        }
        let dependencies: Vec<String> = target
            .dependencies
            .iter()
            .filter_map(|edge| graph.edge(*edge))
            .map(|edge| graph.target_name(edge.target))
            .collect();
        if !dependencies.is_empty() {
            lines.push(format!("    depends on: {}", dependencies.join(", ")));
        }
    }

    if !graph.packages().is_empty() {
        lines.push("Packages:".to_string());
        for package in graph.packages().iter().filter_map(|id| graph.package(*id)) {
            lines.push(format!("  {} ({})", package.url, package.requirement));
        }
    }
    lines.join("\n")
}

fn render_group(
    graph: &Graph,
    group: NodeId,
    depth: usize,
    visiting: &mut Vec<NodeId>,
    lines: &mut Vec<String>,
) {
    let Some(node) = graph.group(group) else {
        return;
    };
    if visiting.contains(&group) {
        return;
    }
    visiting.push(group);
    for child in &node.children {
        let indent = "  ".repeat(depth + 1);
        match graph.get(*child) {
            Some(Node::Group(child_group)) => {
                lines.push(format!("{indent}{}/", child_group.display_name()));
                render_group(graph, *child, depth + 1, visiting, lines);
            }
            Some(Node::FileReference(file)) => {
                let memberships = memberships(graph, *child);
                if memberships.is_empty() {
                    lines.push(format!("{indent}{}", file.display_name()));
                } else {
                    lines.push(format!(
                        "{indent}{} [{}]",
                        file.display_name(),
                        memberships.join(", ")
                    ));
                }
            }
            Some(Node::SynchronizedGroup(synced)) => {
                lines.push(format!("{indent}{}/ (synchronized)", synced.display_name()));
            }
            Some(_) | None => lines.push(format!("{indent}<missing {child}>")),
        }
    }
    visiting.pop();
}

fn memberships(graph: &Graph, file: NodeId) -> Vec<String> {
    let mut found = Vec::new();
    for target_id in graph.targets() {
        let Some(target) = graph.target(*target_id) else {
            continue;
        };
        for step_id in &target.steps {
            if graph.step_references(*step_id, file) {
                if let Some(step) = graph.step(*step_id) {
                    found.push(format!("{}/{}", target.name, step.kind));
                }
            }
        }
    }
    found
}
