//! Target lifecycle, dependency edges and framework linking.

use std::collections::{BTreeSet, HashSet};

use crate::core::graph::Graph;
use crate::core::groups::ensure_group_path;
use crate::core::types::{
    BuildStep, Configuration, ConfigurationList, CopyDestination, DependencyEdge, FileKind,
    FileReference, Node, NodeId, Platform, ProductType, SourceTree, StepKind, Target,
};
use crate::error::{GraphError, GraphResult};

pub const BUNDLE_ID_KEY: &str = "PRODUCT_BUNDLE_IDENTIFIER";
pub const PRODUCT_NAME_KEY: &str = "PRODUCT_NAME";

/// Attributes carried by the join that embeds a framework.
pub const EMBED_ATTRIBUTES: [&str; 2] = ["CodeSignOnCopy", "RemoveHeadersOnCopy"];

/// Group that collects linked SDK frameworks.
const FRAMEWORKS_GROUP: &str = "Frameworks";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTarget {
    pub name: String,
    pub product_type: ProductType,
    pub bundle_id: String,
    pub platform: Platform,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedTarget {
    pub target: NodeId,
    /// Edges on other targets that pointed at the removed one.
    pub edges_removed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyOutcome {
    Added(NodeId),
    AlreadyPresent(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkOutcome {
    pub file: NodeId,
    pub link_join: NodeId,
    pub embed_join: Option<NodeId>,
}

fn check_target_name(name: &str) -> GraphResult<()> {
    if name.trim().is_empty() || name.contains('/') || name.chars().any(char::is_control) {
        return Err(GraphError::invalid(name, "not a valid target name"));
    }
    Ok(())
}

fn ensure_unique_name(graph: &Graph, name: &str) -> GraphResult<()> {
    if graph.find_target(name).is_some() {
        return Err(GraphError::AlreadyExists {
            what: "target",
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Create a target with Debug/Release configurations and empty sources,
/// resources and frameworks steps.
pub fn add_target(graph: &mut Graph, spec: &NewTarget) -> GraphResult<NodeId> {
    check_target_name(&spec.name)?;
    ensure_unique_name(graph, &spec.name)?;
    if spec.bundle_id.trim().is_empty() {
        return Err(GraphError::invalid(&spec.bundle_id, "bundle identifier is empty"));
    }

    let shared = [
        (PRODUCT_NAME_KEY, spec.name.as_str()),
        (BUNDLE_ID_KEY, spec.bundle_id.as_str()),
        ("SDKROOT", spec.platform.sdk_root()),
        ("GENERATE_INFOPLIST_FILE", "YES"),
        ("SWIFT_VERSION", "5.0"),
    ];
    let configuration_list = graph.add_configuration_list(&shared);
    for config_id in graph.configurations_of(configuration_list) {
        if let Some(config) = graph.configuration_mut(config_id) {
            let per_mode: &[(&str, &str)] = if config.name == "Debug" {
                &[
                    ("SWIFT_OPTIMIZATION_LEVEL", "-Onone"),
                    ("DEBUG_INFORMATION_FORMAT", "dwarf"),
                    ("ONLY_ACTIVE_ARCH", "YES"),
                ]
            } else {
                &[
                    ("SWIFT_OPTIMIZATION_LEVEL", "-O"),
                    ("DEBUG_INFORMATION_FORMAT", "dwarf-with-dsym"),
                ]
            };
            for (key, value) in per_mode {
                config.settings.insert(key.to_string(), value.to_string());
            }
        }
    }

    let steps = [StepKind::Sources, StepKind::Resources, StepKind::Frameworks]
        .into_iter()
        .map(|kind| graph.add(Node::BuildStep(BuildStep::new(kind))))
        .collect();

    let product = graph.products_group().map(|products| {
        let file = graph.add(Node::FileReference(FileReference {
            path: spec.product_type.product_file_name(&spec.name),
            name: None,
            source_tree: SourceTree::BuiltProductsDir,
            file_kind: spec.product_type.product_kind(),
        }));
        graph.attach_child(products, file);
        file
    });

    let target = graph.add(Node::Target(Target {
        name: spec.name.clone(),
        product_type: spec.product_type,
        steps,
        dependencies: Vec::new(),
        configuration_list,
        package_products: Vec::new(),
        product,
    }));
    graph.push_target(target);
    Ok(target)
}

/// Copy `source` into a new target called `new_name`.
///
/// Configurations and build steps are deep-copied into fresh nodes, including
/// fresh join entities, so editing the copy never reaches the source. The
/// joins still point at the same file references: the duplicate builds the
/// same files, it does not copy them.
pub fn duplicate_target(
    graph: &mut Graph,
    source: &str,
    new_name: &str,
    new_bundle_id: Option<&str>,
) -> GraphResult<NodeId> {
    let source_id = graph.require_target(source)?;
    check_target_name(new_name)?;
    ensure_unique_name(graph, new_name)?;
    let original = graph
        .target(source_id)
        .cloned()
        .ok_or_else(|| GraphError::TargetNotFound(source.to_string()))?;

    let configuration_list = copy_configuration_list(
        graph,
        original.configuration_list,
        new_name,
        new_bundle_id,
    );

    let mut steps = Vec::with_capacity(original.steps.len());
    for step_id in &original.steps {
        let Some(step) = graph.step(*step_id).cloned() else {
            continue;
        };
        let mut joins = Vec::with_capacity(step.joins.len());
        for join_id in &step.joins {
            if let Some(join) = graph.join(*join_id).cloned() {
                joins.push(graph.add(Node::Join(join)));
            }
        }
        steps.push(graph.add(Node::BuildStep(BuildStep { joins, ..step })));
    }

    let mut dependencies = Vec::with_capacity(original.dependencies.len());
    for edge_id in &original.dependencies {
        if let Some(edge) = graph.edge(*edge_id).cloned() {
            dependencies.push(graph.add(Node::DependencyEdge(edge)));
        }
    }

    let had_product = original.product.is_some_and(|id| graph.file(id).is_some());
    let product = match graph.products_group() {
        Some(products) if had_product => {
            let file = graph.add(Node::FileReference(FileReference {
                path: original.product_type.product_file_name(new_name),
                name: None,
                source_tree: SourceTree::BuiltProductsDir,
                file_kind: original.product_type.product_kind(),
            }));
            graph.attach_child(products, file);
            Some(file)
        }
        _ => None,
    };

    let target = graph.add(Node::Target(Target {
        name: new_name.to_string(),
        product_type: original.product_type,
        steps,
        dependencies,
        configuration_list,
        package_products: original.package_products.clone(),
        product,
    }));
    graph.push_target(target);
    Ok(target)
}

fn copy_configuration_list(
    graph: &mut Graph,
    list: NodeId,
    new_name: &str,
    new_bundle_id: Option<&str>,
) -> NodeId {
    let Some(original) = graph.configuration_list(list).cloned() else {
        return graph.add_configuration_list(&[(PRODUCT_NAME_KEY, new_name)]);
    };
    let mut configurations = Vec::with_capacity(original.configurations.len());
    for config_id in &original.configurations {
        let Some(config) = graph.configuration(*config_id).cloned() else {
            continue;
        };
        let mut settings = config.settings;
        if settings.contains_key(PRODUCT_NAME_KEY) {
            settings.insert(PRODUCT_NAME_KEY.to_string(), new_name.to_string());
        }
        if let Some(bundle_id) = new_bundle_id {
            settings.insert(BUNDLE_ID_KEY.to_string(), bundle_id.to_string());
        }
        configurations.push(graph.add(Node::Configuration(Configuration {
            name: config.name,
            settings,
        })));
    }
    graph.add(Node::ConfigurationList(ConfigurationList {
        configurations,
        default_configuration: original.default_configuration,
    }))
}

/// Remove a target, every dependency edge pointing at it, and the nodes it
/// owns exclusively (steps, joins, configurations, product reference).
pub fn remove_target(graph: &mut Graph, name: &str) -> GraphResult<RemovedTarget> {
    let target_id = graph.require_target(name)?;
    let Some(target) = graph.target(target_id).cloned() else {
        return Err(GraphError::TargetNotFound(name.to_string()));
    };

    // Collect.
    let remaining: Vec<NodeId> = graph
        .targets()
        .iter()
        .copied()
        .filter(|id| *id != target_id)
        .collect();
    let mut inbound: Vec<(NodeId, NodeId)> = Vec::new();
    let mut shared_steps = HashSet::new();
    let mut shared_lists = HashSet::new();
    for other_id in &remaining {
        let Some(other) = graph.target(*other_id) else {
            continue;
        };
        for edge_id in &other.dependencies {
            if graph.edge(*edge_id).is_some_and(|edge| edge.target == target_id) {
                inbound.push((*other_id, *edge_id));
            }
        }
        shared_steps.extend(other.steps.iter().copied());
        shared_lists.insert(other.configuration_list);
    }

    let owned_steps: Vec<NodeId> = target
        .steps
        .iter()
        .copied()
        .filter(|id| !shared_steps.contains(id))
        .collect();
    let kept_joins: HashSet<NodeId> = shared_steps
        .iter()
        .filter_map(|id| graph.step(*id))
        .flat_map(|step| step.joins.iter().copied())
        .collect();
    let owned_joins: BTreeSet<NodeId> = owned_steps
        .iter()
        .filter_map(|id| graph.step(*id))
        .flat_map(|step| step.joins.iter().copied())
        .filter(|id| !kept_joins.contains(id))
        .collect();
    let owned_configs = if shared_lists.contains(&target.configuration_list)
        || target.configuration_list == graph.project_configuration_list()
    {
        Vec::new()
    } else {
        let mut ids = graph.configurations_of(target.configuration_list);
        ids.push(target.configuration_list);
        ids
    };

    // Mutate.
    graph.unlist_target(target_id);
    for (other_id, edge_id) in &inbound {
        if let Some(other) = graph.target_mut(*other_id) {
            other.dependencies.retain(|id| id != edge_id);
        }
        graph.remove(*edge_id);
    }
    for edge_id in &target.dependencies {
        graph.remove(*edge_id);
    }
    for join in owned_joins {
        graph.remove(join);
    }
    for step in owned_steps {
        graph.remove(step);
    }
    for config in owned_configs {
        graph.remove(config);
    }
    if let Some(product) = target.product {
        for group in graph.groups_containing(product) {
            graph.detach_child(group, product);
        }
        graph.remove(product);
    }
    graph.remove(target_id);

    Ok(RemovedTarget {
        target: target_id,
        edges_removed: inbound.len(),
    })
}

/// True when `from` reaches `to` by following dependency edges.
pub fn depends_on(graph: &Graph, from: NodeId, to: NodeId) -> bool {
    let mut stack = vec![from];
    let mut seen = HashSet::new();
    while let Some(current) = stack.pop() {
        if current == to {
            return true;
        }
        if !seen.insert(current) {
            continue;
        }
        if let Some(target) = graph.target(current) {
            stack.extend(
                target
                    .dependencies
                    .iter()
                    .filter_map(|edge| graph.edge(*edge))
                    .map(|edge| edge.target),
            );
        }
    }
    false
}

/// Make `target` depend on `dependency`.
///
/// An existing edge is a no-op. Self-dependencies and edges that would close
/// a cycle are rejected.
pub fn add_dependency(
    graph: &mut Graph,
    target: &str,
    dependency: &str,
) -> GraphResult<DependencyOutcome> {
    let target_id = graph.require_target(target)?;
    let dependency_id = graph.require_target(dependency)?;

    if let Some(existing) = find_edge(graph, target_id, dependency_id) {
        return Ok(DependencyOutcome::AlreadyPresent(existing));
    }
    if target_id == dependency_id || depends_on(graph, dependency_id, target_id) {
        return Err(GraphError::DependencyCycle {
            from: target.to_string(),
            to: dependency.to_string(),
        });
    }

    let edge = graph.add(Node::DependencyEdge(DependencyEdge {
        target: dependency_id,
    }));
    if let Some(owner) = graph.target_mut(target_id) {
        owner.dependencies.push(edge);
    }
    Ok(DependencyOutcome::Added(edge))
}

/// Drop the edge `target` → `dependency`. Missing edges are a no-op.
pub fn remove_dependency(graph: &mut Graph, target: &str, dependency: &str) -> GraphResult<bool> {
    let target_id = graph.require_target(target)?;
    let dependency_id = graph.require_target(dependency)?;
    let Some(edge) = find_edge(graph, target_id, dependency_id) else {
        return Ok(false);
    };
    if let Some(owner) = graph.target_mut(target_id) {
        owner.dependencies.retain(|id| *id != edge);
    }
    graph.remove(edge);
    Ok(true)
}

fn find_edge(graph: &Graph, from: NodeId, to: NodeId) -> Option<NodeId> {
    graph.target(from)?.dependencies.iter().copied().find(|id| {
        graph.edge(*id).is_some_and(|edge| edge.target == to)
    })
}

/// SDK-relative path for a framework or library name.
fn framework_path(name: &str) -> (String, String) {
    let has_suffix = [".framework", ".xcframework", ".tbd", ".dylib"]
        .iter()
        .any(|suffix| name.ends_with(suffix));
    let file_name = if has_suffix {
        name.to_string()
    } else {
        format!("{name}.framework")
    };
    let path = if file_name.ends_with(".tbd") || file_name.ends_with(".dylib") {
        format!("usr/lib/{file_name}")
    } else {
        format!("System/Library/Frameworks/{file_name}")
    };
    (file_name, path)
}

/// Link a system framework into `target`, optionally embedding it.
///
/// The SDK reference lives in the `Frameworks` group and is reused across
/// targets. Repeated calls do not add a second join to the same step.
pub fn add_framework(
    graph: &mut Graph,
    name: &str,
    target: &str,
    embed: bool,
) -> GraphResult<FrameworkOutcome> {
    let name = name.trim();
    if name.is_empty() || name.contains('/') || !crate::core::sanitize::is_path_safe(name) {
        return Err(GraphError::invalid(name, "not a framework name"));
    }
    let target_id = graph.require_target(target)?;
    let (file_name, path) = framework_path(name);

    let existing = graph.iter().find_map(|(id, node)| match node {
        Node::FileReference(file) if file.source_tree == SourceTree::Sdk && file.path == path => {
            Some(id)
        }
        _ => None,
    });
    let file = match existing {
        Some(id) => id,
        None => {
            let group = ensure_group_path(graph, FRAMEWORKS_GROUP)?;
            let kind = if file_name.ends_with(".tbd") || file_name.ends_with(".dylib") {
                FileKind::Archive
            } else {
                FileKind::Framework
            };
            let id = graph.add(Node::FileReference(FileReference {
                path,
                name: Some(file_name),
                source_tree: SourceTree::Sdk,
                file_kind: kind,
            }));
            graph.attach_child(group, id);
            id
        }
    };

    let link_step = graph.ensure_step(target_id, StepKind::Frameworks);
    let link_join = existing_join(graph, link_step, file)
        .unwrap_or_else(|| graph.add_join(link_step, file, Vec::new()));

    let embed_join = if embed {
        let copy_step = ensure_copy_step(graph, target_id, CopyDestination::Frameworks);
        let join = existing_join(graph, copy_step, file).unwrap_or_else(|| {
            let attributes = EMBED_ATTRIBUTES.iter().map(|a| a.to_string()).collect();
            graph.add_join(copy_step, file, attributes)
        });
        Some(join)
    } else {
        None
    };

    Ok(FrameworkOutcome {
        file,
        link_join,
        embed_join,
    })
}

fn existing_join(graph: &Graph, step: NodeId, file: NodeId) -> Option<NodeId> {
    graph.step(step)?.joins.iter().copied().find(|id| {
        graph.join(*id).is_some_and(|join| join.file == file)
    })
}

fn ensure_copy_step(graph: &mut Graph, target: NodeId, destination: CopyDestination) -> NodeId {
    let existing = graph.target(target).and_then(|t| {
        t.steps.iter().copied().find(|id| {
            graph.step(*id).is_some_and(|step| {
                step.kind == StepKind::CopyFiles && step.destination == Some(destination)
            })
        })
    });
    if let Some(step) = existing {
        return step;
    }
    let step = graph.add(Node::BuildStep(BuildStep {
        name: Some("Embed Frameworks".to_string()),
        destination: Some(destination),
        ..BuildStep::new(StepKind::CopyFiles)
    }));
    if let Some(target) = graph.target_mut(target) {
        target.steps.push(step);
    }
    step
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::files::{AddFileOutcome, add_file};
    use crate::core::types::NodeKind;
    use crate::test_support::{graph_with_app_target, new_target};

    fn target_names(graph: &Graph) -> Vec<String> {
        graph
            .targets()
            .iter()
            .filter_map(|id| graph.target(*id))
            .map(|target| target.name.clone())
            .collect()
    }

    fn count_kind(graph: &Graph, kind: NodeKind) -> usize {
        graph.nodes_of_kind(kind).len()
    }

    fn settings_of(graph: &Graph, target: NodeId, config: &str) -> Vec<(String, String)> {
        let list = graph.target(target).expect("target").configuration_list;
        graph
            .configurations_of(list)
            .into_iter()
            .filter_map(|id| graph.configuration(id))
            .find(|c| c.name == config)
            .map(|c| c.settings.clone().into_iter().collect())
            .unwrap_or_default()
    }

    #[test]
    fn add_target_builds_configurations_and_steps() {
        let mut graph = Graph::new();
        let id = add_target(&mut graph, &new_target("App")).expect("add");
        let target = graph.target(id).expect("target");

        let kinds: Vec<StepKind> = target
            .steps
            .iter()
            .filter_map(|s| graph.step(*s))
            .map(|s| s.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![StepKind::Sources, StepKind::Resources, StepKind::Frameworks]
        );
        for config in ["Debug", "Release"] {
            let settings = settings_of(&graph, id, config);
            assert!(settings.contains(&(
                BUNDLE_ID_KEY.to_string(),
                "com.example.App".to_string()
            )));
        }
        let product = target.product.expect("product");
        assert_eq!(graph.parent_of(product), graph.products_group());
    }

    #[test]
    fn add_target_rejects_duplicate_name() {
        let mut graph = graph_with_app_target();
        let err = add_target(&mut graph, &new_target("App")).expect_err("duplicate");
        assert_eq!(
            err,
            GraphError::AlreadyExists {
                what: "target",
                name: "App".to_string()
            }
        );
    }

    #[test]
    fn duplicate_target_copies_steps_but_shares_files() {
        let mut graph = graph_with_app_target();
        let file = match add_file(&mut graph, "Main.swift", "", &["App".to_string()]).expect("add")
        {
            AddFileOutcome::Added { file, .. } => file,
            other => panic!("unexpected {other:?}"),
        };

        let copy = duplicate_target(&mut graph, "App", "AppCopy", Some("com.example.copy"))
            .expect("duplicate");
        let source = graph.require_target("App").expect("app");
        let source_sources = graph.find_step(source, StepKind::Sources).expect("src");
        let copy_sources = graph.find_step(copy, StepKind::Sources).expect("copy src");
        assert_ne!(source_sources, copy_sources);
        assert!(graph.step_references(copy_sources, file));

        // Mutating the copy's join must not reach the source's join.
        let copy_join = graph.step(copy_sources).expect("step").joins[0];
        let source_join = graph.step(source_sources).expect("step").joins[0];
        assert_ne!(copy_join, source_join);
        if let Some(join) = graph.join_mut(copy_join) {
            join.attributes.push("Weak".to_string());
        }
        assert!(graph.join(source_join).expect("join").attributes.is_empty());

        let copy_settings = settings_of(&graph, copy, "Debug");
        assert!(copy_settings.contains(&(
            BUNDLE_ID_KEY.to_string(),
            "com.example.copy".to_string()
        )));
        assert!(copy_settings.contains(&(PRODUCT_NAME_KEY.to_string(), "AppCopy".to_string())));
        let source_settings = settings_of(&graph, source, "Debug");
        assert!(source_settings.contains(&(
            BUNDLE_ID_KEY.to_string(),
            "com.example.App".to_string()
        )));
    }

    #[test]
    fn duplicate_target_errors() {
        let mut graph = graph_with_app_target();
        assert_eq!(
            duplicate_target(&mut graph, "Nope", "X", None),
            Err(GraphError::TargetNotFound("Nope".to_string()))
        );
        assert!(matches!(
            duplicate_target(&mut graph, "App", "App", None),
            Err(GraphError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn remove_target_drops_inbound_edges() {
        let mut graph = graph_with_app_target();
        add_target(&mut graph, &new_target("Core")).expect("core");
        add_target(&mut graph, &new_target("Tests")).expect("tests");
        add_dependency(&mut graph, "App", "Core").expect("dep");
        add_dependency(&mut graph, "Tests", "Core").expect("dep");
        let core = graph.require_target("Core").expect("core");

        let removed = remove_target(&mut graph, "Core").expect("remove");
        assert_eq!(removed.edges_removed, 2);
        assert!(!graph.contains(core));
        for id in graph.nodes_of_kind(NodeKind::DependencyEdge) {
            assert_ne!(graph.edge(id).map(|e| e.target), Some(core));
        }
        for target in graph.targets() {
            assert!(graph.target(*target).expect("t").dependencies.is_empty());
        }
        assert_eq!(
            remove_target(&mut graph, "Core"),
            Err(GraphError::TargetNotFound("Core".to_string()))
        );
    }

    #[test]
    fn remove_target_keeps_files_and_shared_joins() {
        let mut graph = graph_with_app_target();
        add_file(&mut graph, "Main.swift", "", &["App".to_string()]).expect("add");
        duplicate_target(&mut graph, "App", "Copy", None).expect("dup");

        remove_target(&mut graph, "Copy").expect("remove");
        let app = graph.require_target("App").expect("app");
        let sources = graph.find_step(app, StepKind::Sources).expect("src");
        assert_eq!(graph.step(sources).expect("step").joins.len(), 1);
        assert_eq!(count_kind(&graph, NodeKind::Join), 1);
        assert_eq!(target_names(&graph), vec!["App".to_string()]);
    }

    #[test]
    fn add_dependency_is_idempotent_and_rejects_cycles() {
        let mut graph = graph_with_app_target();
        add_target(&mut graph, &new_target("Core")).expect("core");
        add_target(&mut graph, &new_target("Util")).expect("util");

        let first = add_dependency(&mut graph, "App", "Core").expect("first");
        let second = add_dependency(&mut graph, "App", "Core").expect("second");
        let DependencyOutcome::Added(edge) = first else {
            panic!("expected new edge");
        };
        assert_eq!(second, DependencyOutcome::AlreadyPresent(edge));

        add_dependency(&mut graph, "Core", "Util").expect("chain");
        assert!(matches!(
            add_dependency(&mut graph, "Util", "App"),
            Err(GraphError::DependencyCycle { .. })
        ));
        assert!(matches!(
            add_dependency(&mut graph, "App", "App"),
            Err(GraphError::DependencyCycle { .. })
        ));
        assert_eq!(
            add_dependency(&mut graph, "App", "Ghost"),
            Err(GraphError::TargetNotFound("Ghost".to_string()))
        );

        assert_eq!(remove_dependency(&mut graph, "App", "Core"), Ok(true));
        assert_eq!(remove_dependency(&mut graph, "App", "Core"), Ok(false));
    }

    #[test]
    fn add_framework_links_and_embeds() {
        let mut graph = graph_with_app_target();
        let outcome = add_framework(&mut graph, "UIKit", "App", true).expect("framework");

        let file = graph.file(outcome.file).expect("file");
        assert_eq!(file.path, "System/Library/Frameworks/UIKit.framework");
        assert_eq!(file.source_tree, SourceTree::Sdk);

        let embed = outcome.embed_join.expect("embed join");
        let attributes = &graph.join(embed).expect("join").attributes;
        assert!(attributes.contains(&"CodeSignOnCopy".to_string()));

        let again = add_framework(&mut graph, "UIKit.framework", "App", false).expect("again");
        assert_eq!(again.file, outcome.file);
        assert_eq!(again.link_join, outcome.link_join);
        // The App product plus one shared framework reference.
        assert_eq!(count_kind(&graph, NodeKind::FileReference), 2);
    }

    #[test]
    fn add_framework_rejects_bad_names() {
        let mut graph = graph_with_app_target();
        assert!(matches!(
            add_framework(&mut graph, "../Evil", "App", false),
            Err(GraphError::InvalidArgument { .. })
        ));
        assert_eq!(
            add_framework(&mut graph, "UIKit", "Nope", false),
            Err(GraphError::TargetNotFound("Nope".to_string()))
        );
    }
}
