//! Swift package references keyed by URL.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::core::graph::Graph;
use crate::core::types::{Node, NodeId, PackageReference, VersionRequirement};
use crate::error::{GraphError, GraphResult};

const ACCEPTED_SCHEMES: [&str; 4] = ["https", "http", "ssh", "git"];

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?$").unwrap()
});

static BRANCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9._/-]*$").unwrap());

/// `git@host:owner/repo.git`
static SCP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z0-9.-]+:[^\s:][^\s]*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedPackage {
    pub package: NodeId,
    pub targets_unlinked: usize,
}

fn parse_version(raw: &str, original: &str) -> GraphResult<String> {
    let version = raw.trim();
    if VERSION_RE.is_match(version) {
        Ok(version.to_string())
    } else {
        Err(GraphError::invalid(original, "expected a version like 1.2.3"))
    }
}

fn parse_branch(raw: &str, original: &str) -> GraphResult<String> {
    let name = raw.trim();
    let malformed = !BRANCH_RE.is_match(name)
        || name.contains("..")
        || name.contains("//")
        || name.ends_with('/')
        || name.ends_with(".lock");
    if malformed {
        return Err(GraphError::invalid(original, "not a valid branch name"));
    }
    Ok(name.to_string())
}

/// Parse `exact:X.Y.Z`, `from:X.Y.Z`, `upToNextMajor:X.Y.Z`, `branch:NAME` or
/// a bare `X.Y.Z` (up to next major).
pub fn parse_requirement(raw: &str) -> GraphResult<VersionRequirement> {
    let trimmed = raw.trim();
    let Some((prefix, rest)) = trimmed.split_once(':') else {
        let version = parse_version(trimmed, raw)?;
        return Ok(VersionRequirement::UpToNextMajor { version });
    };
    match prefix {
        "exact" => Ok(VersionRequirement::Exact {
            version: parse_version(rest, raw)?,
        }),
        "from" | "upToNextMajor" => Ok(VersionRequirement::UpToNextMajor {
            version: parse_version(rest, raw)?,
        }),
        "branch" => Ok(VersionRequirement::Branch {
            name: parse_branch(rest, raw)?,
        }),
        _ => Err(GraphError::invalid(
            raw,
            format!("unknown requirement kind '{prefix}'"),
        )),
    }
}

/// Accept URLs with a recognized transport, or the scp-like `user@host:path`.
pub fn validate_package_url(raw: &str) -> GraphResult<()> {
    let trimmed = raw.trim();
    if SCP_RE.is_match(trimmed) && !trimmed.contains("://") {
        return Ok(());
    }
    let parsed = Url::parse(trimmed)
        .map_err(|err| GraphError::invalid(raw, format!("not a package URL: {err}")))?;
    if !ACCEPTED_SCHEMES.contains(&parsed.scheme()) {
        return Err(GraphError::invalid(
            raw,
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(GraphError::invalid(raw, "package URL has no host"));
    }
    Ok(())
}

pub fn find_package(graph: &Graph, url: &str) -> Option<NodeId> {
    let url = url.trim();
    graph
        .packages()
        .iter()
        .copied()
        .find(|id| graph.package(*id).is_some_and(|package| package.url == url))
}

/// Register a package and optionally link it to `target`.
pub fn add_swift_package(
    graph: &mut Graph,
    url: &str,
    requirement: &str,
    target: Option<&str>,
) -> GraphResult<NodeId> {
    validate_package_url(url)?;
    let requirement = parse_requirement(requirement)?;
    let target_id = target.map(|name| graph.require_target(name)).transpose()?;
    if find_package(graph, url).is_some() {
        return Err(GraphError::AlreadyExists {
            what: "package",
            name: url.trim().to_string(),
        });
    }

    let package = graph.add(Node::PackageReference(PackageReference {
        url: url.trim().to_string(),
        requirement,
    }));
    graph.push_package(package);
    if let Some(target) = target_id.and_then(|id| graph.target_mut(id)) {
        target.package_products.push(package);
    }
    Ok(package)
}

/// Remove the package with `url` and unlink it from every target.
pub fn remove_swift_package(graph: &mut Graph, url: &str) -> GraphResult<RemovedPackage> {
    let package =
        find_package(graph, url).ok_or_else(|| GraphError::PackageNotFound(url.to_string()))?;

    let linked: Vec<NodeId> = graph
        .targets()
        .iter()
        .copied()
        .filter(|id| {
            graph
                .target(*id)
                .is_some_and(|target| target.package_products.contains(&package))
        })
        .collect();
    for id in &linked {
        if let Some(target) = graph.target_mut(*id) {
            target.package_products.retain(|existing| *existing != package);
        }
    }
    graph.unlist_package(package);
    graph.remove(package);

    Ok(RemovedPackage {
        package,
        targets_unlinked: linked.len(),
    })
}
