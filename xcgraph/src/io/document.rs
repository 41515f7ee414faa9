//! Project document load/save with schema + invariant validation.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::validator_for;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::core::graph::{Graph, GraphRoots};
use crate::core::invariants::validate_invariants;
use crate::core::types::{Node, NodeId};
use crate::error::GraphError;

pub const DOCUMENT_VERSION: u32 = 1;

const V1_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/project_graph/v1.schema.json"
));

/// On-disk shape of a project document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFile {
    pub version: u32,
    pub root_group: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products_group: Option<NodeId>,
    #[serde(default)]
    pub targets: Vec<NodeId>,
    #[serde(default)]
    pub packages: Vec<NodeId>,
    pub configuration_list: NodeId,
    pub next_id: u64,
    pub objects: Vec<ObjectEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub id: NodeId,
    pub object: Node,
}

impl DocumentFile {
    pub fn from_graph(graph: &Graph) -> Self {
        let roots = graph.roots();
        Self {
            version: DOCUMENT_VERSION,
            root_group: roots.root_group,
            products_group: roots.products_group,
            targets: roots.targets.clone(),
            packages: roots.packages.clone(),
            configuration_list: roots.configuration_list,
            next_id: graph.next_id(),
            objects: graph
                .iter()
                .map(|(id, node)| ObjectEntry {
                    id,
                    object: node.clone(),
                })
                .collect(),
        }
    }

    /// Rebuild the graph. Duplicate object ids are rejected here; structural
    /// checks run in [`load_document`].
    pub fn into_graph(self) -> Result<Graph> {
        if self.version != DOCUMENT_VERSION {
            bail!("unsupported document version {}", self.version);
        }
        let mut nodes = BTreeMap::new();
        for entry in self.objects {
            if nodes.insert(entry.id, entry.object).is_some() {
                bail!("duplicate object id {}", entry.id);
            }
        }
        let roots = GraphRoots {
            root_group: self.root_group,
            products_group: self.products_group,
            targets: self.targets,
            packages: self.packages,
            configuration_list: self.configuration_list,
        };
        Ok(Graph::from_parts(roots, nodes, self.next_id))
    }
}

/// Load and validate a document from disk (schema + invariants).
pub fn load_document(path: &Path) -> Result<Graph> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read document {}", path.display()))?;
    let graph = parse_document(&contents).with_context(|| format!("load {}", path.display()))?;
    debug!(path = %path.display(), nodes = graph.len(), "loaded document");
    Ok(graph)
}

/// Parse document text: JSON, then schema, then invariants.
pub fn parse_document(contents: &str) -> Result<Graph> {
    let value: Value = serde_json::from_str(contents).context("parse document json")?;
    validate_schema(&value)?;
    let document: DocumentFile =
        serde_json::from_value(value).context("deserialize document")?;
    let graph = document.into_graph()?;
    let errors = validate_invariants(&graph);
    if !errors.is_empty() {
        return Err(anyhow!("document invariants failed: {}", errors.join("; ")));
    }
    Ok(graph)
}

/// Pretty JSON with a trailing newline.
pub fn serialize_document(graph: &Graph) -> Result<String> {
    let mut buf = serde_json::to_string_pretty(&DocumentFile::from_graph(graph))
        .context("serialize document")?;
    buf.push('\n');
    Ok(buf)
}

pub fn write_document(path: &Path, graph: &Graph) -> Result<()> {
    let buf = serialize_document(graph)?;
    fs::write(path, buf).with_context(|| format!("write document {}", path.display()))
}

/// Write a new empty project to `path`. Refuses to overwrite unless `force`.
pub fn init_document(path: &Path, force: bool) -> Result<Graph> {
    if path.exists() && !force {
        return Err(GraphError::AlreadyExists {
            what: "document",
            name: path.display().to_string(),
        }
        .into());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let graph = Graph::new();
    write_document(path, &graph)?;
    Ok(graph)
}

fn validate_schema(document: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(V1_SCHEMA).context("parse bundled schema")?;
    let compiled = validator_for(&schema).map_err(|err| anyhow!("invalid schema: {}", err))?;
    if !compiled.is_valid(document) {
        let messages = compiled
            .iter_errors(document)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "document schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}
