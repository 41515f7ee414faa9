//! Test-only fixtures: graphs, an in-memory filesystem probe, and temp
//! projects on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tempfile::TempDir;

use crate::core::graph::Graph;
use crate::core::targets::{NewTarget, add_target};
use crate::core::types::{Platform, ProductType};
use crate::core::validation::{EntryKind, FsProbe};
use crate::io::document::write_document;
use crate::io::persistence::DocumentWriter;

/// iOS application target spec with bundle id `com.example.<name>`.
pub fn new_target(name: &str) -> NewTarget {
    NewTarget {
        name: name.to_string(),
        product_type: ProductType::Application,
        bundle_id: format!("com.example.{name}"),
        platform: Platform::Ios,
    }
}

/// Fresh graph with one application target named `App`.
pub fn graph_with_app_target() -> Graph {
    let mut graph = Graph::new();
    if let Err(err) = add_target(&mut graph, &new_target("App")) {
        panic!("fixture target: {err}");
    }
    graph
}

/// [`FsProbe`] answering from a fixed set of paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryProbe {
    entries: BTreeMap<PathBuf, EntryKind>,
}

impl MemoryProbe {
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.entries.insert(path.into(), EntryKind::File);
        self
    }

    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.entries.insert(path.into(), EntryKind::Directory);
        self
    }
}

impl FsProbe for MemoryProbe {
    fn entry_kind(&self, path: &Path) -> Option<EntryKind> {
        self.entries.get(path).copied()
    }
}

/// Writer that leaves a truncated document behind and then fails, like a
/// write interrupted halfway.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingWriter;

impl DocumentWriter for FailingWriter {
    fn write(&self, path: &Path, _graph: &Graph) -> Result<()> {
        fs::write(path, "{\"version\": 1, \"objec")?;
        bail!("simulated write failure for {}", path.display())
    }
}

/// Temp directory holding `App.xcgraph.json` with an `App` target.
pub struct TestProject {
    temp: TempDir,
    document: PathBuf,
}

impl TestProject {
    pub fn new() -> Self {
        let temp = match tempfile::tempdir() {
            Ok(temp) => temp,
            Err(err) => panic!("tempdir: {err}"),
        };
        let document = temp.path().join("App.xcgraph.json");
        if let Err(err) = write_document(&document, &graph_with_app_target()) {
            panic!("write fixture document: {err:#}");
        }
        Self { temp, document }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn document(&self) -> &Path {
        &self.document
    }

    /// Create an empty file (and its parents) under the project root.
    pub fn touch(&self, relative: &str) -> PathBuf {
        let path = self.temp.path().join(relative);
        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                panic!("create {}: {err}", parent.display());
            }
        }
        if let Err(err) = fs::write(&path, "") {
            panic!("write {}: {err}", path.display());
        }
        path
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}
