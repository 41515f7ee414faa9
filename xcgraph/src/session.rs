//! Orchestration for one open project document.
//!
//! A session owns the in-memory graph exclusively. Each operation calls one
//! engine from [`crate::core`]; nothing reaches disk until [`ProjectSession::save`]
//! (or a transaction commit), so a failed operation never touches the
//! document.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::core::files::{self, AddFileOutcome, FolderOutcome, RemovedFile};
use crate::core::graph::Graph;
use crate::core::groups::{self, RemovedSubtree};
use crate::core::outline::render_outline;
use crate::core::packages::{self, RemovedPackage};
use crate::core::sanitize::is_path_safe;
use crate::core::settings;
use crate::core::targets::{self, DependencyOutcome, FrameworkOutcome, NewTarget, RemovedTarget};
use crate::core::types::NodeId;
use crate::core::validation::{self, FsProbe, ValidationReport};
use crate::error::GraphError;
use crate::io::config::ToolConfig;
use crate::io::folder::scan_folder;
use crate::io::persistence::{DocumentWriter, JsonDocumentWriter, Persistence, SaveReport};
use crate::io::fs_probe::DiskProbe;

/// Counts from [`ProjectSession::repair`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairSummary {
    pub dangling_removed: usize,
    pub duplicates_removed: usize,
    pub invalid_paths_removed: usize,
}

impl RepairSummary {
    pub fn total(&self) -> usize {
        self.dangling_removed + self.duplicates_removed + self.invalid_paths_removed
    }
}

pub struct ProjectSession<W = JsonDocumentWriter, P = DiskProbe> {
    graph: Graph,
    persistence: Persistence<W, P>,
}

impl ProjectSession {
    /// Load the document at `document`.
    pub fn open(document: &Path, config: ToolConfig) -> Result<Self> {
        let persistence = Persistence::new(document, config);
        let graph = persistence.load()?;
        Ok(Self { graph, persistence })
    }
}

impl<W: DocumentWriter, P: FsProbe> ProjectSession<W, P> {
    pub fn from_parts(graph: Graph, persistence: Persistence<W, P>) -> Self {
        Self { graph, persistence }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn persistence(&self) -> &Persistence<W, P> {
        &self.persistence
    }

    pub fn config(&self) -> &ToolConfig {
        self.persistence.config()
    }

    pub fn add_group(&mut self, path: &str) -> Result<NodeId> {
        let group = groups::ensure_group_path(&mut self.graph, path)?;
        debug!(path, group = %group, "group ensured");
        Ok(group)
    }

    pub fn remove_group(&mut self, path: &str) -> Result<RemovedSubtree> {
        let removed = groups::remove_group(&mut self.graph, path)?;
        info!(
            path,
            files = removed.files_removed,
            groups = removed.groups_removed,
            "group removed"
        );
        Ok(removed)
    }

    pub fn add_file(
        &mut self,
        path: &str,
        group_path: &str,
        targets: &[String],
    ) -> Result<AddFileOutcome> {
        let outcome = files::add_file(&mut self.graph, path, group_path, targets)?;
        if let AddFileOutcome::Added { file, joins } = &outcome {
            info!(path, file = %file, joins = joins.len(), "file added");
        }
        Ok(outcome)
    }

    /// Scan `folder` on disk and mirror it under `group_path`.
    pub fn add_folder(
        &mut self,
        folder: &Path,
        group_path: &str,
        targets: &[String],
        recursive: bool,
    ) -> Result<FolderOutcome> {
        let display = folder.to_string_lossy();
        if !is_path_safe(&display) {
            return Err(GraphError::invalid(display, "path failed sanitization").into());
        }
        self.graph.require_targets(targets)?;
        let listing = scan_folder(
            folder,
            &self.persistence.project_dir(),
            &self.config().folder_ignore,
            recursive,
        )?;
        let outcome = files::add_folder(&mut self.graph, &listing, group_path, targets, recursive)?;
        info!(
            folder = %folder.display(),
            added = outcome.added.len(),
            skipped = outcome.skipped.len(),
            "folder added"
        );
        Ok(outcome)
    }

    pub fn add_synchronized_folder(
        &mut self,
        path: &str,
        group_path: &str,
        targets: &[String],
    ) -> Result<NodeId> {
        let id = files::add_synchronized_folder(&mut self.graph, path, group_path, targets)?;
        info!(path, group = %id, "synchronized folder added");
        Ok(id)
    }

    pub fn move_file(&mut self, old: &str, new: &str) -> Result<NodeId> {
        let id = files::move_file(&mut self.graph, old, new)?;
        info!(old, new, file = %id, "file moved");
        Ok(id)
    }

    pub fn remove_file(&mut self, query: &str) -> Result<RemovedFile> {
        let removed = files::remove_file(&mut self.graph, query)?;
        info!(
            query,
            file = %removed.file,
            joins = removed.joins_removed,
            "file removed"
        );
        Ok(removed)
    }

    pub fn add_target(&mut self, spec: &NewTarget) -> Result<NodeId> {
        let id = targets::add_target(&mut self.graph, spec)?;
        info!(name = %spec.name, target = %id, "target added");
        Ok(id)
    }

    pub fn duplicate_target(
        &mut self,
        source: &str,
        new_name: &str,
        new_bundle_id: Option<&str>,
    ) -> Result<NodeId> {
        let id = targets::duplicate_target(&mut self.graph, source, new_name, new_bundle_id)?;
        info!(source, new_name, target = %id, "target duplicated");
        Ok(id)
    }

    pub fn remove_target(&mut self, name: &str) -> Result<RemovedTarget> {
        let removed = targets::remove_target(&mut self.graph, name)?;
        info!(name, edges = removed.edges_removed, "target removed");
        Ok(removed)
    }

    pub fn add_dependency(&mut self, target: &str, dependency: &str) -> Result<DependencyOutcome> {
        let outcome = targets::add_dependency(&mut self.graph, target, dependency)?;
        if let DependencyOutcome::AlreadyPresent(_) = outcome {
            warn!(target, dependency, "dependency already present, skipping");
        }
        Ok(outcome)
    }

    pub fn remove_dependency(&mut self, target: &str, dependency: &str) -> Result<bool> {
        Ok(targets::remove_dependency(&mut self.graph, target, dependency)?)
    }

    pub fn add_framework(
        &mut self,
        name: &str,
        target: &str,
        embed: bool,
    ) -> Result<FrameworkOutcome> {
        let outcome = targets::add_framework(&mut self.graph, name, target, embed)?;
        info!(name, target, embed, "framework linked");
        Ok(outcome)
    }

    pub fn add_swift_package(
        &mut self,
        url: &str,
        requirement: &str,
        target: Option<&str>,
    ) -> Result<NodeId> {
        let id = packages::add_swift_package(&mut self.graph, url, requirement, target)?;
        info!(url, requirement, package = %id, "package added");
        Ok(id)
    }

    pub fn remove_swift_package(&mut self, url: &str) -> Result<RemovedPackage> {
        let removed = packages::remove_swift_package(&mut self.graph, url)?;
        info!(url, targets = removed.targets_unlinked, "package removed");
        Ok(removed)
    }

    /// Set a build setting, gated by the configured value policy.
    pub fn set_build_setting(
        &mut self,
        key: &str,
        value: &str,
        targets: &[String],
        configuration: Option<&str>,
    ) -> Result<usize> {
        let policy = self.config().value_policy();
        let changed = settings::set_build_setting(
            &mut self.graph,
            key,
            value,
            targets,
            configuration,
            policy,
        )?;
        info!(key, changed, "build setting updated");
        Ok(changed)
    }

    pub fn get_build_settings(
        &self,
        target: Option<&str>,
        configuration: Option<&str>,
    ) -> Result<BTreeMap<String, BTreeMap<String, String>>> {
        Ok(settings::get_build_settings(&self.graph, target, configuration)?)
    }

    pub fn validate(&self) -> ValidationReport {
        validation::validate_document(
            &self.graph,
            self.persistence.probe(),
            &self.persistence.project_dir(),
        )
    }

    /// Drop dangling references, duplicate joins and nodes whose paths are
    /// missing on disk.
    pub fn repair(&mut self) -> RepairSummary {
        let dangling_removed = validation::repair_dangling_joins(&mut self.graph);
        let duplicates_removed = validation::dedupe_joins(&mut self.graph);
        let invalid_paths_removed = validation::repair_invalid_paths(
            &mut self.graph,
            self.persistence.probe(),
            &self.persistence.project_dir(),
        );
        let summary = RepairSummary {
            dangling_removed,
            duplicates_removed,
            invalid_paths_removed,
        };
        info!(?summary, "document repaired");
        summary
    }

    pub fn dedupe_joins(&mut self) -> usize {
        let removed = validation::dedupe_joins(&mut self.graph);
        info!(removed, "duplicate joins removed");
        removed
    }

    pub fn outline(&self) -> String {
        render_outline(&self.graph)
    }

    pub fn save(&self) -> Result<SaveReport> {
        self.persistence.save(&self.graph)
    }

    pub fn begin_transaction(&self) -> Result<()> {
        self.persistence.begin_transaction()
    }

    pub fn commit_transaction(&self) -> Result<SaveReport> {
        self.persistence.commit_transaction(&self.graph)
    }

    /// Restore the snapshot and discard in-memory changes.
    pub fn rollback_transaction(&mut self) -> Result<()> {
        self.graph = self
            .persistence
            .rollback_transaction()
            .context("roll back transaction")?;
        Ok(())
    }
}
