//! Save with backup/restore, and snapshot transactions.
//!
//! The live document is only touched here. A save copies the current file to
//! `<doc>.<backup_suffix>`, writes, and drops the backup; if the write fails
//! the backup is copied back so the previous bytes survive. A transaction is
//! a whole-file snapshot at `<doc>.<transaction_suffix>`: its existence is
//! the "transaction open" state, so it spans process invocations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::core::graph::Graph;
use crate::core::validation::{Finding, FsProbe, validate_document};
use crate::error::GraphError;
use crate::io::config::ToolConfig;
use crate::io::document::{load_document, write_document};
use crate::io::fs_probe::DiskProbe;

/// Writes a graph to a document path.
pub trait DocumentWriter {
    fn write(&self, path: &Path, graph: &Graph) -> Result<()>;
}

/// Pretty-JSON writer used outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentWriter;

impl DocumentWriter for JsonDocumentWriter {
    fn write(&self, path: &Path, graph: &Graph) -> Result<()> {
        write_document(path, graph)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Validation findings logged before the write. Empty when validation is
    /// disabled.
    pub findings: Vec<Finding>,
    /// Whether a previous document was backed up before writing.
    pub backed_up: bool,
}

#[derive(Debug)]
pub struct Persistence<W = JsonDocumentWriter, P = DiskProbe> {
    document: PathBuf,
    config: ToolConfig,
    writer: W,
    probe: P,
}

impl Persistence {
    pub fn new(document: impl Into<PathBuf>, config: ToolConfig) -> Self {
        Self::with_parts(document, config, JsonDocumentWriter, DiskProbe)
    }
}

impl<W: DocumentWriter, P: FsProbe> Persistence<W, P> {
    pub fn with_parts(document: impl Into<PathBuf>, config: ToolConfig, writer: W, probe: P) -> Self {
        Self {
            document: document.into(),
            config,
            writer,
            probe,
        }
    }

    pub fn document_path(&self) -> &Path {
        &self.document
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Directory that source-root paths resolve against.
    pub fn project_dir(&self) -> PathBuf {
        match self.document.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    pub fn backup_path(&self) -> PathBuf {
        self.config.backup_path(&self.document)
    }

    pub fn transaction_path(&self) -> PathBuf {
        self.config.transaction_path(&self.document)
    }

    pub fn load(&self) -> Result<Graph> {
        load_document(&self.document)
    }

    /// Validate (warnings only), back up, write, then drop the backup.
    ///
    /// On a write failure the backup is restored over the document, or a
    /// partially written new document is deleted, and the error is returned.
    #[instrument(skip_all, fields(path = %self.document.display()))]
    pub fn save(&self, graph: &Graph) -> Result<SaveReport> {
        let findings = if self.config.validate_before_save {
            let report = validate_document(graph, &self.probe, &self.project_dir());
            for finding in &report.findings {
                warn!(%finding, "validation finding");
            }
            report.findings
        } else {
            Vec::new()
        };

        let backup = self.backup_path();
        let backed_up = self.document.exists();
        if backed_up {
            fs::copy(&self.document, &backup).with_context(|| {
                format!(
                    "back up {} to {}",
                    self.document.display(),
                    backup.display()
                )
            })?;
            debug!(backup = %backup.display(), "backup written");
        }

        if let Err(err) = self.writer.write(&self.document, graph) {
            self.restore_after_failure(&backup, backed_up);
            return Err(err.context(GraphError::OperationFailed(format!(
                "save {}",
                self.document.display()
            ))));
        }

        if backed_up {
            fs::remove_file(&backup)
                .with_context(|| format!("remove backup {}", backup.display()))?;
        }
        info!(path = %self.document.display(), nodes = graph.len(), "document saved");
        Ok(SaveReport {
            findings,
            backed_up,
        })
    }

    fn restore_after_failure(&self, backup: &Path, backed_up: bool) {
        let restored = if backed_up {
            fs::copy(backup, &self.document).and_then(|_| fs::remove_file(backup))
        } else if self.document.exists() {
            fs::remove_file(&self.document)
        } else {
            Ok(())
        };
        match restored {
            Ok(()) => warn!(path = %self.document.display(), "save failed, previous document restored"),
            Err(err) => warn!(
                path = %self.document.display(),
                backup = %backup.display(),
                error = %err,
                "save failed and restore failed"
            ),
        }
    }

    pub fn transaction_open(&self) -> bool {
        self.transaction_path().exists()
    }

    /// Snapshot the on-disk document.
    #[instrument(skip_all)]
    pub fn begin_transaction(&self) -> Result<()> {
        let snapshot = self.transaction_path();
        if snapshot.exists() {
            return Err(GraphError::TransactionInProgress(self.document.clone()).into());
        }
        fs::copy(&self.document, &snapshot).with_context(|| {
            format!(
                "snapshot {} to {}",
                self.document.display(),
                snapshot.display()
            )
        })?;
        info!(snapshot = %snapshot.display(), "transaction started");
        Ok(())
    }

    /// Save `graph`, then discard the snapshot.
    pub fn commit_transaction(&self, graph: &Graph) -> Result<SaveReport> {
        let snapshot = self.require_snapshot()?;
        let report = self.save(graph)?;
        fs::remove_file(&snapshot)
            .with_context(|| format!("remove snapshot {}", snapshot.display()))?;
        info!(path = %self.document.display(), "transaction committed");
        Ok(report)
    }

    /// Restore the snapshot over the document and return the restored graph.
    #[instrument(skip_all)]
    pub fn rollback_transaction(&self) -> Result<Graph> {
        let snapshot = self.require_snapshot()?;
        fs::copy(&snapshot, &self.document).with_context(|| {
            format!(
                "restore {} from {}",
                self.document.display(),
                snapshot.display()
            )
        })?;
        fs::remove_file(&snapshot)
            .with_context(|| format!("remove snapshot {}", snapshot.display()))?;
        info!(path = %self.document.display(), "transaction rolled back");
        self.load()
    }

    fn require_snapshot(&self) -> Result<PathBuf> {
        let snapshot = self.transaction_path();
        if snapshot.exists() {
            Ok(snapshot)
        } else {
            Err(GraphError::NoTransaction(self.document.clone()).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::files::add_file;
    use crate::error::{ErrorKind, error_kind};
    use crate::test_support::{FailingWriter, MemoryProbe, TestProject};

    #[test]
    fn save_round_trips_and_drops_backup() {
        let project = TestProject::new();
        let persistence = Persistence::new(project.document(), ToolConfig::default());
        let mut graph = persistence.load().expect("load");
        add_file(&mut graph, "Main.swift", "", &["App".to_string()]).expect("add");

        let report = persistence.save(&graph).expect("save");
        assert!(report.backed_up);
        assert!(!persistence.backup_path().exists());
        assert_eq!(persistence.load().expect("reload"), graph);
        // Main.swift is not on disk.
        assert_eq!(report.findings.len(), 1);
    }

    #[test]
    fn failed_save_restores_previous_bytes() {
        let project = TestProject::new();
        let before = fs::read(project.document()).expect("read");
        let persistence = Persistence::with_parts(
            project.document(),
            ToolConfig::default(),
            FailingWriter,
            MemoryProbe::default(),
        );
        let mut graph = persistence.load().expect("load");
        add_file(&mut graph, "Main.swift", "", &[]).expect("add");

        let err = persistence.save(&graph).expect_err("write fails");
        assert_eq!(error_kind(&err), ErrorKind::OperationFailed);
        assert_eq!(fs::read(project.document()).expect("read"), before);
        assert!(!persistence.backup_path().exists());
    }

    #[test]
    fn failed_first_save_leaves_no_partial_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("New.xcgraph.json");
        let persistence = Persistence::with_parts(
            &path,
            ToolConfig::default(),
            FailingWriter,
            MemoryProbe::default(),
        );
        assert!(persistence.save(&Graph::new()).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn transaction_state_errors() {
        let project = TestProject::new();
        let persistence = Persistence::new(project.document(), ToolConfig::default());
        let graph = persistence.load().expect("load");

        let err = persistence.commit_transaction(&graph).expect_err("no tx");
        assert_eq!(error_kind(&err), ErrorKind::TransactionState);
        let err = persistence.rollback_transaction().expect_err("no tx");
        assert_eq!(error_kind(&err), ErrorKind::TransactionState);

        persistence.begin_transaction().expect("begin");
        assert!(persistence.transaction_open());
        let err = persistence.begin_transaction().expect_err("nested");
        assert_eq!(error_kind(&err), ErrorKind::TransactionState);
    }

    #[test]
    fn rollback_restores_snapshot() {
        let project = TestProject::new();
        let persistence = Persistence::new(project.document(), ToolConfig::default());
        let original = persistence.load().expect("load");

        persistence.begin_transaction().expect("begin");
        let mut changed = original.clone();
        add_file(&mut changed, "Main.swift", "", &[]).expect("add");
        persistence.save(&changed).expect("save inside tx");

        let restored = persistence.rollback_transaction().expect("rollback");
        assert_eq!(restored, original);
        assert!(!persistence.transaction_open());
    }

    #[test]
    fn commit_saves_and_closes() {
        let project = TestProject::new();
        let persistence = Persistence::new(project.document(), ToolConfig::default());
        let mut graph = persistence.load().expect("load");

        persistence.begin_transaction().expect("begin");
        add_file(&mut graph, "Main.swift", "", &[]).expect("add");
        persistence.commit_transaction(&graph).expect("commit");
        assert!(!persistence.transaction_open());
        assert_eq!(persistence.load().expect("reload"), graph);
    }
}
