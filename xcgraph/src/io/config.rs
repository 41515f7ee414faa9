//! Tool configuration stored in `xcgraph.toml` next to the project document.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::settings::ValuePolicy;

pub const CONFIG_FILE_NAME: &str = "xcgraph.toml";

/// Tool configuration (TOML).
///
/// Missing fields take their defaults, so an empty file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolConfig {
    /// Run the dangerous-value gate on `set-setting`.
    pub reject_dangerous_values: bool,

    /// Run the validation detectors before each save and log findings.
    pub validate_before_save: bool,

    /// Extension appended to the document path for the save backup.
    pub backup_suffix: String,

    /// Extension appended to the document path for the transaction snapshot.
    pub transaction_suffix: String,

    /// Extra entry names skipped by folder scans.
    pub folder_ignore: Vec<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            reject_dangerous_values: true,
            validate_before_save: true,
            backup_suffix: "backup".to_string(),
            transaction_suffix: "transaction".to_string(),
            folder_ignore: Vec::new(),
        }
    }
}

impl ToolConfig {
    pub fn validate(&self) -> Result<()> {
        for (field, suffix) in [
            ("backup_suffix", &self.backup_suffix),
            ("transaction_suffix", &self.transaction_suffix),
        ] {
            let trimmed = suffix.trim();
            if trimmed.is_empty() {
                return Err(anyhow!("{field} must be non-empty"));
            }
            if trimmed.contains('/') || trimmed.contains('\\') {
                return Err(anyhow!("{field} must not contain a path separator"));
            }
        }
        if self.backup_suffix.trim() == self.transaction_suffix.trim() {
            return Err(anyhow!("backup_suffix and transaction_suffix must differ"));
        }
        if self.folder_ignore.iter().any(|name| name.trim().is_empty()) {
            return Err(anyhow!("folder_ignore entries must be non-empty"));
        }
        Ok(())
    }

    pub fn value_policy(&self) -> ValuePolicy {
        if self.reject_dangerous_values {
            ValuePolicy::RejectDangerous
        } else {
            ValuePolicy::AllowAll
        }
    }

    /// `<document>.<suffix>` sibling path.
    pub fn sibling_path(document: &Path, suffix: &str) -> PathBuf {
        let mut name = document
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".");
        name.push(suffix.trim());
        document.with_file_name(name)
    }

    pub fn backup_path(&self, document: &Path) -> PathBuf {
        Self::sibling_path(document, &self.backup_suffix)
    }

    pub fn transaction_path(&self, document: &Path) -> PathBuf {
        Self::sibling_path(document, &self.transaction_suffix)
    }
}

/// Default config location for a document: `xcgraph.toml` in its directory.
pub fn default_config_path(document: &Path) -> PathBuf {
    document
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(|parent| parent.join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ToolConfig::default()`.
pub fn load_config(path: &Path) -> Result<ToolConfig> {
    if !path.exists() {
        let cfg = ToolConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ToolConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}
