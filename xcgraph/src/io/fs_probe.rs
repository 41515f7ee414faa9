//! Filesystem-backed [`FsProbe`].

use std::path::Path;

use crate::core::validation::{EntryKind, FsProbe};

/// Answers path checks from the real filesystem, following symlinks.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskProbe;

impl FsProbe for DiskProbe {
    fn entry_kind(&self, path: &Path) -> Option<EntryKind> {
        let metadata = std::fs::metadata(path).ok()?;
        if metadata.is_dir() {
            Some(EntryKind::Directory)
        } else {
            Some(EntryKind::File)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_files_directories_and_missing_paths() {
        let temp = tempfile::tempdir().expect("tempdir");
        let file = temp.path().join("Main.swift");
        std::fs::write(&file, "").expect("write");

        assert_eq!(DiskProbe.entry_kind(&file), Some(EntryKind::File));
        assert_eq!(DiskProbe.entry_kind(temp.path()), Some(EntryKind::Directory));
        assert_eq!(DiskProbe.entry_kind(&temp.path().join("nope")), None);
    }
}
