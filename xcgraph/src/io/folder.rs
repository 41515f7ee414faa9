//! Directory enumeration for folder adds.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;
use walkdir::WalkDir;

use crate::core::classifier::classify;
use crate::core::files::{FolderListing, is_ignored_entry};
use crate::core::types::FileKind;

/// Snapshot `folder` as a [`FolderListing`].
///
/// File entries are recorded relative to `project_dir` when the folder lives
/// inside it, absolute otherwise. Directory-shaped bundles (asset catalogs,
/// frameworks, ...) are listed as files, not descended into. Entries are
/// sorted by name. Without `recursive` only the top level is read.
pub fn scan_folder(
    folder: &Path,
    project_dir: &Path,
    ignore: &[String],
    recursive: bool,
) -> Result<FolderListing> {
    if !folder.is_dir() {
        bail!("not a directory: {}", folder.display());
    }
    let name = folder
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("folder has no usable name: {}", folder.display()))?;
    let mut listing = FolderListing {
        name: name.to_string(),
        files: Vec::new(),
        folders: Vec::new(),
    };

    let walker = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.with_context(|| format!("read directory {}", folder.display()))?;
        let Some(entry_name) = entry.file_name().to_str() else {
            debug!(path = %entry.path().display(), "skipping non-UTF-8 entry");
            continue;
        };
        if is_ignored_entry(entry_name, ignore) {
            continue;
        }
        let path = entry.path();
        let kind = classify(entry_name);
        let is_bundle = kind.is_directory() && kind != FileKind::Folder;
        if path.is_dir() && !is_bundle {
            if recursive {
                listing
                    .folders
                    .push(scan_folder(path, project_dir, ignore, recursive)?);
            }
            continue;
        }
        listing.files.push(reference_path(path, project_dir));
    }
    Ok(listing)
}

/// `/`-separated path for a file reference.
fn reference_path(path: &Path, project_dir: &Path) -> String {
    let relative: PathBuf = path
        .strip_prefix(project_dir)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf());
    let absolute = relative.is_absolute();
    let segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let joined = segments.join("/");
    if absolute { format!("/{joined}") } else { joined }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, "").expect("write");
    }

    #[test]
    fn scans_sorted_and_filters_ignored_entries() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        let feature = root.join("Feature");
        touch(&feature.join("b.swift"));
        touch(&feature.join("a.swift"));
        touch(&feature.join(".DS_Store"));
        touch(&feature.join("notes.txt~"));
        touch(&feature.join("Generated.swift"));
        touch(&feature.join("Views/Row.swift"));
        fs::create_dir_all(feature.join("Assets.xcassets/AppIcon.appiconset")).expect("mkdir");

        let listing =
            scan_folder(&feature, root, &["Generated.swift".to_string()], true).expect("scan");
        assert_eq!(listing.name, "Feature");
        assert_eq!(
            listing.files,
            vec![
                "Feature/Assets.xcassets".to_string(),
                "Feature/a.swift".to_string(),
                "Feature/b.swift".to_string(),
            ]
        );
        assert_eq!(listing.folders.len(), 1);
        assert_eq!(listing.folders[0].files, vec!["Feature/Views/Row.swift".to_string()]);
    }

    #[test]
    fn non_recursive_scan_skips_subfolders() {
        let temp = tempfile::tempdir().expect("tempdir");
        let feature = temp.path().join("Feature");
        touch(&feature.join("Views/Row.swift"));
        touch(&feature.join("Main.swift"));

        let listing = scan_folder(&feature, temp.path(), &[], false).expect("scan");
        assert!(listing.folders.is_empty());
        assert_eq!(listing.files, vec!["Feature/Main.swift".to_string()]);
    }

    #[test]
    fn outside_project_uses_absolute_paths() {
        let project = tempfile::tempdir().expect("project");
        let shared = tempfile::tempdir().expect("shared");
        touch(&shared.path().join("Lib/Util.swift"));

        let listing =
            scan_folder(&shared.path().join("Lib"), project.path(), &[], false).expect("scan");
        assert!(listing.files[0].starts_with('/'));
        assert!(listing.files[0].ends_with("/Lib/Util.swift"));
    }

    #[test]
    fn missing_folder_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert!(scan_folder(&temp.path().join("nope"), temp.path(), &[], true).is_err());
    }
}
