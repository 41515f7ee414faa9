//! Classify file references by extension.

use crate::core::types::FileKind;

/// Derive a [`FileKind`] from `path`. A trailing `/` marks a folder reference.
pub fn classify(path: &str) -> FileKind {
    if path.ends_with('/') {
        return FileKind::Folder;
    }
    let leaf = crate::core::types::leaf_name(path);
    let Some((stem, ext)) = leaf.rsplit_once('.') else {
        return FileKind::Unknown;
    };
    if stem.is_empty() {
        // Dotfiles such as `.swiftlint.yml` have an extension after the stem;
        // `.gitignore` has none.
        return FileKind::Unknown;
    }
    match ext.to_ascii_lowercase().as_str() {
        "swift" | "m" | "mm" | "c" | "cc" | "cpp" | "cxx" | "c++" | "metal" | "s" => {
            FileKind::Source
        }
        "h" | "hh" | "hpp" | "hxx" | "pch" => FileKind::Header,
        "xcassets" => FileKind::AssetCatalog,
        "storyboard" | "xib" => FileKind::Storyboard,
        "a" => FileKind::Archive,
        "framework" | "xcframework" => FileKind::Framework,
        "bundle" => FileKind::Bundle,
        "app" | "appex" => FileKind::Application,
        "md" | "txt" | "rtf" => FileKind::Text,
        "plist" | "json" | "strings" | "stringsdict" | "xcstrings" | "png" | "jpg" | "jpeg"
        | "gif" | "pdf" | "svg" | "ttf" | "otf" | "wav" | "mp3" | "caf" | "m4a" | "mp4"
        | "mov" | "html" | "css" | "js" | "xml" | "yml" | "yaml" | "entitlements"
        | "xcprivacy" => FileKind::Resource,
        _ => FileKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_compilable_sources() {
        assert_eq!(classify("Sources/Login.swift"), FileKind::Source);
        assert_eq!(classify("legacy/Bridge.M"), FileKind::Source);
        assert!(classify("main.cpp").is_compilable());
    }

    #[test]
    fn classifies_directory_shaped_kinds() {
        assert_eq!(classify("Assets.xcassets"), FileKind::AssetCatalog);
        assert_eq!(classify("Vendor/Foo.xcframework"), FileKind::Framework);
        assert_eq!(classify("Docs/"), FileKind::Folder);
        assert!(classify("Assets.xcassets").is_directory());
        assert!(!classify("Info.plist").is_directory());
    }

    #[test]
    fn unknown_without_extension() {
        assert_eq!(classify("Makefile"), FileKind::Unknown);
        assert_eq!(classify(".gitignore"), FileKind::Unknown);
        assert_eq!(classify("config/.swiftlint.yml"), FileKind::Resource);
    }
}
