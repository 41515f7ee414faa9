//! Path-safety predicate consulted before a path enters the graph.

/// Characters that only appear in paths when something is being smuggled
/// through a shell.
const SHELL_METACHARACTERS: &[char] = &[';', '|', '&', '$', '`', '<', '>', '\n', '\r'];

/// True when `path` may be stored in a file reference or walked on disk.
///
/// Rejects empty paths, NUL and other control characters, and shell
/// metacharacters. Relative `..` segments are allowed: projects commonly
/// reference sibling directories.
pub fn is_path_safe(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    if path.chars().any(|c| c.is_control()) {
        return false;
    }
    !path.contains(SHELL_METACHARACTERS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_paths() {
        assert!(is_path_safe("Sources/Login/Login.swift"));
        assert!(is_path_safe("../Shared/Model.swift"));
        assert!(is_path_safe("/Users/dev/My Project/File.swift"));
    }

    #[test]
    fn rejects_empty_control_and_shell_characters() {
        assert!(!is_path_safe(""));
        assert!(!is_path_safe("   "));
        assert!(!is_path_safe("a\0b.swift"));
        assert!(!is_path_safe("x.swift; rm -rf /"));
        assert!(!is_path_safe("$(whoami).swift"));
        assert!(!is_path_safe("`id`.swift"));
    }
}
