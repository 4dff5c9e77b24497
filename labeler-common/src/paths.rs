//! Image path handling shared by client URLs and server lookups
//!
//! Catalog paths are relative to the data directory and always use `/`.
//! In URLs each segment is percent-encoded on its own so that file names
//! containing `#`, `?`, `%` or spaces survive while the separators stay
//! readable.

use std::path::{Component, Path, PathBuf};

/// Percent-encode each `/`-delimited segment of a catalog path
///
/// # Examples
/// ```
/// use labeler_common::paths::encode_path_segments;
///
/// assert_eq!(encode_path_segments("run 1/img#3.png"), "run%201/img%233.png");
/// ```
pub fn encode_path_segments(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Convert an OS relative path into catalog form (`/` separators)
pub fn to_catalog_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve a catalog path under `root`, refusing anything that could escape it
///
/// Returns `None` for absolute paths, `..` components, or backslashes.
pub fn resolve_under(root: &Path, catalog_path: &str) -> Option<PathBuf> {
    if catalog_path.is_empty() || catalog_path.contains('\\') {
        return None;
    }

    let relative = Path::new(catalog_path);
    let mut resolved = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_keeps_separators() {
        assert_eq!(encode_path_segments("a/b/c.png"), "a/b/c.png");
    }

    #[test]
    fn test_encode_special_characters_per_segment() {
        assert_eq!(
            encode_path_segments("scan 01/50% crop?.png"),
            "scan%2001/50%25%20crop%3F.png"
        );
    }

    #[test]
    fn test_to_catalog_path_uses_forward_slashes() {
        let p = Path::new("scene").join("nested").join("x.png");
        assert_eq!(to_catalog_path(&p), "scene/nested/x.png");
    }

    #[test]
    fn test_resolve_under_accepts_nested() {
        let root = Path::new("/data");
        assert_eq!(
            resolve_under(root, "a/b.png"),
            Some(PathBuf::from("/data/a/b.png"))
        );
    }

    #[test]
    fn test_resolve_under_rejects_escape() {
        let root = Path::new("/data");
        assert_eq!(resolve_under(root, "../etc/passwd"), None);
        assert_eq!(resolve_under(root, "a/../../b.png"), None);
        assert_eq!(resolve_under(root, "/etc/passwd"), None);
        assert_eq!(resolve_under(root, "a\\..\\b.png"), None);
        assert_eq!(resolve_under(root, ""), None);
    }
}
