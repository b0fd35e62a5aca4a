//! Lexical path helpers.

use std::path::{Component, Path, PathBuf};

/// Collapses `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root; leading `..` components of a relative
/// path are preserved.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Computes the path that leads from directory `from` to `to`.
///
/// Both inputs are normalized first. The result climbs out of `from` with `..`
/// components as needed and is empty when both paths are equal.
///
/// ```
/// use record::relative_path;
/// use std::path::Path;
///
/// let target = relative_path(Path::new("/dist/a/b"), Path::new("/src/a/b/file.txt"));
/// assert_eq!(target, Path::new("../../../src/a/b/file.txt"));
/// ```
#[must_use]
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from = normalize(from);
    let to = normalize(to);
    let from_parts: Vec<Component<'_>> = from.components().collect();
    let to_parts: Vec<Component<'_>> = to.components().collect();

    let shared = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in shared..from_parts.len() {
        out.push("..");
    }
    for part in &to_parts[shared..] {
        out.push(part.as_os_str());
    }
    out
}
