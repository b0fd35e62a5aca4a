//! Filesystem primitives shared by the sinks and the task layer.
//!
//! Probing for a path that turns out not to exist is never an error here:
//! removal of an absent path succeeds, and creating a directory that already
//! exists succeeds.

use std::fs;
use std::io;
use std::path::Path;

use logging::trace_link;

use crate::error::SinkError;

/// Creates `path` and any missing ancestors.
pub fn make_dir_all(path: &Path) -> Result<(), SinkError> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(error) => Err(SinkError::io("create directory", path, error)),
    }
}

/// Removes whatever exists at `path`.
///
/// Real directories are removed recursively. Symbolic links are removed
/// themselves and never followed. A missing path is not an error.
pub fn remove_path(path: &Path) -> Result<(), SinkError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(error) => return Err(SinkError::io("inspect existing destination", path, error)),
    };

    let result = if metadata.file_type().is_dir() {
        fs::remove_dir_all(path)
    } else {
        remove_link_or_file(path, &metadata)
    };

    match result {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(SinkError::io("remove existing destination", path, error)),
    }
}

#[cfg(windows)]
fn remove_link_or_file(path: &Path, metadata: &fs::Metadata) -> io::Result<()> {
    use std::os::windows::fs::FileTypeExt;
    if metadata.file_type().is_symlink_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(not(windows))]
fn remove_link_or_file(path: &Path, _metadata: &fs::Metadata) -> io::Result<()> {
    fs::remove_file(path)
}

/// Replaces anything at `link_path` with a symbolic link to `target`.
///
/// `target` is stored verbatim, so a relative target is resolved against the
/// link's parent directory. The parent must already exist.
pub fn replace_with_symlink(target: &Path, link_path: &Path) -> Result<(), SinkError> {
    remove_path(link_path)?;
    create_symlink(target, link_path)
        .map_err(|error| SinkError::io("create symbolic link", link_path, error))?;
    trace_link!("{} -> {}", link_path.display(), target.display());
    Ok(())
}

#[cfg(unix)]
fn create_symlink(target: &Path, link_path: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link_path)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link_path: &Path) -> io::Result<()> {
    use std::os::windows::fs::{symlink_dir, symlink_file};
    let resolved = link_path
        .parent()
        .map_or_else(|| target.to_path_buf(), |parent| parent.join(target));
    if fs::metadata(resolved).is_ok_and(|metadata| metadata.is_dir()) {
        symlink_dir(target, link_path)
    } else {
        symlink_file(target, link_path)
    }
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_target: &Path, _link_path: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}
