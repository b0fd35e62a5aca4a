//! Shared test utilities for the pipekit workspace.
//!
//! [`TestDir`] owns a temporary directory that is removed on drop and offers
//! helpers for laying out source trees (files, directories, symbolic links)
//! relative to its root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Temporary directory with path-relative helpers.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    /// Creates a fresh temporary directory.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Root of the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `relative` inside the directory.
    #[must_use]
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Writes a file, creating parent directories as needed.
    pub fn write_file(&self, relative: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> io::Result<PathBuf> {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Creates a directory and its parents.
    pub fn create_dir(&self, relative: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = self.join(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Creates a symbolic link at `relative` pointing at `target`.
    #[cfg(unix)]
    pub fn symlink(&self, target: impl AsRef<Path>, relative: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        std::os::unix::fs::symlink(target, &path)?;
        Ok(path)
    }

    /// Reads a file (following links).
    pub fn read_file(&self, relative: impl AsRef<Path>) -> io::Result<Vec<u8>> {
        fs::read(self.join(relative))
    }

    /// Whether anything (including a dangling link) exists at `relative`.
    #[must_use]
    pub fn exists(&self, relative: impl AsRef<Path>) -> bool {
        fs::symlink_metadata(self.join(relative)).is_ok()
    }

    /// Whether `relative` is itself a symbolic link.
    #[must_use]
    pub fn is_symlink(&self, relative: impl AsRef<Path>) -> bool {
        fs::symlink_metadata(self.join(relative)).is_ok_and(|meta| meta.file_type().is_symlink())
    }

    /// Target stored in the symbolic link at `relative`.
    pub fn read_link(&self, relative: impl AsRef<Path>) -> io::Result<PathBuf> {
        fs::read_link(self.join(relative))
    }

    /// Sorted names of the entries directly inside `relative`.
    pub fn list(&self, relative: impl AsRef<Path>) -> io::Result<Vec<String>> {
        let mut names = fs::read_dir(self.join(relative))?
            .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
            .collect::<io::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }
}
