#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `record` defines [`FileRecord`], the unit that flows through every pipekit
//! pipeline: the source producer creates records, handlers rewrite their path
//! and contents in place, and the destination sinks consume them.
//!
//! # Invariants
//!
//! - [`FileRecord::path`] is always absolute. [`FileRecord::new`] rejects
//!   relative paths and [`FileRecord::set_path`] resolves relative input
//!   against the record's base.
//! - [`FileRecord::relative`] is derived from `path` and `base` on demand, so
//!   rewriting the path never leaves a stale relative component behind.
//! - Whether a record is a directory is not stored; it is answered by a
//!   filesystem stat through [`FileRecord::stat_is_directory`].
//!
//! # Examples
//!
//! ```
//! use record::FileRecord;
//! use std::path::Path;
//!
//! let mut record = FileRecord::new("/work", "/work/src", "/work/src/pages/index.pug")
//!     .expect("absolute path")
//!     .with_contents(b"h1 hello".to_vec());
//! record.set_extension("html");
//!
//! assert_eq!(record.relative(), Path::new("pages/index.html"));
//! ```

mod paths;

pub use paths::{normalize, relative_path};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised when constructing a [`FileRecord`].
#[derive(Debug, Error)]
pub enum RecordError {
    /// The record path was not absolute.
    #[error("record path '{0}' is not absolute")]
    RelativePath(PathBuf),
}

/// One file or directory discovered by a source producer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    cwd: PathBuf,
    base: PathBuf,
    path: PathBuf,
    contents: Option<Vec<u8>>,
}

impl FileRecord {
    /// Creates a record without contents.
    pub fn new(
        cwd: impl Into<PathBuf>,
        base: impl Into<PathBuf>,
        path: impl Into<PathBuf>,
    ) -> Result<Self, RecordError> {
        let path = path.into();
        if !path.is_absolute() {
            return Err(RecordError::RelativePath(path));
        }
        Ok(Self {
            cwd: cwd.into(),
            base: base.into(),
            path: normalize(&path),
            contents: None,
        })
    }

    /// Attaches a content payload.
    #[must_use]
    pub fn with_contents(mut self, contents: Vec<u8>) -> Self {
        self.contents = Some(contents);
        self
    }

    /// Working directory the record was produced under.
    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Root that [`relative`](Self::relative) is computed against.
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Absolute path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to [`base`](Self::base).
    #[must_use]
    pub fn relative(&self) -> PathBuf {
        relative_path(&self.base, &self.path)
    }

    /// Content payload, present only for regular files carrying data.
    #[must_use]
    pub fn contents(&self) -> Option<&[u8]> {
        self.contents.as_deref()
    }

    /// Removes and returns the content payload.
    pub fn take_contents(&mut self) -> Option<Vec<u8>> {
        self.contents.take()
    }

    /// Replaces the content payload.
    pub fn set_contents(&mut self, contents: Vec<u8>) {
        self.contents = Some(contents);
    }

    /// Rewrites the record path.
    ///
    /// Relative paths are resolved against the record's base so the absolute
    /// path invariant holds.
    pub fn set_path(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.path = if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.base.join(path))
        };
    }

    /// Replaces the extension of the record path.
    pub fn set_extension(&mut self, extension: &str) {
        self.path.set_extension(extension);
    }

    /// Reports whether the underlying filesystem entry is a directory.
    ///
    /// Symbolic links are followed, so a link to a directory answers `true`.
    pub fn stat_is_directory(&self) -> io::Result<bool> {
        fs::metadata(&self.path).map(|metadata| metadata.is_dir())
    }

    /// Like [`stat_is_directory`](Self::stat_is_directory), but a path that
    /// does not exist answers `false`. Records renamed by a stage usually
    /// have no filesystem entry behind them.
    pub fn is_existing_directory(&self) -> io::Result<bool> {
        match self.stat_is_directory() {
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            other => other,
        }
    }
}
