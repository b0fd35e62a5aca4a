use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Error returned when building or draining a [`Source`](crate::Source).
#[derive(Debug)]
pub struct SourceError {
    kind: SourceErrorKind,
}

impl SourceError {
    pub(crate) fn new(kind: SourceErrorKind) -> Self {
        Self { kind }
    }

    pub(crate) fn current_dir(source: io::Error) -> Self {
        Self::new(SourceErrorKind::CurrentDir { source })
    }

    pub(crate) fn pattern(pattern: String, source: globset::Error) -> Self {
        Self::new(SourceErrorKind::Pattern { pattern, source })
    }

    pub(crate) fn metadata(path: PathBuf, source: io::Error) -> Self {
        Self::new(SourceErrorKind::Metadata { path, source })
    }

    pub(crate) fn read_dir(path: PathBuf, source: io::Error) -> Self {
        Self::new(SourceErrorKind::ReadDir { path, source })
    }

    pub(crate) fn read_dir_entry(path: PathBuf, source: io::Error) -> Self {
        Self::new(SourceErrorKind::ReadDirEntry { path, source })
    }

    pub(crate) fn read(path: PathBuf, source: io::Error) -> Self {
        Self::new(SourceErrorKind::Read { path, source })
    }

    /// Returns the specific failure.
    #[must_use]
    pub fn kind(&self) -> &SourceErrorKind {
        &self.kind
    }

    /// Returns the filesystem path associated with the error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.kind.path()
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SourceErrorKind::CurrentDir { source } => {
                write!(f, "failed to determine the working directory: {source}")
            }
            SourceErrorKind::NoPositivePattern => {
                write!(f, "no positive glob pattern supplied")
            }
            SourceErrorKind::Pattern { pattern, source } => {
                write!(f, "failed to compile glob pattern '{pattern}': {source}")
            }
            SourceErrorKind::Metadata { path, source } => {
                write!(
                    f,
                    "failed to inspect metadata for '{}': {}",
                    path.display(),
                    source
                )
            }
            SourceErrorKind::ReadDir { path, source } => {
                write!(
                    f,
                    "failed to read directory '{}': {}",
                    path.display(),
                    source
                )
            }
            SourceErrorKind::ReadDirEntry { path, source } => {
                write!(
                    f,
                    "failed to read entry in '{}': {}",
                    path.display(),
                    source
                )
            }
            SourceErrorKind::Read { path, source } => {
                write!(f, "failed to read '{}': {}", path.display(), source)
            }
            SourceErrorKind::NoMatch { patterns } => {
                write!(f, "file not found with singular glob: {}", patterns.join(", "))
            }
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            SourceErrorKind::CurrentDir { source }
            | SourceErrorKind::Metadata { source, .. }
            | SourceErrorKind::ReadDir { source, .. }
            | SourceErrorKind::ReadDirEntry { source, .. }
            | SourceErrorKind::Read { source, .. } => Some(source),
            SourceErrorKind::Pattern { source, .. } => Some(source),
            SourceErrorKind::NoPositivePattern | SourceErrorKind::NoMatch { .. } => None,
        }
    }
}

/// Classification of source failures.
#[derive(Debug)]
pub enum SourceErrorKind {
    /// The process working directory could not be determined.
    CurrentDir {
        /// Underlying error emitted by the operating system.
        source: io::Error,
    },
    /// Every supplied pattern was negated (or none were supplied).
    NoPositivePattern,
    /// A pattern failed to compile.
    Pattern {
        /// Pattern text as supplied, without the negation marker.
        pattern: String,
        /// Compilation failure reported by `globset`.
        source: globset::Error,
    },
    /// Failed to retrieve metadata for an entry.
    Metadata {
        /// Path whose metadata could not be retrieved.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        source: io::Error,
    },
    /// Failed to read the contents of a directory.
    ReadDir {
        /// Directory whose contents could not be read.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        source: io::Error,
    },
    /// Failed to obtain a directory entry during iteration.
    ReadDirEntry {
        /// Directory containing the problematic entry.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        source: io::Error,
    },
    /// Failed to load file contents.
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        source: io::Error,
    },
    /// Nothing matched and empty results were not allowed.
    NoMatch {
        /// Patterns as supplied to the builder.
        patterns: Vec<String>,
    },
}

impl SourceErrorKind {
    /// Returns the filesystem path tied to the failure, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            SourceErrorKind::Metadata { path, .. }
            | SourceErrorKind::ReadDir { path, .. }
            | SourceErrorKind::ReadDirEntry { path, .. }
            | SourceErrorKind::Read { path, .. } => Some(path),
            SourceErrorKind::CurrentDir { .. }
            | SourceErrorKind::NoPositivePattern
            | SourceErrorKind::Pattern { .. }
            | SourceErrorKind::NoMatch { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_error(message: &'static str) -> io::Error {
        io::Error::other(message)
    }

    #[test]
    fn source_error_path_matches_variant_path() {
        let metadata = SourceError::metadata(PathBuf::from("meta"), io_error("meta"));
        assert_eq!(Some(Path::new("meta")), metadata.path());

        let read_dir = SourceError::read_dir(PathBuf::from("dir"), io_error("dir"));
        assert_eq!(Some(Path::new("dir")), read_dir.path());

        let read = SourceError::read(PathBuf::from("file"), io_error("file"));
        assert_eq!(Some(Path::new("file")), read.path());

        let none = SourceError::new(SourceErrorKind::NoPositivePattern);
        assert!(none.path().is_none());
    }

    #[test]
    fn source_error_display_is_specific_per_variant() {
        let read_dir_entry = SourceError::read_dir_entry(PathBuf::from("entry"), io_error("boom"));
        assert_eq!(
            "failed to read entry in 'entry': boom",
            read_dir_entry.to_string()
        );

        let no_match = SourceError::new(SourceErrorKind::NoMatch {
            patterns: vec!["src/*.pug".to_owned(), "!src/x.pug".to_owned()],
        });
        assert_eq!(
            "file not found with singular glob: src/*.pug, !src/x.pug",
            no_match.to_string()
        );
    }

    #[test]
    fn pattern_error_exposes_globset_source() {
        let glob_err = globset::Glob::new("[").unwrap_err();
        let error = SourceError::pattern("[".to_owned(), glob_err);
        assert!(error.to_string().contains("failed to compile glob pattern '['"));
        assert!(error.source().is_some());
    }

    #[test]
    fn source_error_source_refers_to_underlying_io_error() {
        let error = SourceError::read(PathBuf::from("file"), io_error("source"));
        let source_ref = error
            .source()
            .and_then(|err| err.downcast_ref::<io::Error>())
            .expect("source error should expose the underlying io::Error");
        assert_eq!(source_ref.to_string(), "source");
    }
}
