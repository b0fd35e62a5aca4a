//! crates/sink/src/error.rs

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure raised while materialising records at a destination.
#[derive(Debug, Error)]
pub enum SinkError {
    /// A filesystem operation failed.
    #[error("failed to {action} '{}': {source}", path.display())]
    Io {
        /// Short description of the attempted operation.
        action: &'static str,
        /// Path the operation targeted.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// A computed destination path has no parent directory to link from.
    #[error("destination path '{}' has no parent directory", path.display())]
    MissingParent {
        /// Offending destination path.
        path: PathBuf,
    },
}

impl SinkError {
    /// Builds an [`SinkError::Io`] value.
    #[must_use]
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Path associated with the error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::MissingParent { path } => path,
        }
    }

    /// Kind of the underlying I/O error, if any.
    #[must_use]
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            Self::MissingParent { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_renders_action_and_path() {
        let error = SinkError::io(
            "inspect source",
            "/site/src/missing.txt",
            io::Error::from(io::ErrorKind::NotFound),
        );
        let rendered = error.to_string();
        assert!(rendered.starts_with("failed to inspect source '/site/src/missing.txt'"));
        assert_eq!(error.path(), Path::new("/site/src/missing.txt"));
        assert_eq!(error.io_kind(), Some(io::ErrorKind::NotFound));
    }

    #[test]
    fn missing_parent_has_no_io_kind() {
        let error = SinkError::MissingParent {
            path: PathBuf::from("/"),
        };
        assert!(error.io_kind().is_none());
        assert_eq!(error.path(), Path::new("/"));
    }
}
