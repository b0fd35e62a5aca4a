//! crates/plugins/src/error.rs

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by a conversion stage.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The template converter rejected a file.
    #[error("template error in '{}': {message}", path.display())]
    Template {
        /// File being converted.
        path: PathBuf,
        /// Converter diagnostic.
        message: String,
    },
    /// The stylesheet converter rejected a file.
    #[error("stylesheet error in '{}': {message}", path.display())]
    Stylesheet {
        /// File being converted.
        path: PathBuf,
        /// Converter diagnostic.
        message: String,
    },
    /// Reading a record's source file failed.
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl PluginError {
    pub(crate) fn template(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Template {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn stylesheet(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Stylesheet {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
