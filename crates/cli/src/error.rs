//! crates/cli/src/error.rs

use std::io;
use std::path::PathBuf;

use tasks::ParseModeError;
use thiserror::Error;

/// Failure preparing a run from the command line and the manifest.
#[derive(Debug, Error)]
pub enum CliError {
    /// The manifest could not be read.
    #[error("failed to read manifest {}: {source}", path.display())]
    ReadManifest {
        /// Manifest location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The manifest is not valid JSON of the expected shape.
    #[error("invalid manifest {}: {source}", path.display())]
    ParseManifest {
        /// Manifest location.
        path: PathBuf,
        /// Parser error, with line and column.
        #[source]
        source: serde_json::Error,
    },
    /// A mode name on the command line or in a manifest handler table.
    #[error(transparent)]
    Mode(#[from] ParseModeError),
    /// Two manifest tasks share a name.
    #[error("task '{0}' is defined more than once in the manifest")]
    DuplicateTask(String),
    /// A target names no manifest task.
    #[error("unknown target '{0}'")]
    UnknownTarget(String),
    /// The process working directory is unavailable.
    #[error("failed to determine the working directory: {0}")]
    CurrentDir(#[source] io::Error),
}
