//! crates/tasks/src/error.rs

use std::error::Error;

use sink::SinkError;
use source::SourceError;
use splice::SpliceError;
use thiserror::Error;

use crate::mode::Mode;

/// Failure of a task created by a [`BuildTool`](crate::BuildTool) or
/// registered with a [`Runner`](crate::Runner).
#[derive(Debug, Error)]
pub enum TaskError {
    /// A task that needs resolved configuration ran before `use_<mode>`.
    #[error("build tool is not initialised; run the use_<mode> task first")]
    NotInitialized,
    /// No task of that name has a handler in the active mode.
    #[error("no task named '{name}' has a handler in mode '{mode}'")]
    NotFound {
        /// Requested task name.
        name: String,
        /// Active mode.
        mode: Mode,
    },
    /// Source enumeration could not start.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// The handler's sub-pipeline or the record stream failed.
    #[error(transparent)]
    Splice(#[from] SpliceError),
    /// Writing or linking at the destination failed.
    #[error(transparent)]
    Sink(#[from] SinkError),
    /// Failure raised by a caller-supplied task.
    #[error(transparent)]
    Other(#[from] Box<dyn Error + Send + Sync>),
}

impl TaskError {
    /// Wraps an arbitrary error raised by a custom task.
    pub fn other<E>(error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self::Other(error.into())
    }
}

/// Failure reported by [`Runner::run`](crate::Runner::run).
#[derive(Debug, Error)]
pub enum RunError {
    /// No task or series is registered under the name.
    #[error("task '{0}' is not defined")]
    UnknownTask(String),
    /// A series names itself, directly or through another series.
    #[error("series '{0}' runs itself")]
    CyclicSeries(String),
    /// A task failed. `name` is the innermost failing task.
    #[error("task '{name}' failed: {source}")]
    Failed {
        /// Name of the failing task.
        name: String,
        /// Underlying failure.
        #[source]
        source: TaskError,
    },
}

impl RunError {
    /// Name of the task the error concerns.
    #[must_use]
    pub fn task_name(&self) -> &str {
        match self {
            Self::UnknownTask(name) | Self::CyclicSeries(name) | Self::Failed { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn failed_run_names_the_task_and_keeps_the_cause() {
        let error = RunError::Failed {
            name: "handle_pages".to_owned(),
            source: TaskError::other(io::Error::other("disk full")),
        };
        assert_eq!(error.task_name(), "handle_pages");
        assert_eq!(error.to_string(), "task 'handle_pages' failed: disk full");
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn not_found_mentions_the_mode() {
        let error = TaskError::NotFound {
            name: "pages".to_owned(),
            mode: Mode::Production,
        };
        assert_eq!(error.to_string(), "no task named 'pages' has a handler in mode 'prod'");
    }
}
