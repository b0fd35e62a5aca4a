//! crates/splice/src/error.rs
//!
//! Error surface of a spliced sub-pipeline.

use std::error::Error;
use std::io;

use thiserror::Error;

/// Boxed error raised by a sub-pipeline stage or by the upstream iterator.
pub type StageError = Box<dyn Error + Send + Sync + 'static>;

/// Result type produced by sub-pipeline stages.
pub type StageResult = Result<record::FileRecord, StageError>;

/// Failure reported by a [`Splice`](crate::Splice) or
/// [`SpliceSession`](crate::SpliceSession).
#[derive(Debug, Error)]
pub enum SpliceError {
    /// A stage inside the sub-pipeline produced an error.
    #[error("sub-pipeline failed: {0}")]
    Stage(#[source] StageError),
    /// The iterator feeding the splice produced an error.
    #[error("upstream failed: {0}")]
    Upstream(#[source] StageError),
    /// The worker thread running the sub-pipeline panicked.
    #[error("sub-pipeline worker panicked")]
    WorkerPanicked,
    /// The worker thread could not be started.
    #[error("failed to spawn sub-pipeline worker: {0}")]
    Spawn(#[source] io::Error),
    /// A record was submitted after the input side was closed.
    #[error("record submitted after the splice input was closed")]
    Closed,
}

impl SpliceError {
    /// Wraps an arbitrary stage error.
    pub fn stage<E>(error: E) -> Self
    where
        E: Into<StageError>,
    {
        Self::Stage(error.into())
    }

    /// Returns the wrapped stage or upstream error, if any.
    #[must_use]
    pub fn inner(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        match self {
            Self::Stage(error) | Self::Upstream(error) => Some(error.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_error_exposes_source() {
        let error = SpliceError::stage(io::Error::other("bad markup"));
        assert_eq!(error.to_string(), "sub-pipeline failed: bad markup");
        assert!(error.source().is_some());
        assert_eq!(error.inner().map(ToString::to_string).as_deref(), Some("bad markup"));
    }

    #[test]
    fn worker_panic_has_no_inner_error() {
        let error = SpliceError::WorkerPanicked;
        assert!(error.inner().is_none());
        assert!(error.source().is_none());
    }
}
