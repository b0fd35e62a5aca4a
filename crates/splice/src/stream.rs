use record::FileRecord;

use crate::error::{SpliceError, StageError, StageResult};
use crate::feed::Feed;
use crate::session::{SpliceEvent, SpliceSession};

/// Iterator adapter that routes an upstream record stream through a
/// sub-pipeline.
///
/// Upstream is only pulled when the sub-pipeline is idle and asks for more
/// input. The first error, from either side, is yielded once and ends the
/// iteration.
pub struct Splice<I> {
    upstream: I,
    session: SpliceSession,
    finished: bool,
}

impl<I> Splice<I> {
    /// Underlying session, for inspecting hand-off counters.
    #[must_use]
    pub const fn session(&self) -> &SpliceSession {
        &self.session
    }

    fn fail(&mut self, error: SpliceError) -> Option<Result<FileRecord, SpliceError>> {
        self.finished = true;
        Some(Err(error))
    }
}

impl<I, E> Iterator for Splice<I>
where
    I: Iterator<Item = Result<FileRecord, E>>,
    E: Into<StageError>,
{
    type Item = Result<FileRecord, SpliceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            match self.session.next_event() {
                Ok(SpliceEvent::Output(record)) => return Some(Ok(record)),
                Ok(SpliceEvent::NeedsInput) => match self.upstream.next() {
                    Some(Ok(record)) => {
                        if let Err(error) = self.session.submit(record) {
                            return self.fail(error);
                        }
                    }
                    Some(Err(error)) => return self.fail(SpliceError::Upstream(error.into())),
                    None => self.session.close(),
                },
                Ok(SpliceEvent::Finished) => {
                    self.finished = true;
                    return None;
                }
                Err(error) => return self.fail(error),
            }
        }
    }
}

impl<I, E> std::iter::FusedIterator for Splice<I>
where
    I: Iterator<Item = Result<FileRecord, E>>,
    E: Into<StageError>,
{
}

impl<I> std::fmt::Debug for Splice<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Splice")
            .field("session", &self.session)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

/// Routes `upstream` through the sub-pipeline built by `handler`.
///
/// `handler` runs once, on a dedicated worker thread, and receives the
/// [`Feed`] of input records. Whatever it returns is drained on that thread
/// and surfaced through the returned iterator in emission order.
pub fn splice<U, E, F, S>(upstream: U, handler: F) -> Result<Splice<U::IntoIter>, SpliceError>
where
    U: IntoIterator<Item = Result<FileRecord, E>>,
    E: Into<StageError>,
    F: FnOnce(Feed) -> S + Send + 'static,
    S: IntoIterator<Item = StageResult>,
{
    Ok(Splice {
        upstream: upstream.into_iter(),
        session: SpliceSession::spawn(handler)?,
        finished: false,
    })
}
