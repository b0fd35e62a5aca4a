use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use splice::{Feed, StageResult};

use crate::config::HandlerContext;
use crate::mode::Mode;

/// Output stream of a handler's sub-pipeline.
pub type RecordStream = Box<dyn Iterator<Item = StageResult>>;

type HandlerFn = dyn Fn(Feed, &HandlerContext) -> RecordStream + Send + Sync;

/// Builds the sub-pipeline a task runs its records through.
///
/// The function runs on the splice worker thread and receives the record
/// feed together with the resolved [`HandlerContext`].
#[derive(Clone)]
pub struct Handler {
    build: Arc<HandlerFn>,
}

impl Handler {
    /// Wraps a sub-pipeline constructor.
    pub fn new<F, S>(build: F) -> Self
    where
        F: Fn(Feed, &HandlerContext) -> S + Send + Sync + 'static,
        S: Iterator<Item = StageResult> + 'static,
    {
        Self {
            build: Arc::new(move |feed: Feed, context: &HandlerContext| -> RecordStream {
                Box::new(build(feed, context))
            }),
        }
    }

    /// Handler that forwards every record unchanged.
    #[must_use]
    pub fn passthrough() -> Self {
        Self::new(|feed, _context| feed.map(Ok))
    }

    /// Builds the sub-pipeline for one run.
    pub fn build(&self, feed: Feed, context: &HandlerContext) -> RecordStream {
        (self.build)(feed, context)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}

/// Named set of source globs with a handler per mode.
///
/// A mode without an entry has no handler; the task does not exist in that
/// mode.
#[derive(Clone, Debug)]
pub struct TaskInfo {
    name: String,
    sources: Vec<String>,
    handlers: HashMap<Mode, Handler>,
}

impl TaskInfo {
    /// Creates a task description over `sources`, relative to the source
    /// directory. A leading `!` excludes matches.
    pub fn new<I, S>(name: impl Into<String>, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            sources: sources.into_iter().map(Into::into).collect(),
            handlers: HashMap::new(),
        }
    }

    /// Registers the handler used in `mode`.
    #[must_use]
    pub fn with_handler(mut self, mode: Mode, handler: Handler) -> Self {
        self.handlers.insert(mode, handler);
        self
    }

    /// Task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source globs.
    #[must_use]
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Handler for `mode`, if one is registered.
    #[must_use]
    pub fn handler(&self, mode: Mode) -> Option<&Handler> {
        self.handlers.get(&mode)
    }
}
