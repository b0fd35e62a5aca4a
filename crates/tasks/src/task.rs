use std::fmt;

use crate::error::TaskError;

/// Outcome of running a task.
pub type TaskResult = Result<(), TaskError>;

/// A named unit of work.
///
/// Tasks may be run any number of times; each run re-reads whatever shared
/// state the task captured.
pub struct Task {
    name: String,
    action: Box<dyn FnMut() -> TaskResult + Send>,
}

impl Task {
    /// Creates a task from a closure.
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: FnMut() -> TaskResult + Send + 'static,
    {
        Self {
            name: name.into(),
            action: Box::new(action),
        }
    }

    /// Task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the same task under a different name.
    #[must_use]
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Runs the task once.
    pub fn run(&mut self) -> TaskResult {
        (self.action)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("name", &self.name).finish_non_exhaustive()
    }
}
