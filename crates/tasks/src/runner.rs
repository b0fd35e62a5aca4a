use std::collections::HashMap;
use std::error::Error;
use std::fmt::Write as _;
use std::process::ExitCode;
use std::time::Instant;

use logging::{TASK_TARGET, VerbosityConfig, format_elapsed, init_tracing, trace_task};

use crate::error::RunError;
use crate::task::Task;

enum Entry {
    Task(Task),
    Series(Vec<String>),
}

/// Registry of named tasks and series, run one at a time.
///
/// Every task logs `Starting '<name>'...` before it runs and
/// `Finished '<name>' after <time>` or `Finished '<name>' errored after <time>`
/// afterwards. Series log the same lines at debug level. A failure is logged
/// with its cause chain once, where it happens, and stops the enclosing
/// series.
pub struct Runner {
    entries: HashMap<String, Entry>,
    logging: Option<VerbosityConfig>,
    logging_ready: bool,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// Creates a runner that installs the default subscriber on first run.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            logging: Some(VerbosityConfig::default()),
            logging_ready: false,
        }
    }

    /// Installs a subscriber with `config` on first run instead of the default.
    #[must_use]
    pub fn with_verbosity(mut self, config: VerbosityConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// Leaves subscriber installation to the caller.
    #[must_use]
    pub fn without_subscriber(mut self) -> Self {
        self.logging = None;
        self
    }

    /// Registers `task` under its name, replacing any earlier entry.
    pub fn task(&mut self, task: Task) -> &mut Self {
        let name = task.name().to_owned();
        self.insert(name, Entry::Task(task));
        self
    }

    /// Registers a series that runs the named tasks in order.
    ///
    /// Names are resolved when the series runs, so members may be registered
    /// afterwards.
    pub fn series<I, S>(&mut self, name: impl Into<String>, members: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members = members.into_iter().map(Into::into).collect();
        self.insert(name.into(), Entry::Series(members));
        self
    }

    /// Whether a task or series is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Runs the task or series registered under `name`.
    pub fn run(&mut self, name: &str) -> Result<(), RunError> {
        self.ensure_logging();
        let mut stack = Vec::new();
        self.run_entry(name, &mut stack)
    }

    /// Runs `name` and maps the outcome to a process exit status.
    pub fn run_to_exit(&mut self, name: &str) -> ExitCode {
        match self.run(name) {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::from(1),
        }
    }

    fn insert(&mut self, name: String, entry: Entry) {
        if self.entries.insert(name.clone(), entry).is_some() {
            tracing::debug!(target: TASK_TARGET, "replacing task '{name}'");
        }
    }

    fn ensure_logging(&mut self) {
        if self.logging_ready {
            return;
        }
        if let Some(config) = &self.logging {
            init_tracing(config);
        }
        self.logging_ready = true;
    }

    fn run_entry(&mut self, name: &str, stack: &mut Vec<String>) -> Result<(), RunError> {
        let members = match self.entries.get_mut(name) {
            None => {
                let error = RunError::UnknownTask(name.to_owned());
                tracing::error!(target: TASK_TARGET, "{error}");
                return Err(error);
            }
            Some(Entry::Task(task)) => return run_task(task),
            Some(Entry::Series(members)) => members.clone(),
        };

        if stack.iter().any(|active| active == name) {
            let error = RunError::CyclicSeries(name.to_owned());
            tracing::error!(target: TASK_TARGET, "{error}");
            return Err(error);
        }

        stack.push(name.to_owned());
        tracing::debug!(target: TASK_TARGET, "Starting '{name}'...");
        let started = Instant::now();
        let outcome = members
            .iter()
            .try_for_each(|member| self.run_entry(member, stack));
        let elapsed = format_elapsed(started.elapsed());
        match outcome {
            Ok(()) => tracing::debug!(target: TASK_TARGET, "Finished '{name}' after {elapsed}"),
            Err(_) => {
                tracing::debug!(target: TASK_TARGET, "Finished '{name}' errored after {elapsed}");
            }
        }
        stack.pop();
        outcome
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Runner")
            .field("entries", &names)
            .field("logging_ready", &self.logging_ready)
            .finish_non_exhaustive()
    }
}

fn run_task(task: &mut Task) -> Result<(), RunError> {
    let name = task.name().to_owned();
    trace_task!("Starting '{name}'...");
    let started = Instant::now();
    let outcome = task.run();
    let elapsed = format_elapsed(started.elapsed());

    match outcome {
        Ok(()) => {
            trace_task!("Finished '{name}' after {elapsed}");
            Ok(())
        }
        Err(source) => {
            tracing::error!(target: TASK_TARGET, "Finished '{name}' errored after {elapsed}");
            tracing::error!(target: TASK_TARGET, "{}", error_chain(&source));
            Err(RunError::Failed { name, source })
        }
    }
}

/// Renders an error followed by each distinct message in its source chain.
fn error_chain(error: &dyn Error) -> String {
    let mut rendered = error.to_string();
    let mut last = rendered.clone();
    let mut cause = error.source();
    while let Some(inner) = cause {
        let message = inner.to_string();
        if message != last && !rendered.ends_with(&message) {
            let _ = write!(rendered, ": {message}");
        }
        last = message;
        cause = inner.source();
    }
    rendered
}

/// Registers `task` on a fresh runner, runs it, and maps the outcome to an
/// exit status.
pub fn run(task: Task) -> ExitCode {
    let name = task.name().to_owned();
    let mut runner = Runner::new();
    runner.task(task);
    runner.run_to_exit(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use std::io;
    use std::sync::{Arc, Mutex};

    fn recorder(log: &Arc<Mutex<Vec<String>>>, name: &str) -> Task {
        let log = Arc::clone(log);
        let label = name.to_owned();
        Task::new(name, move || {
            log.lock().expect("log").push(label.clone());
            Ok(())
        })
    }

    fn failing(name: &str) -> Task {
        Task::new(name, || Err(TaskError::other(io::Error::other("boom"))))
    }

    fn runner() -> Runner {
        Runner::new().without_subscriber()
    }

    #[test]
    fn series_runs_members_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut runner = runner();
        runner
            .task(recorder(&log, "a"))
            .task(recorder(&log, "b"))
            .series("default", ["b", "a", "b"]);

        runner.run("default").expect("series succeeds");
        assert_eq!(*log.lock().expect("log"), ["b", "a", "b"]);
    }

    #[test]
    fn failure_stops_the_series_and_names_the_inner_task() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut runner = runner();
        runner
            .task(recorder(&log, "first"))
            .task(failing("broken"))
            .task(recorder(&log, "never"))
            .series("outer", ["first", "inner"])
            .series("inner", ["broken", "never"]);

        let error = runner.run("outer").unwrap_err();
        assert_eq!(error.task_name(), "broken");
        assert!(matches!(error, RunError::Failed { .. }));
        assert_eq!(*log.lock().expect("log"), ["first"]);
    }

    #[test]
    fn unknown_names_are_reported() {
        let mut runner = runner();
        runner.series("default", ["missing"]);
        let error = runner.run("default").unwrap_err();
        assert!(matches!(error, RunError::UnknownTask(ref name) if name == "missing"));
        assert!(matches!(runner.run("nothing"), Err(RunError::UnknownTask(_))));
    }

    #[test]
    fn cyclic_series_is_rejected() {
        let mut runner = runner();
        runner.series("a", ["b"]).series("b", ["a"]);
        let error = runner.run("a").unwrap_err();
        assert!(matches!(error, RunError::CyclicSeries(ref name) if name == "a"));
    }

    #[test]
    fn exit_status_reflects_the_outcome() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut runner = runner();
        runner.task(recorder(&log, "ok")).task(failing("bad"));
        assert_eq!(runner.run_to_exit("ok"), ExitCode::SUCCESS);
        assert_eq!(runner.run_to_exit("bad"), ExitCode::from(1));
    }

    #[test]
    fn tasks_can_run_repeatedly() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut runner = runner();
        runner.task(recorder(&log, "again"));
        runner.run("again").expect("first");
        runner.run("again").expect("second");
        assert_eq!(log.lock().expect("log").len(), 2);
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut runner = runner();
        runner.task(failing("step")).task(recorder(&log, "step"));
        assert!(runner.contains("step"));
        runner.run("step").expect("replacement runs");
    }

    #[test]
    fn error_chain_skips_repeated_messages() {
        let error = RunError::Failed {
            name: "t".to_owned(),
            source: TaskError::other(io::Error::other("boom")),
        };
        assert_eq!(error_chain(&error), "task 't' failed: boom");
    }
}
