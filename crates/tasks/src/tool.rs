use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use logging::TASK_TARGET;
use sink::{DestWriter, SymlinkMirror, make_dir_all, remove_path, replace_with_symlink};
use source::SourceBuilder;
use splice::splice;

use crate::config::{ConfigOverrides, HandlerContext, ToolConfig};
use crate::error::TaskError;
use crate::handler::{Handler, TaskInfo};
use crate::mode::Mode;
use crate::task::{Task, TaskResult};

/// Auxiliary link created by [`BuildTool::links_task`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkSpec {
    /// Link target, relative to the working directory.
    pub source: PathBuf,
    /// Link location, relative to the output directory.
    pub to: PathBuf,
}

impl LinkSpec {
    /// Creates a link specification.
    pub fn new(source: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            to: to.into(),
        }
    }
}

/// A task description resolved for the active mode.
#[derive(Clone, Debug)]
pub struct ResolvedTask {
    /// Source globs, prefixed with the source directory.
    pub patterns: Vec<String>,
    /// Handler selected for the active mode.
    pub handler: Handler,
    /// Context the handler runs with.
    pub context: HandlerContext,
}

#[derive(Clone, Debug)]
struct ResolvedState {
    mode: Mode,
    cwd: PathBuf,
    src_path_part: String,
    base_path: PathBuf,
    dist_path_part: PathBuf,
    tasks: Vec<TaskInfo>,
}

#[derive(Clone, Copy, Debug)]
enum Destination {
    Write,
    Mirror,
}

/// Maps named source globs to per-mode handlers and builds tasks from them.
///
/// Tasks created by a tool share its state: [`BuildTool::init`] returns a
/// `use_<mode>` task that resolves the configuration when it runs, and every
/// other task reads that resolution when it runs. Tasks can therefore be
/// created up front and composed into a series that starts with the
/// initialising task.
#[derive(Clone, Debug)]
pub struct BuildTool {
    config: ToolConfig,
    state: Arc<Mutex<Option<ResolvedState>>>,
}

impl BuildTool {
    /// Creates a tool. Nothing is resolved until the `use_<mode>` task runs.
    #[must_use]
    pub fn new(config: ToolConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the `use_<mode>` task that resolves the configuration.
    ///
    /// `overrides` are merged on top of the configuration the tool was created
    /// with. Only task descriptions with a handler for `mode` are kept.
    pub fn init(&self, mode: Mode, overrides: Option<ConfigOverrides>) -> Task {
        let config = self.config.clone();
        let state = Arc::clone(&self.state);
        Task::new(format!("use_{mode}"), move || {
            let merged = config.merged(overrides.as_ref());
            let cwd = match merged.cwd {
                Some(cwd) if cwd.is_absolute() => cwd,
                Some(cwd) => env::current_dir().map_err(TaskError::other)?.join(cwd),
                None => env::current_dir().map_err(TaskError::other)?,
            };
            let cwd = record::normalize(&cwd);
            let base_path = record::normalize(&cwd.join(&merged.src_path_part));
            let tasks: Vec<TaskInfo> = merged
                .tasks
                .into_iter()
                .filter(|info| info.handler(mode).is_some())
                .collect();
            tracing::debug!(
                target: TASK_TARGET,
                "resolved {} task(s) for mode {} under {}",
                tasks.len(),
                mode,
                cwd.display()
            );

            *lock(&state) = Some(ResolvedState {
                mode,
                cwd,
                src_path_part: merged.src_path_part,
                base_path,
                dist_path_part: merged.dist_path_part,
                tasks,
            });
            Ok(())
        })
    }

    /// Whether a `use_<mode>` task has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        lock(&self.state).is_some()
    }

    /// Mode the tool was last initialised for.
    #[must_use]
    pub fn mode(&self) -> Option<Mode> {
        lock(&self.state).as_ref().map(|state| state.mode)
    }

    /// Resolves `name` for the active mode.
    pub fn lookup(&self, name: &str) -> Result<ResolvedTask, TaskError> {
        let guard = lock(&self.state);
        let state = guard.as_ref().ok_or(TaskError::NotInitialized)?;
        let info = state
            .tasks
            .iter()
            .find(|info| info.name() == name)
            .ok_or_else(|| TaskError::NotFound {
                name: name.to_owned(),
                mode: state.mode,
            })?;
        let handler = info.handler(state.mode).cloned().ok_or_else(|| TaskError::NotFound {
            name: name.to_owned(),
            mode: state.mode,
        })?;

        Ok(ResolvedTask {
            patterns: info
                .sources()
                .iter()
                .map(|glob| prefix_glob(&state.src_path_part, glob))
                .collect(),
            handler,
            context: HandlerContext {
                mode: state.mode,
                cwd: state.cwd.clone(),
                src_path_part: state.src_path_part.clone(),
                base_path: state.base_path.clone(),
                dist_path_part: state.dist_path_part.clone(),
                task_name: name.to_owned(),
            },
        })
    }

    /// Returns the `cleanDist` task: remove the output directory if present,
    /// then recreate it empty.
    pub fn clean_dist_task(&self) -> Task {
        let state = Arc::clone(&self.state);
        Task::new("cleanDist", move || {
            let dist = {
                let guard = lock(&state);
                let state = guard.as_ref().ok_or(TaskError::NotInitialized)?;
                state.cwd.join(&state.dist_path_part)
            };
            remove_path(&dist)?;
            make_dir_all(&dist)?;
            Ok(())
        })
    }

    /// Returns the `handle_<name>` task: enumerate sources, run them through
    /// the mode's handler, and write the results under the output directory.
    ///
    /// `dist_override` replaces the output directory for this task only.
    pub fn handle_task(&self, name: &str, dist_override: Option<PathBuf>) -> Task {
        self.pipeline_task(format!("handle_{name}"), name, dist_override, Destination::Write)
    }

    /// Returns the `symlink_<name>` task: like [`BuildTool::handle_task`],
    /// but results are mirrored into the output directory as relative
    /// symbolic links.
    pub fn symlink_task(&self, name: &str, dist_override: Option<PathBuf>) -> Task {
        self.pipeline_task(format!("symlink_{name}"), name, dist_override, Destination::Mirror)
    }

    /// Returns the `links` task: for each spec, link `dist/<to>` to
    /// `<source>` with a relative target, replacing anything already there.
    pub fn links_task(&self, links: Vec<LinkSpec>) -> Task {
        let state = Arc::clone(&self.state);
        Task::new("links", move || {
            let (cwd, dist) = {
                let guard = lock(&state);
                let state = guard.as_ref().ok_or(TaskError::NotInitialized)?;
                (state.cwd.clone(), state.cwd.join(&state.dist_path_part))
            };
            for link in &links {
                create_link(&cwd.join(&link.source), &dist.join(&link.to))?;
            }
            Ok(())
        })
    }

    fn pipeline_task(
        &self,
        task_name: String,
        name: &str,
        dist_override: Option<PathBuf>,
        destination: Destination,
    ) -> Task {
        let tool = self.clone();
        let name = name.to_owned();
        Task::new(task_name, move || {
            let mut resolved = tool.lookup(&name)?;
            if let Some(dist) = &dist_override {
                resolved.context.dist_path_part.clone_from(dist);
            }
            run_pipeline(resolved, destination)
        })
    }
}

fn run_pipeline(resolved: ResolvedTask, destination: Destination) -> TaskResult {
    let ResolvedTask {
        patterns,
        handler,
        context,
    } = resolved;

    let source = SourceBuilder::new(patterns)
        .cwd(&context.cwd)
        .base(&context.base_path)
        .allow_empty(true)
        .build()?;
    let dist = context.dist_path();
    let task_name = context.task_name.clone();

    let records = splice(source, move |feed| handler.build(feed, &context))?
        .map(|record| record.map_err(TaskError::from));

    match destination {
        Destination::Write => {
            let files = DestWriter::new(&dist).consume(records)?;
            tracing::debug!(
                target: TASK_TARGET,
                "{task_name}: wrote {files} file(s) to {}",
                dist.display()
            );
        }
        Destination::Mirror => {
            let summary = SymlinkMirror::new(&dist).consume(records)?;
            tracing::debug!(
                target: TASK_TARGET,
                "{task_name}: linked {} file(s) and {} directories into {}",
                summary.files_linked,
                summary.directories_linked,
                dist.display()
            );
        }
    }
    Ok(())
}

fn create_link(source: &Path, link_path: &Path) -> Result<(), TaskError> {
    let parent = link_path.parent().ok_or_else(|| sink::SinkError::MissingParent {
        path: link_path.to_path_buf(),
    })?;
    let target = record::relative_path(&record::normalize(parent), &record::normalize(source));
    make_dir_all(parent)?;
    replace_with_symlink(&target, link_path)?;
    Ok(())
}

/// Joins a source glob onto the source directory, keeping a leading `!`.
fn prefix_glob(prefix: &str, glob: &str) -> String {
    let (negation, pattern) = glob
        .strip_prefix('!')
        .map_or(("", glob), |rest| ("!", rest));
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() || prefix == "." {
        format!("{negation}{pattern}")
    } else {
        format!("{negation}{prefix}/{pattern}")
    }
}

fn lock(state: &Mutex<Option<ResolvedState>>) -> MutexGuard<'_, Option<ResolvedState>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
