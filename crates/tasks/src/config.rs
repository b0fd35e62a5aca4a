use std::path::PathBuf;

use crate::handler::TaskInfo;
use crate::mode::Mode;

/// Default source directory, relative to the working directory.
pub const DEFAULT_SRC_PATH_PART: &str = "src";
/// Default output directory, relative to the working directory.
pub const DEFAULT_DIST_PATH_PART: &str = "dist";

/// Configuration a [`BuildTool`](crate::BuildTool) is created with.
#[derive(Clone, Debug)]
pub struct ToolConfig {
    pub(crate) cwd: Option<PathBuf>,
    pub(crate) src_path_part: String,
    pub(crate) dist_path_part: PathBuf,
    pub(crate) tasks: Vec<TaskInfo>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            cwd: None,
            src_path_part: DEFAULT_SRC_PATH_PART.to_owned(),
            dist_path_part: PathBuf::from(DEFAULT_DIST_PATH_PART),
            tasks: Vec::new(),
        }
    }
}

impl ToolConfig {
    /// Creates a configuration with the default layout and no tasks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the working directory. Defaults to the process working directory
    /// at the time the tool is initialised.
    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Sets the source directory that task globs are prefixed with.
    #[must_use]
    pub fn with_src_path_part(mut self, part: impl Into<String>) -> Self {
        self.src_path_part = part.into();
        self
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_dist_path_part(mut self, part: impl Into<PathBuf>) -> Self {
        self.dist_path_part = part.into();
        self
    }

    /// Adds a task description.
    #[must_use]
    pub fn with_task(mut self, task: TaskInfo) -> Self {
        self.tasks.push(task);
        self
    }

    /// Task descriptions registered so far.
    #[must_use]
    pub fn tasks(&self) -> &[TaskInfo] {
        &self.tasks
    }

    pub(crate) fn merged(&self, overrides: Option<&ConfigOverrides>) -> Self {
        let mut merged = self.clone();
        let Some(overrides) = overrides else {
            return merged;
        };
        if let Some(cwd) = &overrides.cwd {
            merged.cwd = Some(cwd.clone());
        }
        if let Some(part) = &overrides.src_path_part {
            merged.src_path_part.clone_from(part);
        }
        if let Some(part) = &overrides.dist_path_part {
            merged.dist_path_part.clone_from(part);
        }
        if let Some(tasks) = &overrides.tasks {
            merged.tasks.clone_from(tasks);
        }
        merged
    }
}

/// Values that replace parts of a [`ToolConfig`] when a tool is initialised.
///
/// Absent fields leave the configured value in place.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Replacement working directory.
    pub cwd: Option<PathBuf>,
    /// Replacement source directory.
    pub src_path_part: Option<String>,
    /// Replacement output directory.
    pub dist_path_part: Option<PathBuf>,
    /// Replacement task list.
    pub tasks: Option<Vec<TaskInfo>>,
}

/// Per-run configuration handed to a task handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerContext {
    /// Mode the tool was initialised for.
    pub mode: Mode,
    /// Working directory.
    pub cwd: PathBuf,
    /// Source directory relative to `cwd`.
    pub src_path_part: String,
    /// `cwd` joined with `src_path_part`; the base of every source record.
    pub base_path: PathBuf,
    /// Output directory relative to `cwd`, after any per-task override.
    pub dist_path_part: PathBuf,
    /// Name of the task being run.
    pub task_name: String,
}

impl HandlerContext {
    /// Absolute output directory.
    #[must_use]
    pub fn dist_path(&self) -> PathBuf {
        self.cwd.join(&self.dist_path_part)
    }
}
