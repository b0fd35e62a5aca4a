#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `tasks` turns a list of named source globs into runnable build tasks and
//! runs them. A [`BuildTool`] maps each [`TaskInfo`] to a per-[`Mode`]
//! [`Handler`]; the handler builds the sub-pipeline records pass through on
//! their way from the source directory to the output directory. A [`Runner`]
//! executes named tasks and series sequentially and logs their lifecycle.
//!
//! # Design
//!
//! Tasks are closures over state shared with the tool that created them.
//! [`BuildTool::init`] returns the `use_<mode>` task; running it resolves the
//! working directory, the source base, and the tasks that have a handler in
//! that mode. The `handle_<name>` and `symlink_<name>` tasks look their
//! description up when they run, so a series such as
//! `use_prod, cleanDist, handle_pages` can be assembled before anything is
//! resolved.
//!
//! A pipeline task enumerates sources with [`source::SourceBuilder`], runs
//! them through the handler with [`splice::splice`], and hands the output to
//! [`sink::DestWriter`] or [`sink::SymlinkMirror`].
//!
//! # Errors
//!
//! Task failures are [`TaskError`]s. The runner wraps the innermost failure in
//! [`RunError::Failed`], logs it once, and stops the enclosing series.
//!
//! # Examples
//!
//! ```
//! use tasks::{BuildTool, Handler, Mode, Runner, TaskInfo, ToolConfig};
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! std::fs::create_dir_all(temp.path().join("src"))?;
//! std::fs::write(temp.path().join("src/readme.txt"), "hi")?;
//!
//! let tool = BuildTool::new(
//!     ToolConfig::new()
//!         .with_cwd(temp.path())
//!         .with_task(TaskInfo::new("docs", ["*.txt"]).with_handler(Mode::Production, Handler::passthrough())),
//! );
//!
//! let mut runner = Runner::new().without_subscriber();
//! runner
//!     .task(tool.init(Mode::Production, None))
//!     .task(tool.clean_dist_task())
//!     .task(tool.handle_task("docs", None))
//!     .series("build", ["use_prod", "cleanDist", "handle_docs"]);
//! runner.run("build")?;
//!
//! assert_eq!(std::fs::read(temp.path().join("dist/readme.txt"))?, b"hi");
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod config;
mod error;
mod handler;
mod mode;
mod runner;
mod task;
mod tool;

pub use config::{
    ConfigOverrides, DEFAULT_DIST_PATH_PART, DEFAULT_SRC_PATH_PART, HandlerContext, ToolConfig,
};
pub use error::{RunError, TaskError};
pub use handler::{Handler, RecordStream, TaskInfo};
pub use mode::{Mode, ParseModeError};
pub use runner::{Runner, run};
pub use task::{Task, TaskResult};
pub use tool::{BuildTool, LinkSpec, ResolvedTask};
