#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `pipekit` is a small build-pipeline toolkit. Records enumerated from
//! source globs flow through a per-task handler and land in an output
//! directory, either written out or mirrored as relative symbolic links.
//!
//! The workspace crates are re-exported here:
//!
//! - [`record`]: the [`FileRecord`] every stage passes along;
//! - [`source`]: glob-driven record enumeration;
//! - [`splice`]: threading a record stream through an arbitrary sub-pipeline
//!   with one record in flight;
//! - [`sink`]: the destination writer and the symlink mirror;
//! - [`plugins`]: template and stylesheet stages;
//! - [`tasks`]: mode-aware task wiring and the sequential runner;
//! - [`logging`]: tracing targets and subscriber setup.
//!
//! # Examples
//!
//! ```
//! use pipekit::{Mode, Task, TaskError};
//!
//! let status = pipekit::run(Task::new("noop", || Ok::<(), TaskError>(())));
//! assert_eq!(status, std::process::ExitCode::SUCCESS);
//! assert_eq!(Mode::Production.as_str(), "prod");
//! ```

pub use logging;
pub use plugins;
pub use record;
pub use sink;
pub use source;
pub use ::splice;
pub use tasks;

pub use record::FileRecord;
pub use ::splice::{Splice, SpliceError, splice};
pub use tasks::{
    BuildTool, ConfigOverrides, Handler, HandlerContext, LinkSpec, Mode, RunError, Runner, Task,
    TaskError, TaskInfo, ToolConfig, run,
};
