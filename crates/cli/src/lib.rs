#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` is the command-line front-end of pipekit. It reads a JSON
//! [`Manifest`] (by default `pipekit.json` in the working directory), builds
//! a [`tasks::BuildTool`] whose handlers are the [`BuiltinHandler`]s the
//! manifest names, and runs the requested targets on a [`tasks::Runner`].
//!
//! # Design
//!
//! [`run`] accepts the argument list together with handles for standard
//! output and error and returns a numeric status, which the binary converts
//! with [`exit_code_from`]. A `clap` command definition parses the flags; each
//! target is registered as a runner series that starts with the `use_<mode>`
//! task:
//!
//! - `clean` runs `cleanDist`;
//! - `build` runs `cleanDist`, every task's `handle_<name>`, then `links`;
//! - `link` runs `cleanDist`, every task's `symlink_<name>`, then `links`;
//! - `handle:<name>` and `symlink:<name>` run a single task.
//!
//! Only tasks with a handler in the selected mode take part in `build` and
//! `link`; `links` is skipped when the manifest defines none.
//!
//! # Errors
//!
//! Argument errors exit with status `2`. Manifest problems are printed to
//! `stderr` and, like a failing task, exit with status `1`.
//!
//! # Examples
//!
//! ```
//! let mut stdout = Vec::new();
//! let mut stderr = Vec::new();
//! let status = cli::run(["pipekit", "--version"], &mut stdout, &mut stderr);
//!
//! assert_eq!(status, 0);
//! assert!(String::from_utf8_lossy(&stdout).starts_with("pipekit "));
//! ```

mod builtin;
mod command;
mod error;
mod frontend;
mod manifest;

pub use builtin::{BuiltinHandler, BuiltinOptions};
pub use error::CliError;
pub use frontend::{MAX_EXIT_CODE, exit_code_from, run};
pub use manifest::{DEFAULT_MANIFEST, LinkEntry, Manifest, TaskEntry};
