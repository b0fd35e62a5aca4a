#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` collects the diagnostics plumbing shared across the pipekit
//! workspace: per-subsystem [`tracing`] targets wrapped in small macros,
//! subscriber initialisation driven by a [`VerbosityConfig`], and the
//! human-readable elapsed-time rendering used by task log lines.
//!
//! # Design
//!
//! - The `trace_*` macros forward to the standard [`tracing`] macros with a
//!   fixed `pipekit::<subsystem>` target so filters such as
//!   `RUST_LOG=pipekit::link=trace` isolate one subsystem.
//! - [`init_tracing`] installs a `tracing-subscriber` formatter. It uses
//!   `try_init`, so repeated calls are harmless and the first one wins.
//! - [`format_elapsed`] renders a [`Duration`](std::time::Duration) the way
//!   task runners traditionally print timings (`812 μs`, `12 ms`, `1.5 s`).
//!
//! # Examples
//!
//! ```
//! use logging::{VerbosityConfig, format_elapsed, init_tracing};
//! use std::time::Duration;
//!
//! init_tracing(&VerbosityConfig::from_verbose_level(1));
//! logging::trace_task!("Starting '{}'...", "build");
//! assert_eq!(format_elapsed(Duration::from_millis(12)), "12 ms");
//! ```

mod config;
mod elapsed;
mod tracing_init;
mod tracing_macros;

pub use config::{LevelName, VerbosityConfig};
pub use elapsed::format_elapsed;
pub use tracing_init::init_tracing;

#[doc(hidden)]
pub use tracing;

/// Target used by task runner lifecycle events.
pub const TASK_TARGET: &str = "pipekit::task";
/// Target used by the record-stream splice.
pub const SPLICE_TARGET: &str = "pipekit::splice";
/// Target used by the symlink mirror.
pub const LINK_TARGET: &str = "pipekit::link";
/// Target used by the file source.
pub const SOURCE_TARGET: &str = "pipekit::source";
/// Target used by the destination writer.
pub const WRITE_TARGET: &str = "pipekit::write";
