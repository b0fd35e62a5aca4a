#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `source` turns a list of glob patterns into a stream of
//! [`FileRecord`](record::FileRecord) values, the first stage of every pipekit
//! pipeline. Patterns are interpreted relative to a working directory; a
//! leading `!` negates a pattern.
//!
//! # Design
//!
//! - [`SourceBuilder`] collects patterns and options (working directory, base,
//!   allow-empty, content loading).
//! - [`Source`] implements [`Iterator`] and walks the literal prefix of every
//!   positive pattern depth-first, with directory entries sorted
//!   lexicographically so output order is deterministic.
//! - [`SourceError`] reports pattern, metadata, and read failures together
//!   with the offending path.
//!
//! # Invariants
//!
//! - Symbolic links are never descended into. A link to a directory is
//!   yielded as a single record; consumers that need its subtree must handle
//!   the link itself.
//! - Each path is yielded at most once even when several patterns match it.
//! - Every yielded record has an absolute path under the working directory.
//! - Traversal never panics; the first failure ends the stream.
//!
//! # Examples
//!
//! ```
//! use source::SourceBuilder;
//! use std::fs;
//! use std::path::Path;
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! fs::create_dir_all(temp.path().join("src/pages"))?;
//! fs::write(temp.path().join("src/pages/index.pug"), b"h1 hi")?;
//! fs::write(temp.path().join("src/pages/draft.pug"), b"h1 wip")?;
//!
//! let records = SourceBuilder::new(["src/**/*.pug", "!src/**/draft.pug"])
//!     .cwd(temp.path())
//!     .base(temp.path().join("src"))
//!     .build()?
//!     .collect::<Result<Vec<_>, _>>()?;
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].relative(), Path::new("pages/index.pug"));
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod builder;
mod error;
mod pattern;
mod walker;

pub use builder::SourceBuilder;
pub use error::{SourceError, SourceErrorKind};
pub use walker::Source;
