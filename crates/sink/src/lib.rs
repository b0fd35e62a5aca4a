#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `sink` materialises pipekit records at a destination. [`DestWriter`]
//! writes record contents as regular files. [`SymlinkMirror`] instead links
//! each destination path back to its source with a relative symbolic link, so
//! edits to sources show through without rebuilding.
//!
//! # Design
//!
//! The mirror works in two phases. While collecting, file records are linked
//! immediately and directory records are appended to a deferred list.
//! [`SymlinkMirror::finish`] consumes the mirror, turning the list into
//! [`DeferredDirs`], and reconciles it: a deferred directory is linked only
//! when its source is itself a symbolic link and nothing already exists at
//! its destination. Source enumeration never descends into symlinked
//! directories, so this pass is what brings their contents across.
//!
//! The [`fs_ops`] module holds the primitives both sinks share.
//!
//! # Invariants
//!
//! - Link targets are always relative to the link's parent directory.
//! - Plain source directories are never linked; their files are.
//! - A source that cannot be inspected is an error, never a silent skip.
//! - Reconciliation visits deferred directories in first-observed order.
//!
//! # Examples
//!
//! ```
//! use record::FileRecord;
//! use sink::DestWriter;
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let src = temp.path().join("src");
//! let record = FileRecord::new(temp.path(), &src, src.join("notes/a.txt"))?
//!     .with_contents(b"hello".to_vec());
//!
//! DestWriter::new(temp.path().join("dist")).write(&record)?;
//! assert_eq!(std::fs::read(temp.path().join("dist/notes/a.txt"))?, b"hello");
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod error;
pub mod fs_ops;
mod mirror;
mod writer;

pub use error::SinkError;
pub use fs_ops::{make_dir_all, remove_path, replace_with_symlink};
pub use mirror::{DeferredDirs, MirrorSummary, PendingDirEntry, SymlinkMirror};
pub use writer::DestWriter;
