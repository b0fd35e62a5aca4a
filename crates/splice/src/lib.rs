#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `splice` lets a whole sub-pipeline of record stages stand in for a single
//! stage. Records from upstream are handed to the sub-pipeline one at a time
//! and whatever it emits is passed downstream in emission order.
//!
//! # Design
//!
//! - [`SpliceSession`] owns a worker thread that runs the sub-pipeline. The
//!   sub-pipeline reads its input from a [`Feed`]; every pull announces
//!   demand to the session before blocking on a capacity-one channel.
//! - Outputs, demands, and completion share one ordered channel back to the
//!   session, so all output caused by record `n` is observed before the
//!   sub-pipeline can ask for record `n + 1`.
//! - Records submitted while the sub-pipeline is busy wait in a backlog and
//!   are admitted in submission order.
//! - [`Splice`] wraps a session and an upstream iterator into a plain
//!   [`Iterator`]; [`splice`] constructs one.
//!
//! # Invariants
//!
//! - At most one record is in flight inside the sub-pipeline.
//! - Output order equals the order in which the sub-pipeline emitted.
//! - Closing the input waits for the backlog to drain; the sub-pipeline may
//!   still emit buffered output after its input ends.
//! - The first stage error ends the splice and is reported exactly once.
//!
//! # Examples
//!
//! ```
//! use record::FileRecord;
//! use splice::{splice, StageError};
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let upstream = ["/site/src/a.txt", "/site/src/b.txt"].map(|path| {
//!     FileRecord::new("/site", "/site/src", path).map_err(StageError::from)
//! });
//!
//! let renamed = splice(upstream, |feed| {
//!     feed.map(|mut record| {
//!         record.set_extension("html");
//!         Ok(record)
//!     })
//! })?
//! .collect::<Result<Vec<_>, _>>()?;
//!
//! assert_eq!(renamed[0].path(), std::path::Path::new("/site/src/a.html"));
//! assert_eq!(renamed[1].path(), std::path::Path::new("/site/src/b.html"));
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```

mod error;
mod feed;
mod session;
mod stream;

pub use error::{SpliceError, StageError, StageResult};
pub use feed::Feed;
pub use session::{HandOff, SpliceEvent, SpliceSession};
pub use stream::{Splice, splice};

#[cfg(test)]
mod tests;
