use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use logging::trace_link;
use record::FileRecord;

use crate::error::SinkError;
use crate::fs_ops::{make_dir_all, replace_with_symlink};

/// Directory record set aside until the collecting phase ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingDirEntry {
    /// Working directory of the originating record.
    pub cwd: PathBuf,
    /// Path of the directory relative to the record base.
    pub relative: PathBuf,
    /// Absolute source path of the directory.
    pub path: PathBuf,
}

/// Counters reported once a mirror has been reconciled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MirrorSummary {
    /// Non-directory records linked during collection.
    pub files_linked: usize,
    /// Symlinked source directories linked during reconciliation.
    pub directories_linked: usize,
    /// Deferred directories that were left alone, either because something
    /// already occupied their destination or because they are plain
    /// directories.
    pub directories_skipped: usize,
}

/// Sink that mirrors records into a destination as relative symbolic links.
///
/// Files are linked as they arrive. Directory records are only remembered;
/// [`SymlinkMirror::finish`] later links those whose source is itself a
/// symbolic link and whose destination was not populated by files linked
/// underneath it.
#[derive(Debug)]
pub struct SymlinkMirror {
    destination: PathBuf,
    pending: Vec<PendingDirEntry>,
    files_linked: usize,
}

impl SymlinkMirror {
    /// Creates a mirror into `destination`.
    ///
    /// A relative destination is resolved against each record's working
    /// directory.
    #[must_use]
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            pending: Vec::new(),
            files_linked: 0,
        }
    }

    /// Destination as configured.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Directory records deferred so far, in arrival order.
    #[must_use]
    pub fn pending(&self) -> &[PendingDirEntry] {
        &self.pending
    }

    /// Handles one record of the collecting phase.
    pub fn write(&mut self, record: &FileRecord) -> Result<(), SinkError> {
        let metadata = fs::metadata(record.path())
            .map_err(|error| SinkError::io("inspect source", record.path(), error))?;

        if metadata.is_dir() {
            trace_link!("deferring directory {}", record.path().display());
            self.pending.push(PendingDirEntry {
                cwd: record.cwd().to_path_buf(),
                relative: record.relative(),
                path: record.path().to_path_buf(),
            });
            return Ok(());
        }

        let link_path = link_path_for(record.cwd(), &self.destination, &record.relative());
        link_into(&link_path, record.path())?;
        self.files_linked += 1;
        Ok(())
    }

    /// Ends the collecting phase and hands over the deferred directories.
    #[must_use]
    pub fn into_deferred(self) -> DeferredDirs {
        DeferredDirs {
            destination: self.destination,
            entries: self.pending,
            files_linked: self.files_linked,
        }
    }

    /// Ends the collecting phase and reconciles deferred directories.
    pub fn finish(self) -> Result<MirrorSummary, SinkError> {
        self.into_deferred().reconcile()
    }

    /// Runs both phases over a record stream.
    pub fn consume<I, E>(mut self, records: I) -> Result<MirrorSummary, E>
    where
        I: IntoIterator<Item = Result<FileRecord, E>>,
        E: From<SinkError>,
    {
        for record in records {
            self.write(&record?)?;
        }
        self.finish().map_err(E::from)
    }
}

/// Deferred directory list produced by [`SymlinkMirror::into_deferred`].
#[derive(Debug)]
pub struct DeferredDirs {
    destination: PathBuf,
    entries: Vec<PendingDirEntry>,
    files_linked: usize,
}

impl DeferredDirs {
    /// Deferred entries in first-observed order.
    #[must_use]
    pub fn entries(&self) -> &[PendingDirEntry] {
        &self.entries
    }

    /// Links every deferred directory whose source is a symbolic link and
    /// whose destination is still vacant.
    pub fn reconcile(self) -> Result<MirrorSummary, SinkError> {
        let mut summary = MirrorSummary {
            files_linked: self.files_linked,
            ..MirrorSummary::default()
        };

        for entry in &self.entries {
            let link_path = link_path_for(&entry.cwd, &self.destination, &entry.relative);

            match fs::metadata(&link_path) {
                Ok(_) => {
                    summary.directories_skipped += 1;
                    continue;
                }
                Err(error) if error.kind() == io::ErrorKind::NotFound => {}
                Err(error) => return Err(SinkError::io("inspect destination", link_path, error)),
            }

            let source = fs::symlink_metadata(&entry.path)
                .map_err(|error| SinkError::io("inspect source", &entry.path, error))?;
            if !source.file_type().is_symlink() {
                summary.directories_skipped += 1;
                continue;
            }

            link_into(&link_path, &entry.path)?;
            summary.directories_linked += 1;
        }

        trace_link!(
            "mirror reconciled: {} files, {} directories linked, {} skipped",
            summary.files_linked,
            summary.directories_linked,
            summary.directories_skipped
        );
        Ok(summary)
    }
}

fn link_path_for(cwd: &Path, destination: &Path, relative: &Path) -> PathBuf {
    record::normalize(&cwd.join(destination).join(relative))
}

/// Links `link_path` to `source` with a target relative to the link's parent.
fn link_into(link_path: &Path, source: &Path) -> Result<(), SinkError> {
    let parent = link_path.parent().ok_or_else(|| SinkError::MissingParent {
        path: link_path.to_path_buf(),
    })?;
    let target = record::relative_path(parent, source);
    make_dir_all(parent)?;
    replace_with_symlink(&target, link_path)
}
