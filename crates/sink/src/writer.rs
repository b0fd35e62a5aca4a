use std::fs;
use std::path::{Path, PathBuf};

use logging::trace_write;
use record::FileRecord;

use crate::error::SinkError;
use crate::fs_ops::make_dir_all;

/// Writes record contents beneath a destination root.
///
/// The destination layout mirrors each record's path relative to its base.
#[derive(Clone, Debug)]
pub struct DestWriter {
    root: PathBuf,
}

impl DestWriter {
    /// Creates a writer rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Destination root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Materialises one record.
    ///
    /// A record without contents whose source path is a directory becomes a
    /// directory. Every other record becomes a file holding its contents,
    /// empty when the record carries none.
    pub fn write(&self, record: &FileRecord) -> Result<(), SinkError> {
        self.write_entry(record).map(|_| ())
    }

    /// Writes `record` and reports whether it became a file.
    fn write_entry(&self, record: &FileRecord) -> Result<bool, SinkError> {
        let target = self.root.join(record.relative());

        let Some(contents) = record.contents() else {
            let is_directory = record
                .is_existing_directory()
                .map_err(|error| SinkError::io("inspect source", record.path(), error))?;
            if is_directory {
                trace_write!("directory {}", target.display());
                make_dir_all(&target)?;
                return Ok(false);
            }
            write_file(&target, &[])?;
            return Ok(true);
        };
        write_file(&target, contents)?;
        Ok(true)
    }

    /// Writes every record of `records`, stopping at the first error.
    ///
    /// Returns the number of files written; directories are not counted.
    pub fn consume<I, E>(&self, records: I) -> Result<usize, E>
    where
        I: IntoIterator<Item = Result<FileRecord, E>>,
        E: From<SinkError>,
    {
        let mut files = 0;
        for record in records {
            let record = record?;
            if self.write_entry(&record)? {
                files += 1;
            }
        }
        Ok(files)
    }
}

fn write_file(target: &Path, contents: &[u8]) -> Result<(), SinkError> {
    if let Some(parent) = target.parent() {
        make_dir_all(parent)?;
    }
    fs::write(target, contents).map_err(|error| SinkError::io("write file", target, error))?;
    trace_write!("{} ({} bytes)", target.display(), contents.len());
    Ok(())
}
