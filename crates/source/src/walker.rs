use std::collections::HashSet;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use logging::trace_source;
use record::FileRecord;

use crate::error::{SourceError, SourceErrorKind};
use crate::pattern::PatternSet;

/// Depth-first iterator over the records selected by a pattern list.
pub struct Source {
    cwd: PathBuf,
    base: PathBuf,
    patterns: PatternSet,
    raw_patterns: Vec<String>,
    roots: VecDeque<PathBuf>,
    stack: Vec<DirectoryState>,
    seen: HashSet<PathBuf>,
    read_contents: bool,
    allow_empty: bool,
    yielded: usize,
    finished: bool,
}

impl Source {
    pub(crate) fn new(
        cwd: PathBuf,
        base: Option<PathBuf>,
        patterns: PatternSet,
        raw_patterns: Vec<String>,
        read_contents: bool,
        allow_empty: bool,
    ) -> Self {
        let base = match base {
            Some(base) if base.is_absolute() => base,
            Some(base) => cwd.join(base),
            None => cwd.join(patterns.default_base()),
        };
        let roots = patterns.roots().iter().cloned().collect();
        trace_source!("enumerating {:?} under {}", raw_patterns, cwd.display());

        Self {
            cwd,
            base: record::normalize(&base),
            patterns,
            raw_patterns,
            roots,
            stack: Vec::new(),
            seen: HashSet::new(),
            read_contents,
            allow_empty,
            yielded: 0,
            finished: false,
        }
    }

    /// Working directory patterns are resolved against.
    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Base that yielded records compute their relative path against.
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Inspects one working-directory-relative path, scheduling directories
    /// for traversal and returning a record when the path is selected.
    fn visit(&mut self, relative: PathBuf, is_root: bool) -> Result<Option<FileRecord>, SourceError> {
        let full_path = self.cwd.join(&relative);
        let metadata = match fs::symlink_metadata(&full_path) {
            Ok(metadata) => metadata,
            Err(error) if is_root && error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(SourceError::metadata(full_path, error)),
        };

        let is_symlink = metadata.file_type().is_symlink();
        let mut is_directory = if is_symlink { None } else { Some(metadata.is_dir()) };

        if is_symlink && self.patterns.follows_link(&relative) {
            is_directory = Some(target_is_dir(&full_path)?);
        }
        if is_directory == Some(true) {
            let state = DirectoryState::new(full_path.clone(), relative.clone())?;
            self.stack.push(state);
        }

        if !self.patterns.matches(&relative) || !self.seen.insert(relative.clone()) {
            return Ok(None);
        }
        trace_source!("matched {}", relative.display());

        let is_directory = match is_directory {
            Some(is_directory) => is_directory,
            None => target_is_dir(&full_path)?,
        };

        let path = record::normalize(&full_path);
        let mut record = FileRecord::new(self.cwd.clone(), self.base.clone(), path)
            .map_err(|error| SourceError::metadata(full_path.clone(), io::Error::other(error)))?;
        if self.read_contents && !is_directory {
            let contents =
                fs::read(&full_path).map_err(|error| SourceError::read(full_path, error))?;
            record.set_contents(contents);
        }
        Ok(Some(record))
    }

    fn fail(&mut self, error: SourceError) -> Option<Result<FileRecord, SourceError>> {
        self.finished = true;
        Some(Err(error))
    }
}

impl Iterator for Source {
    type Item = Result<FileRecord, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }

            let step = if let Some(state) = self.stack.last_mut() {
                match state.next_name() {
                    Some(name) => {
                        let relative = state.relative_prefix.join(name);
                        self.visit(relative, false)
                    }
                    None => {
                        self.stack.pop();
                        continue;
                    }
                }
            } else if let Some(root) = self.roots.pop_front() {
                self.visit(root, true)
            } else {
                self.finished = true;
                if self.yielded == 0 && !self.allow_empty {
                    return Some(Err(SourceError::new(SourceErrorKind::NoMatch {
                        patterns: self.raw_patterns.clone(),
                    })));
                }
                return None;
            };

            match step {
                Ok(Some(record)) => {
                    self.yielded += 1;
                    return Some(Ok(record));
                }
                Ok(None) => {}
                Err(error) => return self.fail(error),
            }
        }
    }
}

fn target_is_dir(path: &Path) -> Result<bool, SourceError> {
    fs::metadata(path)
        .map(|metadata| metadata.is_dir())
        .map_err(|error| SourceError::metadata(path.to_path_buf(), error))
}

#[derive(Clone, Debug)]
struct DirectoryState {
    relative_prefix: PathBuf,
    entries: Vec<OsString>,
    index: usize,
}

impl DirectoryState {
    fn new(fs_path: PathBuf, relative_prefix: PathBuf) -> Result<Self, SourceError> {
        let mut entries = Vec::new();
        let read_dir =
            fs::read_dir(&fs_path).map_err(|error| SourceError::read_dir(fs_path.clone(), error))?;
        for entry in read_dir {
            let entry =
                entry.map_err(|error| SourceError::read_dir_entry(fs_path.clone(), error))?;
            entries.push(entry.file_name());
        }
        entries.sort();

        Ok(Self {
            relative_prefix,
            entries,
            index: 0,
        })
    }

    fn next_name(&mut self) -> Option<OsString> {
        let name = self.entries.get(self.index)?.clone();
        self.index += 1;
        Some(name)
    }
}
