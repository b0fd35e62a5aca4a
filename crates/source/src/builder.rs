use std::env;
use std::path::PathBuf;

use crate::error::SourceError;
use crate::pattern::PatternSet;
use crate::walker::Source;

/// Configures a file source over a set of glob patterns.
///
/// Patterns are matched against paths relative to the working directory. A
/// pattern prefixed with `!` removes matches instead of adding them; at least
/// one non-negated pattern is required.
#[derive(Clone, Debug)]
pub struct SourceBuilder {
    patterns: Vec<String>,
    cwd: Option<PathBuf>,
    base: Option<PathBuf>,
    allow_empty: bool,
    read_contents: bool,
}

impl SourceBuilder {
    /// Creates a builder for the provided patterns.
    #[must_use]
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            cwd: None,
            base: None,
            allow_empty: false,
            read_contents: true,
        }
    }

    /// Sets the working directory. Defaults to the process working directory.
    #[must_use]
    pub fn cwd<P: Into<PathBuf>>(mut self, cwd: P) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Sets the base that record relative paths are computed against.
    ///
    /// Relative bases are resolved against the working directory. Without an
    /// explicit base, the wildcard-free prefix of the first positive pattern
    /// is used.
    #[must_use]
    pub fn base<P: Into<PathBuf>>(mut self, base: P) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Controls whether a pattern list that matches nothing is an error.
    #[must_use]
    pub const fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    /// Controls whether regular file contents are loaded into records.
    #[must_use]
    pub const fn read_contents(mut self, read: bool) -> Self {
        self.read_contents = read;
        self
    }

    /// Compiles the patterns and returns the record iterator.
    pub fn build(self) -> Result<Source, SourceError> {
        let cwd = match self.cwd {
            Some(cwd) if cwd.is_absolute() => cwd,
            Some(cwd) => env::current_dir().map_err(SourceError::current_dir)?.join(cwd),
            None => env::current_dir().map_err(SourceError::current_dir)?,
        };
        let patterns = PatternSet::compile(&self.patterns)?;
        Ok(Source::new(
            record::normalize(&cwd),
            self.base,
            patterns,
            self.patterns,
            self.read_contents,
            self.allow_empty,
        ))
    }
}
