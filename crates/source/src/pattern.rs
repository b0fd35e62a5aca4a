use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::{SourceError, SourceErrorKind};

const GLOB_META: [char; 4] = ['*', '?', '[', '{'];

/// Compiled include/exclude matchers plus the directories traversal starts at.
#[derive(Debug)]
pub(crate) struct PatternSet {
    include: GlobSet,
    exclude: GlobSet,
    roots: Vec<PathBuf>,
    followed: Vec<PathBuf>,
    default_base: PathBuf,
}

impl PatternSet {
    pub(crate) fn compile(patterns: &[String]) -> Result<Self, SourceError> {
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();
        let mut roots: Vec<PathBuf> = Vec::new();
        let mut followed: Vec<PathBuf> = Vec::new();
        let mut default_base = None;

        for raw in patterns {
            let (negated, text) = match raw.strip_prefix('!') {
                Some(rest) => (true, strip_current_dir(rest)),
                None => (false, strip_current_dir(raw)),
            };
            let glob = GlobBuilder::new(text)
                .literal_separator(true)
                .build()
                .map_err(|error| SourceError::pattern(text.to_owned(), error))?;

            if negated {
                exclude.add(glob);
                continue;
            }
            include.add(glob);

            let (prefix, has_glob) = literal_prefix(text);
            if default_base.is_none() {
                default_base = Some(if has_glob {
                    prefix.clone()
                } else {
                    prefix.parent().map(Path::to_path_buf).unwrap_or_default()
                });
            }
            if has_glob && !followed.contains(&prefix) {
                followed.push(prefix.clone());
            }
            if !roots.iter().any(|root| prefix.starts_with(root)) {
                roots.push(prefix);
            }
        }

        let Some(default_base) = default_base else {
            return Err(SourceError::new(SourceErrorKind::NoPositivePattern));
        };

        Ok(Self {
            include: include
                .build()
                .map_err(|error| SourceError::pattern(patterns.join(", "), error))?,
            exclude: exclude
                .build()
                .map_err(|error| SourceError::pattern(patterns.join(", "), error))?,
            roots,
            followed,
            default_base,
        })
    }

    /// Whether a working-directory-relative path is selected.
    pub(crate) fn matches(&self, relative: &Path) -> bool {
        self.include.is_match(relative) && !self.exclude.is_match(relative)
    }

    /// Literal prefixes of the positive patterns, outermost first.
    pub(crate) fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Whether a symlinked directory at `relative` is traversed. Only the
    /// literal prefix of a wildcard pattern is; links found below it are
    /// leaves.
    pub(crate) fn follows_link(&self, relative: &Path) -> bool {
        self.followed.iter().any(|prefix| prefix == relative)
    }

    /// Base implied by the first positive pattern.
    pub(crate) fn default_base(&self) -> &Path {
        &self.default_base
    }
}

fn strip_current_dir(mut pattern: &str) -> &str {
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest;
    }
    pattern
}

/// Splits off the wildcard-free leading components of `pattern`.
fn literal_prefix(pattern: &str) -> (PathBuf, bool) {
    let mut prefix = PathBuf::new();
    for component in pattern.split('/') {
        if component.contains(GLOB_META) {
            return (prefix, true);
        }
        if !component.is_empty() {
            prefix.push(component);
        }
    }
    (prefix, false)
}
