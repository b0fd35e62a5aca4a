//! crates/logging/src/config.rs
//! Verbosity configuration mapped onto subscriber filter directives.

use tracing::Level;

/// Verbosity settings used when installing the subscriber.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerbosityConfig {
    /// Level applied to every `pipekit::*` target.
    pub level: LevelName,
    /// Whether the filter honours `RUST_LOG` when it is set.
    pub respect_env: bool,
}

/// Serializable mirror of [`tracing::Level`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LevelName {
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Task lifecycle lines.
    Info,
    /// Per-record diagnostics.
    Debug,
    /// Hand-off protocol details.
    Trace,
}

impl From<LevelName> for Level {
    fn from(value: LevelName) -> Self {
        match value {
            LevelName::Error => Self::ERROR,
            LevelName::Warn => Self::WARN,
            LevelName::Info => Self::INFO,
            LevelName::Debug => Self::DEBUG,
            LevelName::Trace => Self::TRACE,
        }
    }
}

impl Default for VerbosityConfig {
    fn default() -> Self {
        Self {
            level: LevelName::Info,
            respect_env: true,
        }
    }
}

impl VerbosityConfig {
    /// Create a configuration from a count of `-v` flags.
    ///
    /// `0` keeps task lifecycle lines only, `1` adds per-record diagnostics,
    /// and `2` or more enables the splice hand-off trace.
    #[must_use]
    pub fn from_verbose_level(level: u8) -> Self {
        let level = match level {
            0 => LevelName::Info,
            1 => LevelName::Debug,
            _ => LevelName::Trace,
        };
        Self {
            level,
            ..Self::default()
        }
    }

    /// Silences everything below errors.
    #[must_use]
    pub fn quiet() -> Self {
        Self {
            level: LevelName::Error,
            ..Self::default()
        }
    }

    /// Filter directive string equivalent to this configuration.
    #[must_use]
    pub fn directives(&self) -> String {
        let level = match self.level {
            LevelName::Error => "error",
            LevelName::Warn => "warn",
            LevelName::Info => "info",
            LevelName::Debug => "debug",
            LevelName::Trace => "trace",
        };
        format!("warn,pipekit={level}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_levels_escalate() {
        assert_eq!(VerbosityConfig::from_verbose_level(0).level, LevelName::Info);
        assert_eq!(VerbosityConfig::from_verbose_level(1).level, LevelName::Debug);
        assert_eq!(VerbosityConfig::from_verbose_level(5).level, LevelName::Trace);
    }

    #[test]
    fn directives_scope_level_to_workspace_targets() {
        assert_eq!(
            VerbosityConfig::from_verbose_level(1).directives(),
            "warn,pipekit=debug"
        );
        assert_eq!(VerbosityConfig::quiet().directives(), "warn,pipekit=error");
    }

    #[test]
    fn level_name_converts_to_tracing_level() {
        assert_eq!(Level::from(LevelName::Trace), Level::TRACE);
        assert_eq!(Level::from(LevelName::Warn), Level::WARN);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_serializes_lowercase_level() {
        let json = serde_json::to_string(&VerbosityConfig::default()).expect("serialize");
        assert!(json.contains("\"info\""));
        let back: VerbosityConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, VerbosityConfig::default());
    }
}
