use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Build variant a task set is resolved for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Mode {
    /// Development build, typically linking sources instead of copying.
    Development,
    /// Production build.
    Production,
}

impl Mode {
    /// All modes, in declaration order.
    pub const ALL: [Self; 2] = [Self::Development, Self::Production];

    /// Short name used in task names and manifests.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "dev",
            Self::Production => "prod",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a mode name is not recognised.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown mode '{0}' (expected dev, development, prod, or production)")]
pub struct ParseModeError(String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Development),
            "prod" | "production" => Ok(Self::Production),
            _ => Err(ParseModeError(value.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_names() {
        assert_eq!("dev".parse(), Ok(Mode::Development));
        assert_eq!("Development".parse(), Ok(Mode::Development));
        assert_eq!("PROD".parse(), Ok(Mode::Production));
        assert_eq!("production".parse(), Ok(Mode::Production));
    }

    #[test]
    fn rejects_unknown_names() {
        let error = "staging".parse::<Mode>().unwrap_err();
        assert!(error.to_string().contains("'staging'"));
    }

    #[test]
    fn displays_short_names() {
        assert_eq!(Mode::Development.to_string(), "dev");
        assert_eq!(Mode::Production.to_string(), "prod");
    }
}
