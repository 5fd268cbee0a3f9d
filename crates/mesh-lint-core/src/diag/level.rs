//! Diagnostic levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Level of a diagnostic message.
///
/// The discriminants are part of the output contract. Sorting and threshold
/// filtering compare [`Level::ordinal`] values, which puts `Error` (3) ahead
/// of `Warning` (8) and `Info` (12), with `Unknown` (0) first of all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Level {
    /// Level of a message whose type could not be determined.
    Unknown = 0,
    /// Configuration is broken and must be fixed.
    Error = 3,
    /// Configuration is probably wrong.
    Warning = 8,
    /// Informational message.
    Info = 12,
}

impl Level {
    /// Returns the numeric encoding used for ordering and filtering.
    #[must_use]
    pub fn ordinal(self) -> i32 {
        self as i32
    }

    /// Returns every level, in no particular order.
    #[must_use]
    pub fn all() -> [Level; 4] {
        [Self::Info, Self::Warning, Self::Error, Self::Unknown]
    }

    /// Returns the display name of this level.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Info => "Info",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown level `{0}`, expected one of: info, warning, error, unknown")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

impl TryFrom<String> for Level {
    type Error = ParseLevelError;

    fn try_from(value: String) -> Result<Self, ParseLevelError> {
        value.parse()
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_match_wire_encoding() {
        assert_eq!(Level::Unknown.ordinal(), 0);
        assert_eq!(Level::Error.ordinal(), 3);
        assert_eq!(Level::Warning.ordinal(), 8);
        assert_eq!(Level::Info.ordinal(), 12);
    }

    #[test]
    fn error_is_numerically_smallest_real_level() {
        assert!(Level::Error.ordinal() < Level::Warning.ordinal());
        assert!(Level::Warning.ordinal() < Level::Info.ordinal());
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("ERROR".parse::<Level>(), Ok(Level::Error));
        assert_eq!("warning".parse::<Level>(), Ok(Level::Warning));
        assert_eq!(" Info ".parse::<Level>(), Ok(Level::Info));
        assert!("critical".parse::<Level>().is_err());
    }

    #[test]
    fn every_level_round_trips_through_its_name() {
        for level in Level::all() {
            assert_eq!(level.as_str().parse::<Level>(), Ok(level));
        }
    }
}
