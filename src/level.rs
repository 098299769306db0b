//! Report verbosity tiers.
//!
//! A [`ReportLevel`] decides which fields of a failure record are emitted:
//!
//! | level       | `type` | `message` |
//! |-------------|--------|-----------|
//! | `EXIT_CODE` | no     | no        |
//! | `TYPE`      | yes    | no        |
//! | `MESSAGE`   | yes    | yes       |
//!
//! Levels are looked up by their exact, case-sensitive names.
//!
//! # Example
//!
//! ```
//! use exitreport::level::ReportLevel;
//!
//! assert_eq!(ReportLevel::get_by_name("TYPE"), Some(ReportLevel::Type));
//! assert_eq!(ReportLevel::get_by_name("type"), None);
//! assert_eq!(ReportLevel::get_names(), &["EXIT_CODE", "TYPE", "MESSAGE"]);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::UnknownReportLevel;

/// Verbosity tier of a failure report, ordered from least to most detailed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ReportLevel {
    /// Empty record; only the exit code carries information.
    ExitCode,
    /// Record carries the exception type name.
    Type,
    /// Record carries the type name and the sanitized, truncated message.
    #[default]
    Message,
}

/// Static (name, variant) table, in ascending verbosity.
const LEVELS: [(&str, ReportLevel); 3] = [
    ("EXIT_CODE", ReportLevel::ExitCode),
    ("TYPE", ReportLevel::Type),
    ("MESSAGE", ReportLevel::Message),
];

static NAMES: [&str; 3] = [LEVELS[0].0, LEVELS[1].0, LEVELS[2].0];

impl ReportLevel {
    /// Look up a level by its exact name.
    ///
    /// Returns `None` when no variant is called `name`.
    #[must_use]
    pub fn get_by_name(name: &str) -> Option<Self> {
        LEVELS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, level)| *level)
    }

    /// Look up a level by its exact name, falling back to `default`.
    ///
    /// The default may itself be `None` (meaning "not found") or another
    /// level used as a fallback.
    #[must_use]
    pub fn get_by_name_or(name: &str, default: Option<Self>) -> Option<Self> {
        Self::get_by_name(name).or(default)
    }

    /// All level names, least detailed first.
    #[must_use]
    pub fn get_names() -> &'static [&'static str] {
        &NAMES
    }

    /// The canonical name of this level.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ExitCode => "EXIT_CODE",
            Self::Type => "TYPE",
            Self::Message => "MESSAGE",
        }
    }

    /// Whether records at this level carry the `type` field.
    #[must_use]
    pub fn includes_type(self) -> bool {
        self >= Self::Type
    }

    /// Whether records at this level carry the `message` field.
    #[must_use]
    pub fn includes_message(self) -> bool {
        self == Self::Message
    }
}

impl fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportLevel {
    type Err = UnknownReportLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::get_by_name(s).ok_or_else(|| UnknownReportLevel::new(s))
    }
}

impl Serialize for ReportLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ReportLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
