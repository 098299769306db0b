//! Error types for exitreport.
//!
//! Classification itself never fails: an unregistered exception type resolves
//! to [`DEFAULT_EXIT_CODE`](crate::reporter::DEFAULT_EXIT_CODE), and report
//! sinks return their own [`std::io::Error`] untouched. The errors here cover
//! parsing user input (level names, type names, registrations) and loading
//! configuration.

use std::fmt;

use thiserror::Error;

use crate::level::ReportLevel;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Find the candidate closest to `input`, if any is close enough.
pub(crate) fn closest_match<'a, I>(input: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .map(|candidate| (candidate, strsim::jaro_winkler(input, candidate)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}

/// Renders ", did you mean 'X'?" or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Suggestion(Option<&'static str>);

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(name) => write!(f, ", did you mean '{name}'?"),
            None => Ok(()),
        }
    }
}

/// A report level name that matches none of the variants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown report level '{name}'{suggestion}")]
pub struct UnknownReportLevel {
    name: String,
    suggestion: Suggestion,
}

impl UnknownReportLevel {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            suggestion: Suggestion(closest_match(
                name,
                ReportLevel::get_names().iter().copied(),
            )),
        }
    }

    /// The name that failed to match.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The closest valid level name, if one is similar enough.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        self.suggestion.0
    }
}

/// An exception type name missing from the built-in taxonomy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown exception type '{name}'{suggestion}")]
pub struct UnknownExceptionType {
    name: String,
    suggestion: Suggestion,
}

impl UnknownExceptionType {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            suggestion: Suggestion(closest_match(name, crate::taxonomy::names())),
        }
    }

    /// The name that failed to match.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The closest built-in type name, if one is similar enough.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        self.suggestion.0
    }
}

/// Errors parsing a `TYPE=CODE` registration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationParseError {
    /// The `=` separator is missing.
    #[error("registration '{0}' must have the form TYPE=CODE")]
    MissingSeparator(String),

    /// The type name is not in the taxonomy.
    #[error(transparent)]
    UnknownType(#[from] UnknownExceptionType),

    /// The exit code is not an integer in 0..=255.
    #[error("invalid exit code '{code}' for {type_name}: expected an integer in 0..=255")]
    InvalidCode {
        /// Type name on the left of the `=`.
        type_name: String,
        /// Text on the right of the `=`.
        code: String,
    },
}

/// Errors loading layered configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A layer failed to parse or extract.
    #[error("failed to load configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    FileNotFound(std::path::PathBuf),

    /// A configured registration names an unknown type.
    #[error("invalid registration in configuration: {0}")]
    Registration(#[from] RegistrationParseError),

    /// Rendering the effective settings failed.
    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Extract(Box::new(err))
    }
}
