//! Layered reporter settings.
//!
//! Settings are resolved in priority order (later wins):
//!
//! 1. Built-in defaults
//! 2. TOML config file (`--config`, or the platform config directory)
//! 3. `EXITREPORT_*` environment variables
//! 4. Command-line reporter flags (see [`Settings::merge_report_args`])
//!
//! # File Format
//!
//! ```toml
//! report_level = "TYPE"
//! report_file = "/tmp/failure.json"
//! max_message_len = 200
//! encoding = "latin1"
//!
//! [registrations]
//! OSError = 74
//! FileNotFoundError = 66
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::ReportArgs;
use crate::error::ConfigError;
use crate::level::ReportLevel;
use crate::reporter::{
    parse_registration_parts, ExceptionsReporter, Registration, ReportOptions, TargetEncoding,
};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "EXITREPORT_";

/// Effective reporter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Detail level of failure reports.
    pub report_level: ReportLevel,
    /// Where failure reports are written; no report when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_file: Option<PathBuf>,
    /// Message length limit in characters; unlimited when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_message_len: Option<usize>,
    /// Encoding declared for report sinks.
    pub encoding: TargetEncoding,
    /// Exception type name to exit code.
    pub registrations: BTreeMap<String, u8>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            report_level: ReportLevel::Message,
            report_file: None,
            max_message_len: None,
            encoding: TargetEncoding::Ascii,
            registrations: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load settings, using `explicit` as the config file when given.
    ///
    /// Without an explicit path the platform config file is used if it
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file is missing, a layer fails to
    /// parse, or a registration names an unknown type.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) if !path.exists() => Err(ConfigError::FileNotFound(path.to_path_buf())),
            Some(path) => Self::load_from_path(path),
            None => match Self::default_path() {
                Some(path) => Self::load_from_path(&path),
                None => Self::extract(Self::figment(None)),
            },
        }
    }

    /// Load settings from defaults, the TOML file at `path` (skipped if
    /// missing) and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a layer fails to parse or a registration names
    /// an unknown type.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("Loading settings from {}", path.display());
        Self::extract(Self::figment(Some(path)))
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let settings: Settings = figment.extract()?;
        settings.registration_list()?;
        Ok(settings)
    }

    /// The platform-specific config file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "exitreport").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line reporter flags on top of the loaded layers.
    pub fn merge_report_args(&mut self, args: &ReportArgs) {
        if let Some(path) = &args.exceptions_reporter_file {
            self.report_file = Some(path.clone());
        }
        if let Some(level) = args.exceptions_report_level {
            self.report_level = level;
        }
        if let Some(max_len) = args.exceptions_report_max_message_len {
            self.max_message_len = Some(max_len);
        }
    }

    /// Configured registrations resolved against the built-in taxonomy.
    ///
    /// # Errors
    ///
    /// Returns an error for the first name not in the taxonomy.
    pub fn registration_list(&self) -> Result<Vec<Registration>, ConfigError> {
        self.registrations
            .iter()
            .map(|(name, code)| parse_registration_parts(name, *code).map_err(ConfigError::from))
            .collect()
    }

    /// Build a reporter from the configured registrations.
    ///
    /// # Errors
    ///
    /// Returns an error if a registration names an unknown type.
    pub fn reporter(&self) -> Result<ExceptionsReporter, ConfigError> {
        Ok(ExceptionsReporter::new(self.registration_list()?))
    }

    /// Report options derived from these settings.
    #[must_use]
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            max_message_len: self.max_message_len,
            encoding: self.encoding,
        }
    }

    /// Render the effective settings as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if TOML serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{FILE_NOT_FOUND_ERROR, OS_ERROR};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.report_level, ReportLevel::Message);
        assert_eq!(settings.report_file, None);
        assert_eq!(settings.max_message_len, None);
        assert_eq!(settings.encoding, TargetEncoding::Ascii);
        assert!(settings.registrations.is_empty());
    }

    #[test]
    fn test_merge_report_args_overrides_set_fields_only() {
        let mut settings = Settings {
            max_message_len: Some(50),
            ..Settings::default()
        };
        let args = ReportArgs {
            exceptions_reporter_file: Some(PathBuf::from("/tmp/report.json")),
            exceptions_report_level: Some(ReportLevel::Type),
            exceptions_report_max_message_len: None,
        };
        settings.merge_report_args(&args);

        assert_eq!(settings.report_file, Some(PathBuf::from("/tmp/report.json")));
        assert_eq!(settings.report_level, ReportLevel::Type);
        assert_eq!(settings.max_message_len, Some(50));
    }

    #[test]
    fn test_registration_list_resolves_names() {
        let mut settings = Settings::default();
        settings.registrations.insert("OSError".into(), 74);
        settings.registrations.insert("FileNotFoundError".into(), 66);

        let reporter = settings.reporter().unwrap();
        assert_eq!(reporter.exception_exit_code(&FILE_NOT_FOUND_ERROR), 66);
        assert_eq!(reporter.exception_exit_code(&OS_ERROR), 74);
    }

    #[test]
    fn test_registration_list_rejects_unknown() {
        let mut settings = Settings::default();
        settings.registrations.insert("NoSuchError".into(), 3);
        assert!(matches!(
            settings.registration_list(),
            Err(ConfigError::Registration(_))
        ));
    }

    #[test]
    fn test_report_options() {
        let settings = Settings {
            max_message_len: Some(12),
            encoding: TargetEncoding::Utf8,
            ..Settings::default()
        };
        let options = settings.report_options();
        assert_eq!(options.max_message_len, Some(12));
        assert_eq!(options.encoding, TargetEncoding::Utf8);
    }

    #[test]
    fn test_to_toml_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut settings = Settings {
            report_level: ReportLevel::ExitCode,
            max_message_len: Some(80),
            ..Settings::default()
        };
        settings.registrations.insert("KeyError".into(), 9);

        let rendered = settings.to_toml().unwrap();
        assert!(rendered.contains("report_level = \"EXIT_CODE\""));
        assert!(rendered.contains("KeyError = 9"));

        fs::write(&path, rendered).unwrap();
        let figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(&path));
        let loaded = Settings::extract(figment).unwrap();
        assert_eq!(loaded, settings);
    }
}
