//! Command-line interface definitions for exitreport.
//!
//! This module defines the `exitreport` binary's arguments using the clap
//! derive API, plus [`ReportArgs`], the reporter flags any tool can flatten
//! into its own CLI.
//!
//! # Example
//!
//! ```bash
//! # Which exit code does a FileNotFoundError map to?
//! exitreport exit-code FileNotFoundError --register OSError=74 --register FileNotFoundError=66
//!
//! # Emit a MESSAGE-level record, truncated to 40 characters
//! exitreport report OSError "disk quota exceeded on /data" --max-message-len 40
//!
//! # List level names
//! exitreport levels
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::level::ReportLevel;
use crate::reporter::{parse_registration, Registration, TargetEncoding};

/// Exit-code classification and structured failure reports.
///
/// Resolves exception types to process exit codes and writes one-line JSON
/// failure records for automation to read.
#[derive(Debug, Parser)]
#[command(name = "exitreport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a TOML config file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Reporting of exitreport's own failures
    #[command(flatten)]
    pub reporting: ReportArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Reporter flags for a tool's top-level failure handling.
///
/// Flatten into a clap `Parser` and pass to
/// [`Settings::merge_report_args`](crate::config::Settings::merge_report_args).
#[derive(Debug, Clone, Default, Args)]
pub struct ReportArgs {
    /// Write a JSON failure report to this file when the tool fails
    #[arg(
        long,
        value_name = "PATH",
        env = "EXCEPTIONS_REPORTER_FILE",
        global = true
    )]
    pub exceptions_reporter_file: Option<PathBuf>,

    /// Detail of the failure report (EXIT_CODE, TYPE or MESSAGE)
    #[arg(
        long,
        value_name = "LEVEL",
        env = "EXCEPTIONS_REPORT_LEVEL",
        global = true
    )]
    pub exceptions_report_level: Option<ReportLevel>,

    /// Truncate the report message to this many characters
    #[arg(
        long,
        value_name = "N",
        env = "EXCEPTIONS_REPORT_MAX_MESSAGE_LEN",
        global = true
    )]
    pub exceptions_report_max_message_len: Option<usize>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the report level names
    Levels,
    /// Print the built-in exception type hierarchy
    Types,
    /// Resolve the exit code for an exception type and exit with it
    ExitCode(ExitCodeArgs),
    /// Write one failure report record
    Report(ReportCommandArgs),
    /// Print the effective configuration as TOML
    Config,
}

/// Arguments for the exit-code subcommand.
#[derive(Debug, Args)]
pub struct ExitCodeArgs {
    /// Exception type name (e.g. FileNotFoundError)
    #[arg(value_name = "TYPE")]
    pub exception_type: String,

    /// Registration as TYPE=CODE (repeatable; replaces configured registrations)
    #[arg(short, long = "register", value_name = "TYPE=CODE", value_parser = parse_registration)]
    pub registrations: Vec<Registration>,
}

/// Arguments for the report subcommand.
#[derive(Debug, Args)]
pub struct ReportCommandArgs {
    /// Exception type name (e.g. PermissionError)
    #[arg(value_name = "TYPE")]
    pub exception_type: String,

    /// Failure message
    #[arg(value_name = "MESSAGE", default_value = "")]
    pub message: String,

    /// Report level (defaults to the configured level)
    #[arg(short, long, value_name = "LEVEL")]
    pub level: Option<ReportLevel>,

    /// Truncate the message to this many characters
    #[arg(long, value_name = "N")]
    pub max_message_len: Option<usize>,

    /// Encoding of the output (defaults to the configured encoding)
    #[arg(long, value_enum)]
    pub encoding: Option<EncodingArg>,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Output encoding choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EncodingArg {
    /// 7-bit ASCII
    Ascii,
    /// ISO-8859-1
    Latin1,
    /// UTF-8 (no substitution)
    Utf8,
}

impl From<EncodingArg> for TargetEncoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Ascii => TargetEncoding::Ascii,
            EncodingArg::Latin1 => TargetEncoding::Latin1,
            EncodingArg::Utf8 => TargetEncoding::Utf8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{FILE_NOT_FOUND_ERROR, OS_ERROR};

    #[test]
    fn test_cli_parse_help() {
        let result = Cli::try_parse_from(["exitreport", "--help"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_levels() {
        let cli = Cli::try_parse_from(["exitreport", "levels"]).unwrap();
        assert!(matches!(cli.command, Commands::Levels));
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_parse_exit_code_registrations() {
        let cli = Cli::try_parse_from([
            "exitreport",
            "exit-code",
            "FileNotFoundError",
            "--register",
            "OSError=74",
            "-r",
            "FileNotFoundError=66",
        ])
        .unwrap();
        match cli.command {
            Commands::ExitCode(args) => {
                assert_eq!(args.exception_type, "FileNotFoundError");
                assert_eq!(
                    args.registrations,
                    vec![(&OS_ERROR, 74), (&FILE_NOT_FOUND_ERROR, 66)]
                );
            }
            _ => panic!("Expected ExitCode command"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_registration() {
        let result =
            Cli::try_parse_from(["exitreport", "exit-code", "OSError", "--register", "OSError"]);
        assert!(result.is_err());
        let result = Cli::try_parse_from([
            "exitreport",
            "exit-code",
            "OSError",
            "--register",
            "OSErr=3",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_report() {
        let cli = Cli::try_parse_from([
            "exitreport",
            "report",
            "PermissionError",
            "denied",
            "--level",
            "TYPE",
            "--max-message-len",
            "8",
            "--encoding",
            "latin1",
        ])
        .unwrap();
        match cli.command {
            Commands::Report(args) => {
                assert_eq!(args.exception_type, "PermissionError");
                assert_eq!(args.message, "denied");
                assert_eq!(args.level, Some(ReportLevel::Type));
                assert_eq!(args.max_message_len, Some(8));
                assert_eq!(args.encoding, Some(EncodingArg::Latin1));
                assert_eq!(args.output, None);
            }
            _ => panic!("Expected Report command"),
        }
    }

    #[test]
    fn test_cli_report_level_is_case_sensitive() {
        let result = Cli::try_parse_from(["exitreport", "report", "OSError", "-l", "type"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_global_report_flags() {
        let cli = Cli::try_parse_from([
            "exitreport",
            "levels",
            "--exceptions-reporter-file",
            "/tmp/failure.json",
            "--exceptions-report-level",
            "EXIT_CODE",
        ])
        .unwrap();
        assert_eq!(
            cli.reporting.exceptions_reporter_file,
            Some(PathBuf::from("/tmp/failure.json"))
        );
        assert_eq!(
            cli.reporting.exceptions_report_level,
            Some(ReportLevel::ExitCode)
        );
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["exitreport", "-v", "-q", "levels"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_encoding_arg_conversion() {
        assert_eq!(TargetEncoding::from(EncodingArg::Utf8), TargetEncoding::Utf8);
        assert_eq!(
            TargetEncoding::from(EncodingArg::Ascii),
            TargetEncoding::Ascii
        );
    }
}
