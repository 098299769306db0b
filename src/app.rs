//! Subcommand handlers for the exitreport binary.

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};

use crate::cli::{Cli, Commands, ExitCodeArgs, ReportCommandArgs};
use crate::config::Settings;
use crate::level::ReportLevel;
use crate::reporter::{ExceptionsReporter, ReportOptions};
use crate::taxonomy::{self, FILE_NOT_FOUND_ERROR, KEY_ERROR, OS_ERROR, VALUE_ERROR};

/// Exit code for invalid command-line input.
pub const USAGE_EXIT_CODE: u8 = 64;
/// Exit code for a missing input file.
pub const NO_INPUT_EXIT_CODE: u8 = 66;
/// Exit code for other I/O failures.
pub const IO_EXIT_CODE: u8 = 74;

/// Reporter for exitreport's own failures (sysexits-style codes).
#[must_use]
pub fn self_reporter() -> ExceptionsReporter {
    ExceptionsReporter::new([
        (&OS_ERROR, IO_EXIT_CODE),
        (&FILE_NOT_FOUND_ERROR, NO_INPUT_EXIT_CODE),
        (&VALUE_ERROR, USAGE_EXIT_CODE),
        (&KEY_ERROR, USAGE_EXIT_CODE),
    ])
}

/// Run the parsed command, writing normal output to `out`.
///
/// Returns the process exit code on success: 0 for most commands, the
/// resolved code for `exit-code`.
///
/// # Errors
///
/// Returns an error for unknown type names, invalid configured
/// registrations, or output failures.
pub fn run_app<W: Write + ?Sized>(cli: &Cli, settings: &Settings, out: &mut W) -> Result<u8> {
    match &cli.command {
        Commands::Levels => {
            for name in ReportLevel::get_names() {
                writeln!(out, "{name}")?;
            }
            Ok(0)
        }
        Commands::Types => {
            for ty in taxonomy::builtins() {
                writeln!(out, "{:indent$}{}", "", ty.name(), indent = ty.depth() * 2)?;
            }
            Ok(0)
        }
        Commands::ExitCode(args) => run_exit_code(args, settings, out),
        Commands::Report(args) => run_report(args, settings, out),
        Commands::Config => {
            out.write_all(settings.to_toml()?.as_bytes())?;
            Ok(0)
        }
    }
}

fn run_exit_code<W: Write + ?Sized>(
    args: &ExitCodeArgs,
    settings: &Settings,
    out: &mut W,
) -> Result<u8> {
    let exception_type = taxonomy::by_name(&args.exception_type)?;
    let reporter = if args.registrations.is_empty() {
        settings.reporter()?
    } else {
        ExceptionsReporter::new(args.registrations.iter().copied())
    };

    let code = reporter.exception_exit_code(exception_type);
    writeln!(out, "{code}")?;
    Ok(code)
}

fn run_report<W: Write + ?Sized>(
    args: &ReportCommandArgs,
    settings: &Settings,
    out: &mut W,
) -> Result<u8> {
    let exception_type = taxonomy::by_name(&args.exception_type)?;
    let level = args.level.unwrap_or(settings.report_level);
    let options = ReportOptions {
        max_message_len: args.max_message_len.or(settings.max_message_len),
        encoding: args.encoding.map_or(settings.encoding, Into::into),
    };
    let reporter = settings.reporter()?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create report file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            reporter.report(level, exception_type, &args.message, None, &mut writer, &options)?;
            writer.flush()?;
            log::debug!("Wrote {} report to {}", level, path.display());
        }
        None => {
            reporter.report(level, exception_type, &args.message, None, out, &options)?;
        }
    }
    Ok(0)
}
