//! Top-of-program glue: run a fallible entry point, classify its failure,
//! and write the configured report.
//!
//! # Example
//!
//! ```no_run
//! use exitreport::config::Settings;
//! use exitreport::reporter::ExceptionsReporter;
//! use exitreport::runner::run_reported;
//! use exitreport::taxonomy::OS_ERROR;
//!
//! fn main() -> std::process::ExitCode {
//!     let reporter = ExceptionsReporter::new([(&OS_ERROR, 74)]);
//!     let settings = Settings::load(None).unwrap_or_default();
//!     let code = run_reported(&reporter, &settings, || {
//!         std::fs::read_to_string("/etc/tool.toml")?;
//!         Ok(0)
//!     });
//!     std::process::ExitCode::from(code)
//! }
//! ```

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};

use crate::config::Settings;
use crate::level::ReportLevel;
use crate::reporter::{ExceptionsReporter, ReportOptions};
use crate::taxonomy::Classify;

/// Write a report, logging sink failures instead of returning them.
///
/// Meant for the failure path, where the exit code must be produced even
/// if the report cannot be written.
pub fn safe_report<E, W>(
    reporter: &ExceptionsReporter,
    level: ReportLevel,
    error: &E,
    sink: &mut W,
    options: &ReportOptions,
) where
    E: Classify + fmt::Display + ?Sized,
    W: Write + ?Sized,
{
    let result = reporter
        .report_error(level, error, None, sink, options)
        .and_then(|()| sink.flush());
    if let Err(err) = result {
        log::error!("Unable to write exceptions report: {}", err);
    }
}

/// Run `f` and turn its outcome into a process exit status.
///
/// `Ok(code)` passes through. On `Err` the error chain is logged, the exit
/// code is resolved with `reporter`, and a report is written to
/// `settings.report_file` when one is configured.
pub fn run_reported<F>(reporter: &ExceptionsReporter, settings: &Settings, f: F) -> u8
where
    F: FnOnce() -> anyhow::Result<u8>,
{
    match f() {
        Ok(code) => code,
        Err(err) => handle_failure(reporter, settings, &err),
    }
}

/// Classify, log and report a top-level failure; returns its exit code.
pub fn handle_failure(
    reporter: &ExceptionsReporter,
    settings: &Settings,
    err: &anyhow::Error,
) -> u8 {
    log::error!("{:#}", err);
    let code = reporter.exit_code_for(err);

    if let Some(path) = &settings.report_file {
        match File::create(path) {
            Ok(file) => {
                let mut writer = BufWriter::new(file);
                safe_report(
                    reporter,
                    settings.report_level,
                    &FullChain(err),
                    &mut writer,
                    &settings.report_options(),
                );
            }
            Err(io_err) => {
                log::error!(
                    "Unable to create exceptions report file {}: {}",
                    path.display(),
                    io_err
                );
            }
        }
    }

    code
}

/// Shows the whole context chain as the report message, classified by the
/// first recognised cause.
struct FullChain<'a>(&'a anyhow::Error);

impl fmt::Display for FullChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.0)
    }
}

impl Classify for FullChain<'_> {
    fn exception_type(&self) -> &'static crate::taxonomy::ExceptionType {
        self.0.exception_type()
    }
}
