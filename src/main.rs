//! exitreport - exit-code classification and failure reports
//!
//! Entry point for the exitreport CLI application.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use exitreport::{app, cli::Cli, config::Settings, logging::init_logging, runner::run_reported};

fn main() -> ExitCode {
    // Parse command-line arguments
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    // A broken config still gets reported with the command-line settings
    let (mut settings, load_error) = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => (settings, None),
        Err(err) => (Settings::default(), Some(err)),
    };
    settings.merge_report_args(&cli.reporting);

    let reporter = app::self_reporter();
    let code = run_reported(&reporter, &settings, || {
        if let Some(err) = load_error {
            return Err(err.into());
        }
        app::run_app(&cli, &settings, &mut io::stdout().lock())
    });

    ExitCode::from(code)
}
