//! exitreport - exit-code classification and structured failure reports
//!
//! When a command-line tool dies on an unhandled error, exitreport decides
//! the process exit code from the error's place in an exception hierarchy
//! and writes a one-line JSON record describing the failure, at a chosen
//! level of detail and safe for the sink's text encoding.
//!
//! # Example
//!
//! ```
//! use exitreport::level::ReportLevel;
//! use exitreport::reporter::{ExceptionsReporter, ReportOptions};
//! use exitreport::taxonomy::{FILE_NOT_FOUND_ERROR, OS_ERROR};
//!
//! let reporter = ExceptionsReporter::new([(&OS_ERROR, 74), (&FILE_NOT_FOUND_ERROR, 66)]);
//! let err = std::io::Error::new(std::io::ErrorKind::NotFound, "model.bin");
//!
//! assert_eq!(reporter.exit_code_for(&err), 66);
//!
//! let mut out = Vec::new();
//! reporter
//!     .report_error(ReportLevel::Type, &err, None, &mut out, &ReportOptions::default())
//!     .unwrap();
//! assert_eq!(out, b"{\"type\":\"FileNotFoundError\"}\n");
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod level;
pub mod logging;
pub mod reporter;
pub mod runner;
pub mod taxonomy;

pub use level::ReportLevel;
pub use reporter::{ExceptionsReporter, ReportOptions, DEFAULT_EXIT_CODE};
pub use taxonomy::{Classify, ExceptionType};
