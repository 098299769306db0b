//! Exit-code resolution and failure report emission.
//!
//! An [`ExceptionsReporter`] owns an ordered table of
//! `(exception type, exit code)` registrations. It answers two independent
//! questions about a failure:
//!
//! - [`exception_exit_code`](ExceptionsReporter::exception_exit_code): which
//!   exit code the process should terminate with;
//! - [`report`](ExceptionsReporter::report): what structured record to write
//!   for automation to read.
//!
//! # Example
//!
//! ```
//! use exitreport::level::ReportLevel;
//! use exitreport::reporter::{ExceptionsReporter, ReportOptions, DEFAULT_EXIT_CODE};
//! use exitreport::taxonomy::{EXCEPTION, FILE_NOT_FOUND_ERROR, OS_ERROR, VALUE_ERROR};
//!
//! // Broad registration first: sorting keeps it from shadowing the specific one
//! let reporter = ExceptionsReporter::new([
//!     (&OS_ERROR, 20),
//!     (&FILE_NOT_FOUND_ERROR, 30),
//! ]);
//! assert_eq!(reporter.exception_exit_code(&FILE_NOT_FOUND_ERROR), 30);
//! assert_eq!(reporter.exception_exit_code(&OS_ERROR), 20);
//! assert_eq!(reporter.exception_exit_code(&VALUE_ERROR), DEFAULT_EXIT_CODE);
//!
//! let mut out = Vec::new();
//! reporter
//!     .report(
//!         ReportLevel::Message,
//!         &FILE_NOT_FOUND_ERROR,
//!         &"config.toml is missing",
//!         None,
//!         &mut out,
//!         &ReportOptions::with_max_message_len(10),
//!     )
//!     .unwrap();
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "{\"type\":\"FileNotFoundError\",\"message\":\"config....\"}\n"
//! );
//! ```

pub mod record;

use std::backtrace::Backtrace;
use std::fmt;
use std::io::{self, Write};

use crate::error::RegistrationParseError;
use crate::level::ReportLevel;
use crate::taxonomy::{self, Classify, ExceptionType};

pub use record::{ReportOptions, ReportRecord, TargetEncoding};

/// Exit code for failures with no registered ancestor type.
pub const DEFAULT_EXIT_CODE: u8 = 1;

/// One `(exception type, exit code)` registration.
pub type Registration = (&'static ExceptionType, u8);

/// Parse a `TYPE=CODE` registration against the built-in taxonomy.
///
/// # Errors
///
/// Returns an error if the separator is missing, the type is unknown, or
/// the code is not in `0..=255`.
///
/// # Example
///
/// ```
/// use exitreport::reporter::parse_registration;
/// use exitreport::taxonomy::PERMISSION_ERROR;
///
/// assert_eq!(parse_registration("PermissionError=77").unwrap(), (&PERMISSION_ERROR, 77));
/// assert!(parse_registration("PermissionError").is_err());
/// assert!(parse_registration("PermissionError=256").is_err());
/// ```
pub fn parse_registration(s: &str) -> Result<Registration, RegistrationParseError> {
    let (name, code) = s
        .split_once('=')
        .ok_or_else(|| RegistrationParseError::MissingSeparator(s.to_string()))?;
    let (name, code) = (name.trim(), code.trim());
    let code: u8 = code
        .parse()
        .map_err(|_| RegistrationParseError::InvalidCode {
            type_name: name.to_string(),
            code: code.to_string(),
        })?;
    parse_registration_parts(name, code)
}

/// Resolve a type name and exit code into a registration.
///
/// # Errors
///
/// Returns an error if the type is not in the built-in taxonomy.
pub fn parse_registration_parts(
    name: &str,
    code: u8,
) -> Result<Registration, RegistrationParseError> {
    Ok((taxonomy::by_name(name)?, code))
}

/// Classifies failures into exit codes and writes failure reports.
///
/// The registration table is sorted once, at construction, and never
/// changes afterwards; the reporter is `Send + Sync` and can be shared
/// freely.
#[derive(Debug, Clone, Default)]
pub struct ExceptionsReporter {
    registrations: Vec<Registration>,
}

impl ExceptionsReporter {
    /// Create a reporter from registrations in any order.
    ///
    /// The caller's sequence is copied and put into specificity order with
    /// [`sort_exceptions`](Self::sort_exceptions).
    pub fn new<I>(registrations: I) -> Self
    where
        I: IntoIterator<Item = Registration>,
    {
        let registrations: Vec<Registration> = registrations.into_iter().collect();
        let registrations = Self::sort_exceptions(&registrations);
        log::debug!(
            "Exceptions reporter initialized with {} registrations",
            registrations.len()
        );
        Self { registrations }
    }

    /// Order registrations from most to least specific.
    ///
    /// A subtype always comes before any of its ancestors. Entries unrelated
    /// by subtyping, including repeated registrations of one type, keep their
    /// original relative order.
    ///
    /// # Example
    ///
    /// ```
    /// use exitreport::reporter::ExceptionsReporter;
    /// use exitreport::taxonomy::{EXCEPTION, FILE_NOT_FOUND_ERROR, IO_ERROR, OS_ERROR};
    ///
    /// let sorted = ExceptionsReporter::sort_exceptions(&[
    ///     (&EXCEPTION, 10),
    ///     (IO_ERROR, 20),
    ///     (&FILE_NOT_FOUND_ERROR, 30),
    /// ]);
    /// assert_eq!(
    ///     sorted,
    ///     vec![(&FILE_NOT_FOUND_ERROR, 30), (&OS_ERROR, 20), (&EXCEPTION, 10)]
    /// );
    /// ```
    #[must_use]
    pub fn sort_exceptions(registrations: &[Registration]) -> Vec<Registration> {
        let mut remaining: Vec<Registration> = registrations.to_vec();
        let mut sorted = Vec::with_capacity(remaining.len());

        // Take the earliest entry that nothing left over is more specific than.
        // Every non-empty finite partial order has such a minimal element.
        while !remaining.is_empty() {
            let next = remaining
                .iter()
                .position(|(candidate, _)| {
                    !remaining
                        .iter()
                        .any(|(other, _)| other.is_strict_subtype_of(candidate))
                })
                .unwrap_or(0);
            sorted.push(remaining.remove(next));
        }

        log::trace!(
            "Sorted exception registrations: {:?}",
            sorted
                .iter()
                .map(|(ty, code)| format!("{}={}", ty.name(), code))
                .collect::<Vec<_>>()
        );
        sorted
    }

    /// The registration table, most specific first.
    #[must_use]
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Exit code for a failure of the given concrete type.
    ///
    /// Returns the code of the registered type closest to `exception_type`
    /// along its ancestor chain (the type itself included), or
    /// [`DEFAULT_EXIT_CODE`] when no registered type is an ancestor.
    #[must_use]
    pub fn exception_exit_code(&self, exception_type: &ExceptionType) -> u8 {
        match self
            .registrations
            .iter()
            .find(|(registered, _)| exception_type.is_subtype_of(registered))
        {
            Some((registered, code)) => {
                log::debug!(
                    "Resolved {} via {} to exit code {}",
                    exception_type,
                    registered,
                    code
                );
                *code
            }
            None => {
                log::debug!(
                    "No registration matches {}, using default exit code {}",
                    exception_type,
                    DEFAULT_EXIT_CODE
                );
                DEFAULT_EXIT_CODE
            }
        }
    }

    /// Exit code for a classified error value.
    #[must_use]
    pub fn exit_code_for<E: Classify + ?Sized>(&self, error: &E) -> u8 {
        self.exception_exit_code(error.exception_type())
    }

    /// Write one failure record to `sink`.
    ///
    /// Fields are selected by `level`; the message is rendered from
    /// `exception_value` and passed through encoding substitution and then
    /// truncation as configured in `options`. The `traceback` is accepted
    /// but not serialized.
    ///
    /// # Errors
    ///
    /// Returns the sink's own error if writing fails.
    pub fn report<W: Write + ?Sized>(
        &self,
        level: ReportLevel,
        exception_type: &ExceptionType,
        exception_value: &dyn fmt::Display,
        traceback: Option<&Backtrace>,
        sink: &mut W,
        options: &ReportOptions,
    ) -> io::Result<()> {
        if traceback.is_some() {
            log::trace!("Traceback supplied for {} is not serialized", exception_type);
        }
        let record = ReportRecord::build(level, exception_type, exception_value, options);
        record.write_to(sink, options.encoding)
    }

    /// Write one failure record for a classified error value.
    ///
    /// # Errors
    ///
    /// Returns the sink's own error if writing fails.
    pub fn report_error<E, W>(
        &self,
        level: ReportLevel,
        error: &E,
        traceback: Option<&Backtrace>,
        sink: &mut W,
        options: &ReportOptions,
    ) -> io::Result<()>
    where
        E: Classify + fmt::Display + ?Sized,
        W: Write + ?Sized,
    {
        self.report(
            level,
            error.exception_type(),
            &DisplayRef(error),
            traceback,
            sink,
            options,
        )
    }
}

/// Lets an unsized `Display` value pass as `&dyn Display`.
struct DisplayRef<'a, T: ?Sized>(&'a T);

impl<T: fmt::Display + ?Sized> fmt::Display for DisplayRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{
        EXCEPTION, FILE_NOT_FOUND_ERROR, IO_ERROR, KEY_ERROR, LOOKUP_ERROR, OS_ERROR,
        PERMISSION_ERROR, VALUE_ERROR,
    };

    static TEST1: ExceptionType = ExceptionType::new("_Test1Exception", Some(&EXCEPTION));
    static TEST2: ExceptionType = ExceptionType::new("_Test2Exception", Some(&EXCEPTION));
    static TEST3: ExceptionType = ExceptionType::new("_Test3Exception", Some(&TEST1));

    fn names(registrations: &[Registration]) -> Vec<(&'static str, u8)> {
        registrations
            .iter()
            .map(|(ty, code)| (ty.name(), *code))
            .collect()
    }

    #[test]
    fn test_sort_chain_most_specific_first() {
        let sorted = ExceptionsReporter::sort_exceptions(&[
            (&EXCEPTION, 10),
            (IO_ERROR, 20),
            (&FILE_NOT_FOUND_ERROR, 30),
        ]);
        assert_eq!(
            names(&sorted),
            vec![("FileNotFoundError", 30), ("OSError", 20), ("Exception", 10)]
        );
    }

    #[test]
    fn test_sort_keeps_unrelated_order() {
        let sorted = ExceptionsReporter::sort_exceptions(&[
            (&VALUE_ERROR, 1),
            (&KEY_ERROR, 2),
            (&PERMISSION_ERROR, 3),
        ]);
        assert_eq!(
            names(&sorted),
            vec![("ValueError", 1), ("KeyError", 2), ("PermissionError", 3)]
        );
    }

    #[test]
    fn test_sort_interleaved_hierarchies() {
        let sorted = ExceptionsReporter::sort_exceptions(&[
            (&OS_ERROR, 1),
            (&LOOKUP_ERROR, 2),
            (&FILE_NOT_FOUND_ERROR, 3),
            (&KEY_ERROR, 4),
        ]);
        // OSError waits for FileNotFoundError; LookupError waits for KeyError
        assert_eq!(
            names(&sorted),
            vec![
                ("FileNotFoundError", 3),
                ("OSError", 1),
                ("KeyError", 4),
                ("LookupError", 2)
            ]
        );
    }

    #[test]
    fn test_sort_duplicates_stay_in_order() {
        let sorted =
            ExceptionsReporter::sort_exceptions(&[(&OS_ERROR, 5), (&EXCEPTION, 1), (&OS_ERROR, 6)]);
        assert_eq!(
            names(&sorted),
            vec![("OSError", 5), ("OSError", 6), ("Exception", 1)]
        );
    }

    #[test]
    fn test_sort_does_not_touch_input() {
        let input = [(&EXCEPTION, 10), (&OS_ERROR, 20)];
        let _ = ExceptionsReporter::sort_exceptions(&input);
        assert_eq!(names(&input), vec![("Exception", 10), ("OSError", 20)]);
    }

    #[test]
    fn test_exit_code_registered_and_subtypes() {
        let reporter = ExceptionsReporter::new([(&TEST1, 110)]);
        assert_eq!(reporter.exception_exit_code(&TEST1), 110);
        assert_eq!(reporter.exception_exit_code(&TEST2), DEFAULT_EXIT_CODE);
        assert_eq!(reporter.exception_exit_code(&TEST3), 110);
    }

    #[test]
    fn test_exit_code_empty_table() {
        let reporter = ExceptionsReporter::default();
        assert_eq!(reporter.exception_exit_code(&OS_ERROR), DEFAULT_EXIT_CODE);
        assert!(reporter.registrations().is_empty());
    }

    #[test]
    fn test_exit_code_registration_order_independent() {
        let broad_first = ExceptionsReporter::new([(&OS_ERROR, 10), (&FILE_NOT_FOUND_ERROR, 20)]);
        let specific_first =
            ExceptionsReporter::new([(&FILE_NOT_FOUND_ERROR, 20), (&OS_ERROR, 10)]);
        for reporter in [broad_first, specific_first] {
            assert_eq!(reporter.exception_exit_code(&FILE_NOT_FOUND_ERROR), 20);
            assert_eq!(reporter.exception_exit_code(&PERMISSION_ERROR), 10);
        }
    }

    #[test]
    fn test_exit_code_duplicate_first_wins() {
        let reporter = ExceptionsReporter::new([(&OS_ERROR, 7), (&OS_ERROR, 8)]);
        assert_eq!(reporter.exception_exit_code(&OS_ERROR), 7);
    }

    #[test]
    fn test_exit_code_for_classified_error() {
        let reporter = ExceptionsReporter::new([(&OS_ERROR, 74), (&FILE_NOT_FOUND_ERROR, 66)]);
        let err = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(reporter.exit_code_for(&err), 66);
        let err = io::Error::new(io::ErrorKind::Other, "disk");
        assert_eq!(reporter.exit_code_for(&err), 74);
    }

    #[test]
    fn test_report_type_is_concrete_not_resolved() {
        let reporter = ExceptionsReporter::new([(&TEST1, 110)]);
        let mut out = Vec::new();
        reporter
            .report(
                ReportLevel::Type,
                &TEST3,
                &"anything",
                None,
                &mut out,
                &ReportOptions::default(),
            )
            .unwrap();
        assert_eq!(out, b"{\"type\":\"_Test3Exception\"}\n");
    }

    #[test]
    fn test_report_ignores_traceback() {
        let reporter = ExceptionsReporter::default();
        let traceback = Backtrace::capture();
        let mut out = Vec::new();
        reporter
            .report(
                ReportLevel::Message,
                &OS_ERROR,
                &"disk full",
                Some(&traceback),
                &mut out,
                &ReportOptions::default(),
            )
            .unwrap();
        assert_eq!(out, b"{\"type\":\"OSError\",\"message\":\"disk full\"}\n");
    }

    #[test]
    fn test_report_error_uses_classification() {
        let reporter = ExceptionsReporter::default();
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let mut out = Vec::new();
        reporter
            .report_error(
                ReportLevel::Message,
                &err,
                None,
                &mut out,
                &ReportOptions::default(),
            )
            .unwrap();
        assert_eq!(
            out,
            b"{\"type\":\"PermissionError\",\"message\":\"nope\"}\n"
        );
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_report_propagates_sink_error_verbatim() {
        let reporter = ExceptionsReporter::default();
        let err = reporter
            .report(
                ReportLevel::Type,
                &OS_ERROR,
                &"x",
                None,
                &mut FailingSink,
                &ReportOptions::default(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(err.to_string(), "sink closed");
    }

    #[test]
    fn test_parse_registration() {
        assert_eq!(
            parse_registration(" KeyError = 12 ").unwrap(),
            (&KEY_ERROR, 12)
        );
        assert_eq!(parse_registration("IOError=74").unwrap(), (&OS_ERROR, 74));
        assert!(matches!(
            parse_registration("KeyError:12"),
            Err(RegistrationParseError::MissingSeparator(_))
        ));
        assert!(matches!(
            parse_registration("KeyError=-1"),
            Err(RegistrationParseError::InvalidCode { .. })
        ));
        assert!(matches!(
            parse_registration("KeyErr=1"),
            Err(RegistrationParseError::UnknownType(_))
        ));
    }

    #[test]
    fn test_reporter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExceptionsReporter>();
    }
}
