//! Mapping Rust error values onto the exception hierarchy.

use std::io::{self, ErrorKind};

use super::{
    ExceptionType, BROKEN_PIPE_ERROR, CONNECTION_ABORTED_ERROR, CONNECTION_REFUSED_ERROR,
    CONNECTION_RESET_ERROR, EXCEPTION, FILE_EXISTS_ERROR, FILE_NOT_FOUND_ERROR,
    INTERRUPTED_ERROR, JSON_DECODE_ERROR, KEY_ERROR, NOT_IMPLEMENTED_ERROR, OS_ERROR,
    PERMISSION_ERROR, TIMEOUT_ERROR, UNICODE_ERROR, VALUE_ERROR,
};
use crate::error::{ConfigError, RegistrationParseError, UnknownExceptionType, UnknownReportLevel};

/// An error value that knows its place in the exception hierarchy.
///
/// Implement this for a tool's own error enums to route them through
/// [`ExceptionsReporter`](crate::reporter::ExceptionsReporter).
pub trait Classify {
    /// The concrete exception type of this value.
    fn exception_type(&self) -> &'static ExceptionType;
}

impl<T: Classify + ?Sized> Classify for &T {
    fn exception_type(&self) -> &'static ExceptionType {
        (**self).exception_type()
    }
}

impl Classify for io::Error {
    fn exception_type(&self) -> &'static ExceptionType {
        match self.kind() {
            ErrorKind::NotFound => &FILE_NOT_FOUND_ERROR,
            ErrorKind::PermissionDenied => &PERMISSION_ERROR,
            ErrorKind::AlreadyExists => &FILE_EXISTS_ERROR,
            ErrorKind::TimedOut => &TIMEOUT_ERROR,
            ErrorKind::Interrupted => &INTERRUPTED_ERROR,
            ErrorKind::BrokenPipe => &BROKEN_PIPE_ERROR,
            ErrorKind::ConnectionRefused => &CONNECTION_REFUSED_ERROR,
            ErrorKind::ConnectionReset => &CONNECTION_RESET_ERROR,
            ErrorKind::ConnectionAborted => &CONNECTION_ABORTED_ERROR,
            ErrorKind::InvalidData | ErrorKind::InvalidInput => &VALUE_ERROR,
            ErrorKind::Unsupported => &NOT_IMPLEMENTED_ERROR,
            _ => &OS_ERROR,
        }
    }
}

impl Classify for serde_json::Error {
    fn exception_type(&self) -> &'static ExceptionType {
        if self.is_io() {
            &OS_ERROR
        } else {
            &JSON_DECODE_ERROR
        }
    }
}

impl Classify for std::num::ParseIntError {
    fn exception_type(&self) -> &'static ExceptionType {
        &VALUE_ERROR
    }
}

impl Classify for std::num::ParseFloatError {
    fn exception_type(&self) -> &'static ExceptionType {
        &VALUE_ERROR
    }
}

impl Classify for std::str::Utf8Error {
    fn exception_type(&self) -> &'static ExceptionType {
        &UNICODE_ERROR
    }
}

impl Classify for std::string::FromUtf8Error {
    fn exception_type(&self) -> &'static ExceptionType {
        &UNICODE_ERROR
    }
}

impl Classify for UnknownReportLevel {
    fn exception_type(&self) -> &'static ExceptionType {
        &KEY_ERROR
    }
}

impl Classify for UnknownExceptionType {
    fn exception_type(&self) -> &'static ExceptionType {
        &KEY_ERROR
    }
}

impl Classify for RegistrationParseError {
    fn exception_type(&self) -> &'static ExceptionType {
        match self {
            Self::UnknownType(err) => err.exception_type(),
            Self::MissingSeparator(_) | Self::InvalidCode { .. } => &VALUE_ERROR,
        }
    }
}

impl Classify for ConfigError {
    fn exception_type(&self) -> &'static ExceptionType {
        match self {
            Self::FileNotFound(_) => &FILE_NOT_FOUND_ERROR,
            Self::Registration(err) => err.exception_type(),
            Self::Extract(_) | Self::Render(_) => &VALUE_ERROR,
        }
    }
}

/// Classifies by the first recognised cause in the chain, outermost first.
///
/// Unrecognised chains classify as `Exception`.
impl Classify for anyhow::Error {
    fn exception_type(&self) -> &'static ExceptionType {
        self.chain()
            .find_map(classify_std_error)
            .unwrap_or(&EXCEPTION)
    }
}

fn classify_std_error(
    cause: &(dyn std::error::Error + 'static),
) -> Option<&'static ExceptionType> {
    if let Some(err) = cause.downcast_ref::<io::Error>() {
        return Some(err.exception_type());
    }
    if let Some(err) = cause.downcast_ref::<serde_json::Error>() {
        return Some(err.exception_type());
    }
    if let Some(err) = cause.downcast_ref::<std::num::ParseIntError>() {
        return Some(err.exception_type());
    }
    if let Some(err) = cause.downcast_ref::<std::num::ParseFloatError>() {
        return Some(err.exception_type());
    }
    if let Some(err) = cause.downcast_ref::<std::str::Utf8Error>() {
        return Some(err.exception_type());
    }
    if let Some(err) = cause.downcast_ref::<std::string::FromUtf8Error>() {
        return Some(err.exception_type());
    }
    if let Some(err) = cause.downcast_ref::<ConfigError>() {
        return Some(err.exception_type());
    }
    if let Some(err) = cause.downcast_ref::<RegistrationParseError>() {
        return Some(err.exception_type());
    }
    if let Some(err) = cause.downcast_ref::<UnknownExceptionType>() {
        return Some(err.exception_type());
    }
    if let Some(err) = cause.downcast_ref::<UnknownReportLevel>() {
        return Some(err.exception_type());
    }
    None
}
