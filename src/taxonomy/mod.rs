//! Exception type hierarchy.
//!
//! Rust errors carry no class hierarchy, so exit-code dispatch works over an
//! explicit one: every [`ExceptionType`] names its declared parent, and
//! subtype checks walk that parent chain.
//!
//! The built-in nodes mirror the familiar Python exception tree
//! (`BaseException` → `Exception` → `OSError` → `FileNotFoundError`, ...).
//! Tools add their own nodes as `static` items parented anywhere in the tree:
//!
//! ```
//! use exitreport::taxonomy::{self, ExceptionType};
//!
//! static DATASET_ERROR: ExceptionType =
//!     ExceptionType::new("DatasetError", Some(&taxonomy::EXCEPTION));
//! static EMPTY_DATASET: ExceptionType =
//!     ExceptionType::new("EmptyDatasetError", Some(&DATASET_ERROR));
//!
//! assert!(EMPTY_DATASET.is_subtype_of(&DATASET_ERROR));
//! assert!(EMPTY_DATASET.is_subtype_of(&taxonomy::BASE_EXCEPTION));
//! assert!(!DATASET_ERROR.is_subtype_of(&taxonomy::OS_ERROR));
//! ```

pub mod classify;

use std::fmt;

pub use classify::Classify;

use crate::error::UnknownExceptionType;

/// A node in a single-rooted exception type hierarchy.
///
/// Equality is structural: two nodes are equal when their names and entire
/// ancestor chains are equal.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ExceptionType {
    name: &'static str,
    parent: Option<&'static ExceptionType>,
}

impl ExceptionType {
    /// Declare a type with the given plain name and parent.
    ///
    /// A type with no parent is a hierarchy root.
    #[must_use]
    pub const fn new(name: &'static str, parent: Option<&'static ExceptionType>) -> Self {
        Self { name, parent }
    }

    /// Plain identifier, without any module qualification.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared parent, or `None` for a root.
    #[must_use]
    pub fn parent(&self) -> Option<&'static ExceptionType> {
        self.parent
    }

    /// Iterate the resolution path: this type first, then each ancestor up
    /// to the root.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Number of ancestors above this type (a root has depth 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }

    /// Whether `self` is `other` or derives from it.
    #[must_use]
    pub fn is_subtype_of(&self, other: &ExceptionType) -> bool {
        self.ancestors().any(|ancestor| ancestor == other)
    }

    /// Whether `self` derives from `other` and is not `other` itself.
    #[must_use]
    pub fn is_strict_subtype_of(&self, other: &ExceptionType) -> bool {
        self != other && self.is_subtype_of(other)
    }

    /// Number of parent hops from `self` up to `ancestor`, if it is one.
    #[must_use]
    pub fn distance_to(&self, ancestor: &ExceptionType) -> Option<usize> {
        self.ancestors().position(|candidate| candidate == ancestor)
    }
}

impl fmt::Display for ExceptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Iterator over a type and its ancestors, most specific first.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    next: Option<&'a ExceptionType>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ExceptionType;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent;
        Some(current)
    }
}

// --- Roots ---

/// Root of the hierarchy.
pub static BASE_EXCEPTION: ExceptionType = ExceptionType::new("BaseException", None);
/// Base of all ordinary errors.
pub static EXCEPTION: ExceptionType = ExceptionType::new("Exception", Some(&BASE_EXCEPTION));
/// Requested process exit.
pub static SYSTEM_EXIT: ExceptionType = ExceptionType::new("SystemExit", Some(&BASE_EXCEPTION));
/// User interrupt (Ctrl+C).
pub static KEYBOARD_INTERRUPT: ExceptionType =
    ExceptionType::new("KeyboardInterrupt", Some(&BASE_EXCEPTION));

// --- OSError hierarchy ---

/// Operating-system and I/O failures.
pub static OS_ERROR: ExceptionType = ExceptionType::new("OSError", Some(&EXCEPTION));
/// Alias of [`OS_ERROR`].
pub static IO_ERROR: &ExceptionType = &OS_ERROR;
pub static FILE_NOT_FOUND_ERROR: ExceptionType =
    ExceptionType::new("FileNotFoundError", Some(&OS_ERROR));
pub static FILE_EXISTS_ERROR: ExceptionType =
    ExceptionType::new("FileExistsError", Some(&OS_ERROR));
pub static PERMISSION_ERROR: ExceptionType =
    ExceptionType::new("PermissionError", Some(&OS_ERROR));
pub static IS_A_DIRECTORY_ERROR: ExceptionType =
    ExceptionType::new("IsADirectoryError", Some(&OS_ERROR));
pub static NOT_A_DIRECTORY_ERROR: ExceptionType =
    ExceptionType::new("NotADirectoryError", Some(&OS_ERROR));
pub static TIMEOUT_ERROR: ExceptionType = ExceptionType::new("TimeoutError", Some(&OS_ERROR));
pub static INTERRUPTED_ERROR: ExceptionType =
    ExceptionType::new("InterruptedError", Some(&OS_ERROR));
pub static CONNECTION_ERROR: ExceptionType =
    ExceptionType::new("ConnectionError", Some(&OS_ERROR));
pub static BROKEN_PIPE_ERROR: ExceptionType =
    ExceptionType::new("BrokenPipeError", Some(&CONNECTION_ERROR));
pub static CONNECTION_REFUSED_ERROR: ExceptionType =
    ExceptionType::new("ConnectionRefusedError", Some(&CONNECTION_ERROR));
pub static CONNECTION_RESET_ERROR: ExceptionType =
    ExceptionType::new("ConnectionResetError", Some(&CONNECTION_ERROR));
pub static CONNECTION_ABORTED_ERROR: ExceptionType =
    ExceptionType::new("ConnectionAbortedError", Some(&CONNECTION_ERROR));

// --- ValueError hierarchy ---

pub static VALUE_ERROR: ExceptionType = ExceptionType::new("ValueError", Some(&EXCEPTION));
pub static UNICODE_ERROR: ExceptionType = ExceptionType::new("UnicodeError", Some(&VALUE_ERROR));
pub static JSON_DECODE_ERROR: ExceptionType =
    ExceptionType::new("JSONDecodeError", Some(&VALUE_ERROR));

// --- LookupError hierarchy ---

pub static LOOKUP_ERROR: ExceptionType = ExceptionType::new("LookupError", Some(&EXCEPTION));
pub static KEY_ERROR: ExceptionType = ExceptionType::new("KeyError", Some(&LOOKUP_ERROR));
pub static INDEX_ERROR: ExceptionType = ExceptionType::new("IndexError", Some(&LOOKUP_ERROR));

// --- RuntimeError hierarchy ---

pub static RUNTIME_ERROR: ExceptionType = ExceptionType::new("RuntimeError", Some(&EXCEPTION));
pub static NOT_IMPLEMENTED_ERROR: ExceptionType =
    ExceptionType::new("NotImplementedError", Some(&RUNTIME_ERROR));

// --- ArithmeticError hierarchy ---

pub static ARITHMETIC_ERROR: ExceptionType =
    ExceptionType::new("ArithmeticError", Some(&EXCEPTION));
pub static OVERFLOW_ERROR: ExceptionType =
    ExceptionType::new("OverflowError", Some(&ARITHMETIC_ERROR));
pub static ZERO_DIVISION_ERROR: ExceptionType =
    ExceptionType::new("ZeroDivisionError", Some(&ARITHMETIC_ERROR));

// --- Standalone ---

pub static TYPE_ERROR: ExceptionType = ExceptionType::new("TypeError", Some(&EXCEPTION));

/// Every built-in node, parents before children.
static BUILTINS: [&ExceptionType; 29] = [
    &BASE_EXCEPTION,
    &EXCEPTION,
    &SYSTEM_EXIT,
    &KEYBOARD_INTERRUPT,
    &OS_ERROR,
    &FILE_NOT_FOUND_ERROR,
    &FILE_EXISTS_ERROR,
    &PERMISSION_ERROR,
    &IS_A_DIRECTORY_ERROR,
    &NOT_A_DIRECTORY_ERROR,
    &TIMEOUT_ERROR,
    &INTERRUPTED_ERROR,
    &CONNECTION_ERROR,
    &BROKEN_PIPE_ERROR,
    &CONNECTION_REFUSED_ERROR,
    &CONNECTION_RESET_ERROR,
    &CONNECTION_ABORTED_ERROR,
    &VALUE_ERROR,
    &UNICODE_ERROR,
    &JSON_DECODE_ERROR,
    &LOOKUP_ERROR,
    &KEY_ERROR,
    &INDEX_ERROR,
    &RUNTIME_ERROR,
    &NOT_IMPLEMENTED_ERROR,
    &ARITHMETIC_ERROR,
    &OVERFLOW_ERROR,
    &ZERO_DIVISION_ERROR,
    &TYPE_ERROR,
];

/// All built-in types, parents before children.
#[must_use]
pub fn builtins() -> &'static [&'static ExceptionType] {
    &BUILTINS
}

/// Names of all built-in types.
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|ty| ty.name())
}

/// Find a built-in type by exact name.
///
/// `"IOError"` resolves to `OSError`, matching the alias.
///
/// # Errors
///
/// Returns [`UnknownExceptionType`] (with a close-match suggestion when one
/// exists) if no built-in type has that name.
pub fn by_name(name: &str) -> Result<&'static ExceptionType, UnknownExceptionType> {
    if name == "IOError" {
        return Ok(IO_ERROR);
    }
    BUILTINS
        .iter()
        .copied()
        .find(|ty| ty.name() == name)
        .ok_or_else(|| UnknownExceptionType::new(name))
}
