//! The structured failure record and its message pipeline.
//!
//! # Output Schema
//!
//! One compact JSON object per report, terminated by `\n`:
//!
//! ```json
//! {"type":"FileNotFoundError","message":"No such file or directory (os e..."}
//! ```
//!
//! Keys appear only when the [`ReportLevel`] asks for them, so an
//! `EXIT_CODE` report is just `{}`.

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::level::ReportLevel;
use crate::taxonomy::ExceptionType;

/// Placeholder for a character the target encoding cannot represent.
pub const REPLACEMENT_CHAR: char = '?';

/// Appended to messages cut short by `max_message_len`.
pub const ELLIPSIS: &str = "...";

/// Text encoding the report sink declares.
///
/// Characters outside the encoding are replaced before the record is
/// serialized, one [`REPLACEMENT_CHAR`] per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetEncoding {
    /// 7-bit ASCII.
    #[default]
    Ascii,
    /// ISO-8859-1: code points up to U+00FF.
    Latin1,
    /// Everything is representable.
    Utf8,
}

impl TargetEncoding {
    /// Whether `c` can be written in this encoding.
    #[must_use]
    pub fn can_encode(self, c: char) -> bool {
        match self {
            Self::Ascii => c.is_ascii(),
            Self::Latin1 => u32::from(c) <= 0xFF,
            Self::Utf8 => true,
        }
    }

    /// Encode `text` into this encoding's bytes.
    ///
    /// ASCII and Latin-1 write one byte per character; a character outside
    /// the encoding becomes [`REPLACEMENT_CHAR`], which cannot happen for
    /// text that went through [`sanitize_message`].
    #[must_use]
    pub fn encode(self, text: &str) -> Cow<'_, [u8]> {
        match self {
            Self::Utf8 => Cow::Borrowed(text.as_bytes()),
            Self::Ascii if text.is_ascii() => Cow::Borrowed(text.as_bytes()),
            Self::Ascii | Self::Latin1 => Cow::Owned(
                text.chars()
                    .map(|c| {
                        if self.can_encode(c) {
                            // Checked above: the code point fits in one byte
                            u32::from(c) as u8
                        } else {
                            REPLACEMENT_CHAR as u8
                        }
                    })
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for TargetEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetEncoding::Ascii => write!(f, "ascii"),
            TargetEncoding::Latin1 => write!(f, "latin1"),
            TargetEncoding::Utf8 => write!(f, "utf8"),
        }
    }
}

/// Options recognised by [`ExceptionsReporter::report`](super::ExceptionsReporter::report).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportOptions {
    /// Maximum message length in characters; `None` means unlimited.
    pub max_message_len: Option<usize>,
    /// Encoding of the sink.
    pub encoding: TargetEncoding,
}

impl ReportOptions {
    /// Options with a message length limit and the default encoding.
    #[must_use]
    pub fn with_max_message_len(max_message_len: usize) -> Self {
        Self {
            max_message_len: Some(max_message_len),
            ..Self::default()
        }
    }
}

/// Replace every character `encoding` cannot represent with `?`.
///
/// The result has exactly as many characters as `message`.
#[must_use]
pub fn sanitize_message(message: &str, encoding: TargetEncoding) -> String {
    message
        .chars()
        .map(|c| {
            if encoding.can_encode(c) {
                c
            } else {
                REPLACEMENT_CHAR
            }
        })
        .collect()
}

/// Cut `message` down to at most `max_len` characters.
///
/// Longer messages keep their first `max_len - 3` characters followed by
/// `"..."`. A kept prefix shorter than the ellipsis itself is not worth
/// showing, so any `max_len < 6` empties a message that does not fit.
#[must_use]
pub fn truncate_message(message: &str, max_len: usize) -> String {
    if message.chars().count() <= max_len {
        return message.to_string();
    }
    let keep = max_len.saturating_sub(ELLIPSIS.len());
    if keep < ELLIPSIS.len() {
        return String::new();
    }
    let mut truncated: String = message.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// One failure record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Concrete exception type name.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Sanitized, truncated message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ReportRecord {
    /// Build the record for `level`, applying the message pipeline.
    #[must_use]
    pub fn build(
        level: ReportLevel,
        exception_type: &ExceptionType,
        exception_value: &dyn fmt::Display,
        options: &ReportOptions,
    ) -> Self {
        let type_name = level
            .includes_type()
            .then(|| exception_type.name().to_string());
        let message = level.includes_message().then(|| {
            let sanitized = sanitize_message(&exception_value.to_string(), options.encoding);
            match options.max_message_len {
                Some(max_len) => truncate_message(&sanitized, max_len),
                None => sanitized,
            }
        });
        Self { type_name, message }
    }

    /// Serialize to a compact single-line JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (not expected for string fields).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Write the record and a trailing newline, encoded for the sink.
    ///
    /// The JSON is rendered and encoded before anything is written, so the
    /// only errors surfaced are the writer's own.
    ///
    /// # Errors
    ///
    /// Returns the writer's error unchanged.
    pub fn write_to<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        encoding: TargetEncoding,
    ) -> io::Result<()> {
        let mut line = self.to_json().map_err(io::Error::from)?;
        line.push('\n');
        writer.write_all(&encoding.encode(&line))
    }
}
