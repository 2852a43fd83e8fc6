//! Error kinds shared by every component in this crate.
//!
//! Mirrors the taxonomy the scanner/parser/formatter/MO-codec boundaries
//! need: lexical trouble in the scanner, grammar trouble in the entry
//! parser, malformed `Plural-Forms`/header values, I/O failures, corrupt MO
//! binaries, and missing runtime lookups.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error produced while scanning, parsing, formatting, or looking up a catalog.
#[derive(Debug, Error)]
pub enum Error {
    /// The scanner could not classify a line, or a quoted continuation was malformed.
    #[error("line {line}: {message}")]
    Lexical { line: usize, message: String },

    /// The entry parser saw a duplicate block, unknown plural index, or mixed obsolete markers.
    #[error("line {line}: {message}")]
    Grammar { line: usize, message: String },

    /// A header value (e.g. `Plural-Forms`) did not match its canonical shape.
    #[error("{message}")]
    Format { message: String },

    /// Underlying reader/writer failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The MO binary was malformed: bad magic, revision, or offset table.
    #[error("invalid mo file: {message}")]
    Mo { message: String },

    /// A translation key or catalog was not found at runtime.
    #[error("not found")]
    NotFound,
}

impl Error {
    pub(crate) fn lexical(line: usize, message: impl Into<String>) -> Self {
        Error::Lexical {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn grammar(line: usize, message: impl Into<String>) -> Self {
        Error::Grammar {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn format(message: impl Into<String>) -> Self {
        Error::Format {
            message: message.into(),
        }
    }

    pub(crate) fn mo(message: impl Into<String>) -> Self {
        Error::Mo {
            message: message.into(),
        }
    }

    /// True for the sentinel that signals a clean end-of-input, as opposed to
    /// an actual failure (the scanner has no separate EOF type; callers that
    /// need to distinguish "no more input" from "parse error" match on this).
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }

    pub(crate) fn eof() -> Self {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "end of input",
        ))
    }
}
