//! Codec error types.

use std::fmt;

use thiserror::Error;

/// Why a byte range could not be decoded as UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeReason {
    /// The first byte of the range cannot start a UTF-8 sequence.
    InvalidStartByte,
    /// A lead byte was followed by a byte that is not a continuation byte.
    InvalidContinuationByte,
    /// The input ended in the middle of a multi-byte sequence.
    UnexpectedEndOfData,
}

impl fmt::Display for DecodeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidStartByte => "invalid start byte",
            Self::InvalidContinuationByte => "invalid continuation byte",
            Self::UnexpectedEndOfData => "unexpected end of data",
        })
    }
}

/// A byte range of the input that is not valid UTF-8.
///
/// `start..end` indexes the original input; `bytes` holds exactly that slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    /// The offending bytes.
    pub bytes: Vec<u8>,
    /// Offset of the first offending byte in the input.
    pub start: usize,
    /// Offset one past the last offending byte.
    pub end: usize,
    /// Classification of the failure.
    pub reason: DecodeReason,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bytes.as_slice() {
            [byte] => write!(
                f,
                "'utf-8' codec can't decode byte {byte:#04x} in position {}: {}",
                self.start, self.reason
            ),
            _ => write!(
                f,
                "'utf-8' codec can't decode bytes in position {}-{}: {}",
                self.start,
                self.end.saturating_sub(1),
                self.reason
            ),
        }
    }
}

/// Errors raised by the codec layer and by error handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error, miette::Diagnostic)]
pub enum CodecError {
    /// Bytes that are not valid UTF-8.
    #[error("{0}")]
    Decode(DecodeError),

    /// A character that cannot be represented in a narrower target encoding.
    #[error("'{encoding}' codec can't encode character {character:?} in position {position}")]
    Encode {
        /// Target encoding name.
        encoding: String,
        /// The character that failed.
        character: char,
        /// Byte offset of the character in the source text.
        position: usize,
    },

    /// No handler is registered under the requested name.
    #[error("Unknown error handler name '{0}'")]
    UnknownHandler(String),

    /// A handler failed while producing a replacement.
    #[error("Error handler '{handler}' failed: {message}")]
    Handler {
        /// Name of the failing handler.
        handler: String,
        /// What went wrong.
        message: String,
    },
}

impl CodecError {
    /// Creates a handler failure.
    pub fn handler(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Handler {
            handler: handler.into(),
            message: message.into(),
        }
    }

    /// Returns the decode error if this is one.
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            Self::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DecodeError> for CodecError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}
