//! Shim error types.

use thiserror::Error;
use vimshim_codec::CodecError;

use crate::func::ReturnKind;

/// An error raised by the host itself (bad expression, runtime fault,
/// missing feature).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostError {
    message: String,
}

impl HostError {
    /// Creates a host error with the host's own message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Creates the error a host reports for an entry point it does not have.
    pub fn unsupported(feature: &str) -> Self {
        Self::new(format!("Host does not support {feature}"))
    }

    /// The host's message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by the shim.
#[derive(Debug, Error)]
pub enum Error {
    /// The variable (or option) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The host rejected an expression or command.
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// A textual legacy result could not be coerced to the requested kind.
    #[error("Cannot coerce {value:?} to {kind}")]
    Coerce {
        /// The requested kind.
        kind: ReturnKind,
        /// The host's textual result.
        value: String,
    },

    /// Bytes could not be decoded, or a decode handler failed.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// An argument could not be serialized for a legacy call.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid shim configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates a not found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns `true` for [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Result type for raw host calls.
pub type HostResult<T> = std::result::Result<T, HostError>;
