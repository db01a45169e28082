//! Named error handlers.
//!
//! The registry is process-wide and append-only: the first handler
//! registered under a name is the one every later lookup sees. The builtin
//! handlers (`strict`, `replace`, `ignore`, `backslashreplace`) are present
//! from the first access.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::OnceLock;

use parking_lot::RwLock;
use tracing::debug;

use crate::CodecError;

/// Raise on the first undecodable byte range.
pub const STRICT: &str = "strict";
/// Substitute U+FFFD for each undecodable byte range.
pub const REPLACE: &str = "replace";
/// Drop undecodable bytes.
pub const IGNORE: &str = "ignore";
/// Substitute `\xNN` escapes for undecodable bytes.
pub const BACKSLASH_REPLACE: &str = "backslashreplace";

/// Source of printable replacements for raw bytes.
///
/// Handlers that need outside help (for example an editor's own
/// transliteration routine) receive one of these alongside the error.
pub trait Transliterate {
    /// Returns a printable rendering of `bytes`.
    fn transliterate(&self, bytes: &[u8]) -> Result<String, CodecError>;
}

/// A [`Transliterate`] for call sites with nothing to delegate to.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTransliteration;

impl Transliterate for NoTransliteration {
    fn transliterate(&self, _bytes: &[u8]) -> Result<String, CodecError> {
        Err(CodecError::handler(
            "transliterate",
            "no transliteration source available",
        ))
    }
}

/// An error handler.
///
/// Given the failure, returns the replacement text and the input offset at
/// which decoding resumes. Returning `Err` aborts decoding with that error.
pub type ErrorHandler =
    fn(&CodecError, &dyn Transliterate) -> Result<(String, usize), CodecError>;

static REGISTRY: OnceLock<RwLock<HashMap<String, ErrorHandler>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, ErrorHandler>> {
    REGISTRY.get_or_init(|| {
        let mut handlers: HashMap<String, ErrorHandler> = HashMap::new();
        handlers.insert(STRICT.to_string(), strict_errors);
        handlers.insert(REPLACE.to_string(), replace_errors);
        handlers.insert(IGNORE.to_string(), ignore_errors);
        handlers.insert(BACKSLASH_REPLACE.to_string(), backslash_replace_errors);
        RwLock::new(handlers)
    })
}

/// Registers `handler` under `name`.
///
/// Returns `false` (and keeps the existing handler) when the name is taken.
pub fn register_error(name: &str, handler: ErrorHandler) -> bool {
    let mut handlers = registry().write();
    if handlers.contains_key(name) {
        debug!("Error handler '{}' already registered", name);
        return false;
    }
    handlers.insert(name.to_string(), handler);
    debug!("Registered error handler '{}'", name);
    true
}

/// Looks up the handler registered under `name`.
pub fn lookup_error(name: &str) -> Result<ErrorHandler, CodecError> {
    registry()
        .read()
        .get(name)
        .copied()
        .ok_or_else(|| CodecError::UnknownHandler(name.to_string()))
}

/// Returns `true` if a handler is registered under `name`.
pub fn is_registered(name: &str) -> bool {
    registry().read().contains_key(name)
}

fn strict_errors(
    err: &CodecError,
    _ctx: &dyn Transliterate,
) -> Result<(String, usize), CodecError> {
    Err(err.clone())
}

fn replace_errors(
    err: &CodecError,
    _ctx: &dyn Transliterate,
) -> Result<(String, usize), CodecError> {
    let decode = err.as_decode().ok_or_else(|| err.clone())?;
    Ok((char::REPLACEMENT_CHARACTER.to_string(), decode.end))
}

fn ignore_errors(
    err: &CodecError,
    _ctx: &dyn Transliterate,
) -> Result<(String, usize), CodecError> {
    let decode = err.as_decode().ok_or_else(|| err.clone())?;
    Ok((String::new(), decode.end))
}

fn backslash_replace_errors(
    err: &CodecError,
    _ctx: &dyn Transliterate,
) -> Result<(String, usize), CodecError> {
    let decode = err.as_decode().ok_or_else(|| err.clone())?;
    let mut text = String::with_capacity(decode.bytes.len() * 4);
    for byte in &decode.bytes {
        let _ = write!(text, "\\x{byte:02x}");
    }
    Ok((text, decode.end))
}
