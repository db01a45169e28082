//! # vimshim_codec
//!
//! UTF-8 decoding with named error handlers.
//!
//! Callers pick a recovery strategy by name instead of by function, so a
//! strategy can be installed once at startup and referenced from any call
//! site that decodes untrusted bytes:
//!
//! ```rust,ignore
//! use vimshim_codec::{decode, NoTransliteration, REPLACE};
//!
//! let text = decode(b"caf\xe9", REPLACE, &NoTransliteration)?;
//! assert_eq!(text, "caf\u{fffd}");
//! ```

mod decode;
mod error;
mod handler;

pub use decode::{decode, decode_strict};
pub use error::{CodecError, DecodeError, DecodeReason};
pub use handler::{
    BACKSLASH_REPLACE, ErrorHandler, IGNORE, NoTransliteration, REPLACE, STRICT, Transliterate,
    is_registered, lookup_error, register_error,
};
