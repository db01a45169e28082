//! Decode recovery through the host's `strtrans()`.
//!
//! Text the host hands back is normally UTF-8, but buffer names and file
//! contents can carry arbitrary bytes. The [`STRTRANS_ERROR`] handler asks
//! the host to render the offending bytes the way it would display them
//! (`<80>`, `^@`, ...) and resumes decoding after them.

use std::sync::Once;

use vimshim_codec::{CodecError, Transliterate, register_error};

/// Name of the decode error handler backed by `strtrans()`.
pub const STRTRANS_ERROR: &str = "powerline_vim_strtrans_error";

/// Replaces an undecodable byte range with its host transliteration.
///
/// Any error other than a UTF-8 decode failure is handed back unchanged.
pub fn strtrans_error(
    err: &CodecError,
    ctx: &dyn Transliterate,
) -> Result<(String, usize), CodecError> {
    let CodecError::Decode(decode) = err else {
        return Err(err.clone());
    };
    let text = ctx.transliterate(&decode.bytes)?;
    Ok((text, decode.end))
}

/// Registers [`STRTRANS_ERROR`]. Safe to call any number of times.
pub fn install() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        register_error(STRTRANS_ERROR, strtrans_error);
    });
}

/// The rendering `strtrans()` produces for bytes that are not valid UTF-8
/// under a UTF-8 `&encoding`, used when there is no host to ask.
pub(crate) fn render_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("<{byte:02x}>")).collect()
}
