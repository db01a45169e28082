//! UTF-8 decoding driven by named error handlers.

use tracing::trace;

use crate::handler::{self, NoTransliteration, Transliterate};
use crate::{CodecError, DecodeError, DecodeReason};

/// Decodes `bytes` as UTF-8, routing every undecodable range through the
/// handler registered as `errors`.
///
/// The handler name is only resolved once a failure is found, so valid
/// input never fails on an unknown name.
pub fn decode(
    bytes: &[u8],
    errors: &str,
    ctx: &dyn Transliterate,
) -> Result<String, CodecError> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_owned());
    }

    let handler = handler::lookup_error(errors)?;
    let mut out = String::with_capacity(bytes.len());
    let mut pos = 0;

    while pos < bytes.len() {
        let err = match std::str::from_utf8(&bytes[pos..]) {
            Ok(text) => {
                out.push_str(text);
                break;
            }
            Err(err) => err,
        };

        let start = pos + err.valid_up_to();
        out.push_str(&String::from_utf8_lossy(&bytes[pos..start]));

        let end = err.error_len().map_or(bytes.len(), |len| start + len);
        let failure = CodecError::Decode(DecodeError {
            bytes: bytes[start..end].to_vec(),
            start,
            end,
            reason: classify(&bytes[start..end], err.error_len().is_none()),
        });

        let (replacement, resume) = handler(&failure, ctx)?;
        if resume <= start || resume > bytes.len() {
            return Err(CodecError::handler(
                errors,
                format!("resume position {resume} is outside {}..={}", start + 1, bytes.len()),
            ));
        }
        trace!("Replaced bytes {}..{} with {:?}", start, end, replacement);

        out.push_str(&replacement);
        pos = resume;
    }

    Ok(out)
}

/// Decodes `bytes` as UTF-8, failing on the first undecodable range.
pub fn decode_strict(bytes: &[u8]) -> Result<String, CodecError> {
    decode(bytes, handler::STRICT, &NoTransliteration)
}

fn classify(bad: &[u8], truncated: bool) -> DecodeReason {
    if truncated {
        DecodeReason::UnexpectedEndOfData
    } else if bad.len() == 1 && !is_lead_byte(bad[0]) {
        DecodeReason::InvalidStartByte
    } else {
        DecodeReason::InvalidContinuationByte
    }
}

fn is_lead_byte(byte: u8) -> bool {
    matches!(byte, 0xc2..=0xf4)
}
