//! Host-native to caller-native value conversion.

use vimshim_codec::{NoTransliteration, STRICT, Transliterate};

use crate::error::Result;
use crate::value::{HostValue, Value};

/// Converts a structured host value into the caller's data model.
///
/// Dictionaries keep the host's key order, lists keep element order,
/// function references become null and host strings are decoded as strict
/// UTF-8. Already-native values pass through untouched.
pub fn to_native(value: &HostValue) -> Result<Value> {
    to_native_with(value, STRICT, &NoTransliteration)
}

/// Like [`to_native`], decoding host strings with the error handler
/// registered as `errors`.
pub fn to_native_with(value: &HostValue, errors: &str, ctx: &dyn Transliterate) -> Result<Value> {
    Ok(match value {
        HostValue::Dictionary(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, item)| -> Result<(String, Value)> {
                    Ok((key.clone(), to_native_with(item, errors, ctx)?))
                })
                .collect::<Result<_>>()?,
        ),
        HostValue::List(items) => Value::Array(
            items
                .iter()
                .map(|item| to_native_with(item, errors, ctx))
                .collect::<Result<_>>()?,
        ),
        HostValue::Function(_) => Value::Null,
        HostValue::Bytes(bytes) => Value::String(vimshim_codec::decode(bytes, errors, ctx)?),
        HostValue::Native(value) => value.clone(),
    })
}
