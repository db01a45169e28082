//! Environment variables as the host sees them.
//!
//! Reads go through `$NAME` expressions and writes through `let $NAME=...`,
//! so the host's own environment stays the source of truth.

use std::rc::Rc;

use tracing::trace;

use crate::error::Result;
use crate::host::Host;
use crate::value::Value;

/// Key-value access to the host's environment.
///
/// Unset and empty variables both read as the empty string.
pub struct Environ<'a> {
    host: Option<&'a Rc<dyn Host>>,
}

impl<'a> Environ<'a> {
    pub(crate) fn new(host: Option<&'a Rc<dyn Host>>) -> Self {
        Self { host }
    }

    /// Reads `$name`.
    pub fn get(&self, name: &str) -> Result<String> {
        let Some(host) = self.host else {
            return Ok(String::new());
        };
        Ok(match host.eval(&format!("${name}"))? {
            Value::String(text) => text,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    /// Reads `$name`, substituting `default` when it is empty.
    pub fn get_or(&self, name: &str, default: &str) -> Result<String> {
        let value = self.get(name)?;
        Ok(if value.is_empty() {
            default.to_string()
        } else {
            value
        })
    }

    /// Assigns `$name`. NUL characters are dropped.
    pub fn set(&self, name: &str, value: &str) -> Result<()> {
        let Some(host) = self.host else {
            return Ok(());
        };
        let cmd = format!("let ${}=\"{}\"", name, escape(value));
        trace!("command: {}", cmd);
        Ok(host.command(&cmd)?)
    }
}

/// Escapes `value` for the inside of a double-quoted host string.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\0' => {}
            ch => out.push(ch),
        }
    }
    out
}
