//! Host function binding.
//!
//! A [`HostFunc`] is resolved once and then called any number of times.
//! Under the structured API it holds a live function reference; under the
//! legacy API it renders each call as a `name(args)` expression for the
//! host to evaluate.

use std::fmt::{self, Write};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::host::Host;
use crate::marshal::to_native;
use crate::value::{FuncRef, HostValue, Value};

/// How to normalize a function's return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    /// Text. Structured byte results are decoded with U+FFFD replacement.
    Text,
    /// An integer parsed from the legacy textual result.
    Int,
}

impl fmt::Display for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Int => "integer",
        })
    }
}

#[derive(Clone)]
enum Backend {
    Structured { host: Rc<dyn Host>, func: FuncRef },
    Evaluated { host: Rc<dyn Host> },
}

/// A callable host function.
#[derive(Clone)]
pub struct HostFunc {
    name: String,
    ret: Option<ReturnKind>,
    backend: Backend,
}

impl fmt::Debug for HostFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backend = match self.backend {
            Backend::Structured { .. } => "structured",
            Backend::Evaluated { .. } => "evaluated",
        };
        f.debug_struct("HostFunc")
            .field("name", &self.name)
            .field("ret", &self.ret)
            .field("backend", &backend)
            .finish()
    }
}

impl HostFunc {
    /// Resolves `name` to a live function reference.
    ///
    /// Returns `None` when the host does not know the function, so callers
    /// can route around the gap.
    pub(crate) fn structured(
        host: &Rc<dyn Host>,
        name: &str,
        ret: Option<ReturnKind>,
    ) -> Option<Self> {
        match host.function(name) {
            Ok(func) => Some(Self {
                name: name.to_string(),
                ret,
                backend: Backend::Structured {
                    host: Rc::clone(host),
                    func,
                },
            }),
            Err(e) => {
                debug!("Function '{}' is not available: {}", name, e);
                None
            }
        }
    }

    /// Builds a function called through expression evaluation.
    ///
    /// Nothing is resolved up front; an unknown name fails at call time.
    pub(crate) fn evaluated(host: &Rc<dyn Host>, name: &str, ret: Option<ReturnKind>) -> Self {
        Self {
            name: name.to_string(),
            ret,
            backend: Backend::Evaluated {
                host: Rc::clone(host),
            },
        }
    }

    /// The bound function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls the function.
    ///
    /// Structured calls return the host value as is, except that a
    /// [`ReturnKind::Text`] byte result is decoded with replacement.
    /// Evaluated calls return the host's text, coerced to the requested
    /// kind.
    pub fn call(&self, args: &[HostValue]) -> Result<HostValue> {
        match &self.backend {
            Backend::Structured { host, func } => {
                let result = host.call(func, args)?;
                Ok(match (self.ret, result) {
                    (Some(ReturnKind::Text), HostValue::Bytes(bytes)) => {
                        HostValue::from(String::from_utf8_lossy(&bytes).into_owned())
                    }
                    (_, result) => result,
                })
            }
            Backend::Evaluated { host } => {
                let expr = call_expr(&self.name, args)?;
                trace!("eval: {}", expr);
                let result = host.eval(&expr)?;
                match self.ret {
                    Some(kind) => coerce(kind, result).map(HostValue::Native),
                    None => Ok(HostValue::Native(result)),
                }
            }
        }
    }

    /// Calls the function and marshals the result.
    pub fn call_native(&self, args: &[HostValue]) -> Result<Value> {
        to_native(&self.call(args)?)
    }
}

fn coerce(kind: ReturnKind, value: Value) -> Result<Value> {
    match (kind, value) {
        (ReturnKind::Text, Value::String(text)) => Ok(Value::String(text)),
        (ReturnKind::Text, Value::Number(n)) => Ok(Value::String(n.to_string())),
        (ReturnKind::Int, Value::Number(n)) if n.is_i64() => Ok(Value::Number(n)),
        (ReturnKind::Int, Value::String(text)) => text
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| Error::Coerce { kind, value: text }),
        (kind, value) => Err(Error::Coerce {
            kind,
            value: value.to_string(),
        }),
    }
}

/// Renders `name(arg, ...)` for legacy evaluation.
pub(crate) fn call_expr(name: &str, args: &[HostValue]) -> Result<String> {
    let args = args
        .iter()
        .map(literal)
        .collect::<Result<Vec<_>>>()?
        .join(", ");
    Ok(format!("{name}({args})"))
}

/// Renders a value as a host expression literal.
///
/// Native values are written as JSON, which the host's expression syntax
/// accepts. Host strings are written as double-quoted literals with every
/// byte outside printable ASCII hex-escaped, so undecodable bytes survive
/// the trip.
pub(crate) fn literal(value: &HostValue) -> Result<String> {
    Ok(match value {
        HostValue::Native(Value::String(text)) => quote(text.as_bytes()),
        HostValue::Native(value) => serde_json::to_string(value)?,
        HostValue::Bytes(bytes) => quote(bytes),
        HostValue::List(items) => {
            let items = items.iter().map(literal).collect::<Result<Vec<_>>>()?;
            format!("[{}]", items.join(", "))
        }
        HostValue::Dictionary(entries) => {
            let entries = entries
                .iter()
                .map(|(key, item)| -> Result<String> {
                    Ok(format!("{}: {}", quote(key.as_bytes()), literal(item)?))
                })
                .collect::<Result<Vec<_>>>()?;
            format!("{{{}}}", entries.join(", "))
        }
        HostValue::Function(func) => format!("function({})", quote(func.name().as_bytes())),
    })
}

/// Double-quotes `bytes` as a host string literal.
pub(crate) fn quote(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for &byte in bytes {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b' '..=b'~' => out.push(char::from(byte)),
            _ => {
                let _ = write!(out, "\\x{byte:02x}");
            }
        }
    }
    out.push('"');
    out
}
