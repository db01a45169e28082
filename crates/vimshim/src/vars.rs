//! Scoped variable access.
//!
//! Every lookup either yields a value or fails with [`Error::NotFound`].
//! The legacy API cannot tell an empty variable from a missing one in a
//! single evaluation, so the legacy variant issues an existence query
//! whenever the value alone is ambiguous.

use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::error::{Error, Result};
use crate::func::{HostFunc, quote};
use crate::host::{BufferHandle, Host, SegmentInfo};
use crate::marshal::to_native;
use crate::value::{HostValue, Value};

/// The binding context of a variable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// `g:`
    Global,
    /// `b:`
    Buffer,
    /// `w:`
    Window,
}

impl Scope {
    /// The host's prefix for this scope.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Global => "g:",
            Self::Buffer => "b:",
            Self::Window => "w:",
        }
    }

    /// `name` qualified with this scope's prefix.
    pub fn qualify(self, name: &str) -> String {
        format!("{}{}", self.prefix(), name)
    }
}

#[derive(Clone)]
pub(crate) enum Variables {
    Stub,
    Legacy { host: Rc<dyn Host>, exists: HostFunc },
    Structured { host: Rc<dyn Host> },
}

impl fmt::Debug for Variables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stub => "Variables::Stub",
            Self::Legacy { .. } => "Variables::Legacy",
            Self::Structured { .. } => "Variables::Structured",
        })
    }
}

impl Variables {
    pub(crate) fn get_global(&self, name: &str) -> Result<Value> {
        let qualified = Scope::Global.qualify(name);
        match self {
            Self::Stub => Err(Error::not_found(qualified)),
            Self::Structured { host } => match host.global_var(name)? {
                Some(value) => to_native(&value),
                None => Err(Error::not_found(qualified)),
            },
            Self::Legacy { host, exists } => {
                if !exists.call(&[HostValue::from(qualified.as_str())])?.is_truthy() {
                    return Err(Error::not_found(qualified));
                }
                Ok(host.eval(&qualified)?)
            }
        }
    }

    pub(crate) fn buffer_has(&self, buffer: Option<BufferHandle>, name: &str) -> Result<bool> {
        match self {
            Self::Stub => Ok(false),
            Self::Structured { host } => {
                let buffer = buffer.unwrap_or_else(|| host.current_buffer());
                Ok(host.buffer_var(buffer, name)?.is_some())
            }
            Self::Legacy { host, .. } => {
                let expr = match buffer {
                    Some(buffer) if buffer != host.current_buffer() => format!(
                        "has_key(getbufvar({}, \"\"), {})",
                        buffer.0,
                        quote(name.as_bytes())
                    ),
                    _ => format!("exists({})", quote(Scope::Buffer.qualify(name).as_bytes())),
                };
                eval_truthy(host.as_ref(), &expr)
            }
        }
    }

    pub(crate) fn get_buffer_var(&self, buffer: BufferHandle, name: &str) -> Result<Value> {
        let qualified = Scope::Buffer.qualify(name);
        match self {
            Self::Stub => Err(Error::not_found(qualified)),
            Self::Structured { host } => match host.buffer_var(buffer, name)? {
                Some(value) => to_native(&value),
                None => Err(Error::not_found(qualified)),
            },
            Self::Legacy { host, .. } => {
                let name = quote(name.as_bytes());
                let value = host.eval(&format!("getbufvar({}, {})", buffer.0, name))?;
                if is_empty_text(&value)
                    && !eval_truthy(
                        host.as_ref(),
                        &format!("has_key(getbufvar({}, \"\"), {})", buffer.0, name),
                    )?
                {
                    return Err(Error::not_found(qualified));
                }
                Ok(value)
            }
        }
    }

    pub(crate) fn get_window_var(&self, info: &SegmentInfo, name: &str) -> Result<Value> {
        let qualified = Scope::Window.qualify(name);
        match self {
            Self::Stub => Err(Error::not_found(qualified)),
            Self::Structured { host } => match host.window_var(info.window, name)? {
                Some(value) => to_native(&value),
                None => Err(Error::not_found(qualified)),
            },
            Self::Legacy { host, .. } => {
                let name = quote(name.as_bytes());
                let value = host.eval(&format!("getwinvar({}, {})", info.winnr, name))?;
                // An empty result is either an empty variable or no variable.
                if is_empty_text(&value)
                    && !eval_truthy(
                        host.as_ref(),
                        &format!("has_key(getwinvar({}, \"\"), {})", info.winnr, name),
                    )?
                {
                    return Err(Error::not_found(qualified));
                }
                Ok(value)
            }
        }
    }
}

pub(crate) fn is_empty_text(value: &Value) -> bool {
    value.as_str().is_some_and(str::is_empty)
}

pub(crate) fn eval_truthy(host: &dyn Host, expr: &str) -> Result<bool> {
    trace!("eval: {}", expr);
    Ok(HostValue::Native(host.eval(expr)?).is_truthy())
}
