//! The uniform interface over a host binding.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use tracing::warn;
use vimshim_codec::{CodecError, Transliterate};

use crate::buffer::{BufferNames, BufferOptions};
use crate::capability::Capabilities;
use crate::config::ShimConfig;
use crate::environ::Environ;
use crate::error::Result;
use crate::func::{HostFunc, ReturnKind};
use crate::host::{BufferHandle, Host, SegmentInfo};
use crate::strtrans::{self, STRTRANS_ERROR};
use crate::value::{HostValue, Value};
use crate::vars::Variables;

/// Access to a host, resolved once at load time.
///
/// Construction inspects the host and picks the legacy or structured
/// implementation of every accessor; nothing re-checks the host's
/// generation afterwards. With no host at all every accessor answers with
/// a fixed stub result.
///
/// # Example
///
/// ```rust,ignore
/// use vimshim::Vim;
///
/// let vim = Vim::new(Some(host));
/// match vim.get_global("powerline_theme") {
///     Ok(theme) => use_theme(theme),
///     Err(e) if e.is_not_found() => use_theme(default_theme()),
///     Err(e) => return Err(e),
/// }
/// ```
pub struct Vim {
    host: Option<Rc<dyn Host>>,
    capabilities: Capabilities,
    variables: Variables,
    options: BufferOptions,
    names: BufferNames,
    getbufvar: Option<HostFunc>,
    strtrans: Option<HostFunc>,
}

impl fmt::Debug for Vim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vim")
            .field("capabilities", &self.capabilities)
            .field("variables", &self.variables)
            .field("options", &self.options)
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

impl Vim {
    /// Binds to `host` with the default configuration.
    pub fn new(host: Option<Rc<dyn Host>>) -> Self {
        Self::with_config(host, &ShimConfig::default())
    }

    /// Binds to `host`.
    pub fn with_config(host: Option<Rc<dyn Host>>, config: &ShimConfig) -> Self {
        strtrans::install();

        let capabilities = Capabilities::detect(host.as_deref(), config);
        let Some(handle) = host.as_ref() else {
            return Self {
                host: None,
                capabilities,
                variables: Variables::Stub,
                options: BufferOptions::Stub,
                names: BufferNames::Stub,
                getbufvar: None,
                strtrans: None,
            };
        };

        let bind = |name: &str, ret: Option<ReturnKind>| {
            bind_function(handle, &capabilities, name, ret)
                .unwrap_or_else(|| HostFunc::evaluated(handle, name, ret))
        };
        // Shared by the legacy variable and option paths.
        let exists_cell = OnceCell::new();
        let exists = || {
            exists_cell
                .get_or_init(|| bind("exists", Some(ReturnKind::Int)))
                .clone()
        };

        let variables = if capabilities.scoped_vars {
            Variables::Structured {
                host: Rc::clone(handle),
            }
        } else {
            Variables::Legacy {
                host: Rc::clone(handle),
                exists: exists(),
            }
        };

        // Also backs `Vim::getbufvar`, so it is bound on every path.
        let getbufvar = bind("getbufvar", None);
        let options = if capabilities.buffer_options {
            BufferOptions::Structured {
                host: Rc::clone(handle),
            }
        } else {
            BufferOptions::Legacy {
                getbufvar: getbufvar.clone(),
                exists: exists(),
            }
        };

        let names = if capabilities.is_structured() {
            BufferNames::Structured {
                host: Rc::clone(handle),
            }
        } else {
            BufferNames::Legacy {
                bufname: bind("bufname", Some(ReturnKind::Text)),
            }
        };

        let strtrans = bind("strtrans", None);

        Self {
            host: Some(Rc::clone(handle)),
            capabilities,
            variables,
            options,
            names,
            getbufvar: Some(getbufvar),
            strtrans: Some(strtrans),
        }
    }

    /// What was detected about the host.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Binds the host function `name`.
    ///
    /// Returns `None` when there is no host, or when the structured API
    /// does not know the function. The legacy API cannot check without a
    /// round trip, so it always returns a callable.
    pub fn bind(&self, name: &str, ret: Option<ReturnKind>) -> Option<HostFunc> {
        bind_function(self.host.as_ref()?, &self.capabilities, name, ret)
    }

    /// Reads `g:name`.
    pub fn get_global(&self, name: &str) -> Result<Value> {
        self.variables.get_global(name)
    }

    /// Returns `true` if `b:name` exists in `buffer` (the current buffer
    /// when `None`).
    pub fn buffer_has(&self, buffer: Option<BufferHandle>, name: &str) -> Result<bool> {
        self.variables.buffer_has(buffer, name)
    }

    /// Reads `b:name` of `buffer`.
    pub fn get_buffer_var(&self, buffer: BufferHandle, name: &str) -> Result<Value> {
        self.variables.get_buffer_var(buffer, name)
    }

    /// Reads `w:name` of the segment's window.
    pub fn get_window_var(&self, info: &SegmentInfo, name: &str) -> Result<Value> {
        self.variables.get_window_var(info, name)
    }

    /// Reads a buffer-local option of the segment's buffer.
    pub fn get_buffer_option(&self, info: &SegmentInfo, option: &str) -> Result<Value> {
        self.options.get(info, option)
    }

    /// Calls `getbufvar(bufnr, name)`.
    ///
    /// Returns `Null` when there is no host.
    pub fn getbufvar(&self, bufnr: u64, name: &str) -> Result<Value> {
        match &self.getbufvar {
            Some(func) => func.call_native(&[HostValue::from(bufnr as i64), name.into()]),
            None => Ok(Value::Null),
        }
    }

    /// The raw name of `buffer`, `None` when it is unnamed.
    pub fn buffer_name(&self, buffer: BufferHandle) -> Result<Option<Vec<u8>>> {
        self.names.get(buffer)
    }

    /// The host's environment.
    pub fn environ(&self) -> Environ<'_> {
        Environ::new(self.host.as_ref())
    }

    /// Decodes host bytes for display, transliterating undecodable ranges
    /// with the host's `strtrans()`.
    pub fn decode_display(&self, bytes: &[u8]) -> Result<String> {
        Ok(vimshim_codec::decode(bytes, STRTRANS_ERROR, self)?)
    }

    /// Renders `bytes` the way the host displays them.
    pub fn strtrans(&self, bytes: &[u8]) -> Result<String> {
        let Some(func) = &self.strtrans else {
            return Ok(strtrans::render_bytes(bytes));
        };
        let result = func.call(&[HostValue::Bytes(bytes.to_vec())])?;
        // strtrans() output is printable ASCII under a UTF-8 &encoding.
        match result.as_bytes() {
            Some(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
            None => Ok(crate::marshal::to_native(&result)?.to_string()),
        }
    }
}

impl Transliterate for Vim {
    fn transliterate(&self, bytes: &[u8]) -> std::result::Result<String, CodecError> {
        self.strtrans(bytes).map_err(|e| {
            warn!("strtrans() failed: {}", e);
            CodecError::handler(STRTRANS_ERROR, e.to_string())
        })
    }
}

fn bind_function(
    host: &Rc<dyn Host>,
    capabilities: &Capabilities,
    name: &str,
    ret: Option<ReturnKind>,
) -> Option<HostFunc> {
    if capabilities.is_structured() {
        HostFunc::structured(host, name, ret)
    } else {
        Some(HostFunc::evaluated(host, name, ret))
    }
}
