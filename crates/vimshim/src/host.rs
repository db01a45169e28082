//! The host binding boundary.
//!
//! A [`Host`] is the single handle to Vim's embedded scripting engine. Every
//! host offers the legacy, string-evaluating surface (`eval`, `command`).
//! Newer hosts also expose typed values, function objects and scoped
//! variable tables; they say so through [`Host::features`], and only then
//! are the structured entry points called.

use crate::error::{HostError, HostResult};
use crate::value::{FuncRef, HostValue, Value};

/// A buffer as the host identifies it (the buffer number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u64);

/// A window as the host identifies it (the window ID, stable across layout
/// changes, unlike the window number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(pub u64);

/// The context a status-line segment is rendered in.
///
/// Supplied by the caller; the shim only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentInfo {
    /// The buffer shown in the window.
    pub buffer: BufferHandle,
    /// The buffer number, as legacy expressions address it.
    pub bufnr: u64,
    /// The window being drawn.
    pub window: WindowHandle,
    /// The window number, as legacy expressions address it.
    pub winnr: u64,
}

/// Which optional entry points a host implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostFeatures {
    /// Typed evaluation: function objects, dictionaries, lists.
    pub bindeval: bool,
    /// Scoped variable tables (`v:`, `g:`, `b:`, `w:`).
    pub vars: bool,
    /// Buffer option tables.
    pub options: bool,
}

/// The scripting API of a running host.
///
/// The default implementations of the structured entry points report the
/// feature as unsupported; a host overriding them must advertise the
/// matching flag in [`Host::features`].
pub trait Host {
    /// The optional entry points this host implements.
    fn features(&self) -> HostFeatures;

    /// Evaluates `expr` and returns the result the way the legacy API does:
    /// scalars as text, lists and dictionaries of text.
    fn eval(&self, expr: &str) -> HostResult<Value>;

    /// Executes an Ex command.
    fn command(&self, cmd: &str) -> HostResult<()>;

    /// The buffer of the current window.
    fn current_buffer(&self) -> BufferHandle;

    /// Resolves a function reference (`function("name")`).
    fn function(&self, name: &str) -> HostResult<FuncRef> {
        let _ = name;
        Err(HostError::unsupported("bindeval"))
    }

    /// Calls a resolved function with typed arguments.
    fn call(&self, func: &FuncRef, args: &[HostValue]) -> HostResult<HostValue> {
        let _ = (func, args);
        Err(HostError::unsupported("bindeval"))
    }

    /// The raw name of a buffer, `None` when the buffer is unnamed.
    fn buffer_name(&self, buffer: BufferHandle) -> HostResult<Option<Vec<u8>>> {
        let _ = buffer;
        Err(HostError::unsupported("bindeval"))
    }

    /// Reads a `v:` variable.
    fn vvar(&self, name: &str) -> HostResult<Option<HostValue>> {
        let _ = name;
        Err(HostError::unsupported("vvars"))
    }

    /// Reads a `g:` variable.
    fn global_var(&self, name: &str) -> HostResult<Option<HostValue>> {
        let _ = name;
        Err(HostError::unsupported("vars"))
    }

    /// Reads a `b:` variable of `buffer`.
    fn buffer_var(&self, buffer: BufferHandle, name: &str) -> HostResult<Option<HostValue>> {
        let _ = (buffer, name);
        Err(HostError::unsupported("buffer vars"))
    }

    /// Reads a `w:` variable of `window`.
    fn window_var(&self, window: WindowHandle, name: &str) -> HostResult<Option<HostValue>> {
        let _ = (window, name);
        Err(HostError::unsupported("window vars"))
    }

    /// Reads a buffer-local option, `None` when no such option exists.
    fn buffer_option(&self, buffer: BufferHandle, name: &str) -> HostResult<Option<HostValue>> {
        let _ = (buffer, name);
        Err(HostError::unsupported("options"))
    }
}
