//! # vimshim
//!
//! Uniform access to Vim's embedded scripting API.
//!
//! Vim's scripting interface changed incompatibly over time. Older builds
//! only evaluate strings; newer ones hand out typed dictionaries, lists and
//! function objects. This crate detects which generation it is talking to
//! once, at load time, and exposes a single interface on top:
//!
//! - Function binding with normalized return values
//! - Global, buffer-local and window-local variables, with "does not exist"
//!   kept distinct from "empty"
//! - Recursive conversion of host values into [`Value`]
//! - Environment variables read and written through the host
//! - Decode recovery that asks the host's `strtrans()` to render bytes that
//!   are not valid UTF-8
//!
//! ## Example
//!
//! ```rust,ignore
//! use vimshim::{ReturnKind, Vim};
//!
//! let vim = Vim::new(Some(host));
//!
//! let mode = vim.bind("mode", Some(ReturnKind::Text));
//! let theme = vim.get_global("powerline_theme").ok();
//! let home = vim.environ().get_or("HOME", "/")?;
//! ```
//!
//! ## Features
//!
//! - `test-utils`: Expose [`test_utils::FakeVim`], an in-memory host

mod buffer;
mod capability;
mod config;
mod environ;
mod error;
mod func;
mod host;
mod marshal;
mod strtrans;
mod value;
mod vars;
mod vim;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use capability::{Capabilities, Generation};
pub use config::{DEFAULT_STRUCTURED_VARS_MIN_VERSION, ShimConfig};
pub use environ::Environ;
pub use error::{Error, HostError, HostResult, Result};
pub use func::{HostFunc, ReturnKind};
pub use host::{BufferHandle, Host, HostFeatures, SegmentInfo, WindowHandle};
pub use marshal::{to_native, to_native_with};
pub use strtrans::{STRTRANS_ERROR, install as install_strtrans_error, strtrans_error};
pub use value::{FuncRef, HostValue, Value};
pub use vars::Scope;
pub use vim::Vim;
