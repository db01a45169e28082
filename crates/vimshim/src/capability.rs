//! Host capability detection.
//!
//! Runs once when a [`crate::Vim`] is built; its verdict decides which
//! variant of every accessor gets constructed.

use tracing::debug;

use crate::config::ShimConfig;
use crate::host::Host;
use crate::value::{HostValue, Value};

/// The host API generation in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// No host: running outside the editor.
    Absent,
    /// String evaluation only.
    Legacy,
    /// Typed values and function objects.
    Structured,
}

/// What the host binding can do, as detected at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// API generation for function binding.
    pub generation: Generation,
    /// `v:version`, when the host exposes it.
    pub version: Option<i64>,
    /// Scoped variable tables are present and safe to use.
    pub scoped_vars: bool,
    /// Buffer option tables are present.
    pub buffer_options: bool,
}

impl Capabilities {
    /// Capabilities with no host at all.
    pub fn absent() -> Self {
        Self {
            generation: Generation::Absent,
            version: None,
            scoped_vars: false,
            buffer_options: false,
        }
    }

    /// Inspects `host` once.
    pub fn detect(host: Option<&dyn Host>, config: &ShimConfig) -> Self {
        let Some(host) = host else {
            debug!("No host binding; using stubs");
            return Self::absent();
        };

        let features = host.features();
        let version = if features.vars {
            read_version(host)
        } else {
            None
        };

        let caps = if config.force_legacy {
            Self {
                generation: Generation::Legacy,
                version,
                scoped_vars: false,
                buffer_options: false,
            }
        } else {
            Self {
                generation: if features.bindeval {
                    Generation::Structured
                } else {
                    Generation::Legacy
                },
                version,
                scoped_vars: features.vars
                    && version.is_some_and(|v| v > config.structured_vars_min_version),
                buffer_options: features.options,
            }
        };

        debug!(
            "Detected host: generation={:?} version={:?} scoped_vars={} buffer_options={}",
            caps.generation, caps.version, caps.scoped_vars, caps.buffer_options
        );
        caps
    }

    /// Returns `true` when functions are bound as typed references.
    pub fn is_structured(&self) -> bool {
        self.generation == Generation::Structured
    }

    /// Returns `true` when there is a host at all.
    pub fn has_host(&self) -> bool {
        self.generation != Generation::Absent
    }
}

fn read_version(host: &dyn Host) -> Option<i64> {
    match host.vvar("version") {
        Ok(Some(HostValue::Native(Value::Number(n)))) => n.as_i64(),
        Ok(Some(HostValue::Native(Value::String(text)))) => text.trim().parse().ok(),
        Ok(Some(HostValue::Bytes(bytes))) => std::str::from_utf8(&bytes).ok()?.trim().parse().ok(),
        Ok(_) => None,
        Err(e) => {
            debug!("Cannot read v:version: {}", e);
            None
        }
    }
}
