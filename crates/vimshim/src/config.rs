//! Shim configuration.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Oldest `v:version` whose variable tables are not used.
///
/// Hosts at or below this version can crash when the tables are touched.
pub const DEFAULT_STRUCTURED_VARS_MIN_VERSION: i64 = 703;

/// Tunables for capability detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShimConfig {
    /// Variable tables are used only when `v:version` is strictly greater.
    pub structured_vars_min_version: i64,

    /// Use the legacy, string-evaluating path even when the host offers
    /// structured access.
    pub force_legacy: bool,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            structured_vars_min_version: DEFAULT_STRUCTURED_VARS_MIN_VERSION,
            force_legacy: false,
        }
    }
}

impl ShimConfig {
    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::config(e.to_string()))
    }
}
