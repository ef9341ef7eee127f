//! Decoder configuration

use serde::{Deserialize, Serialize};

/// Options for decoding untrusted ABI data.
///
/// Passed to each call; the codec keeps no configuration of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Fail event-log decoding when the data section does not match the event
    #[serde(default = "default_strict")]
    pub strict: bool,
    /// Reject `bool` words other than 0 and 1
    #[serde(default = "default_strict")]
    pub strict_bool: bool,
}

fn default_strict() -> bool {
    true
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            strict: default_strict(),
            strict_bool: default_strict(),
        }
    }
}

impl DecodeConfig {
    /// Accept mismatched log data and treat any non-zero bool word as `true`
    pub fn lenient() -> Self {
        Self {
            strict: false,
            strict_bool: false,
        }
    }
}
