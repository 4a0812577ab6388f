//! Core configuration for kinema-animation-core.

use serde::{Deserialize, Serialize};

/// Configuration for store sizing.
/// Keep this minimal; expand as needed without breaking API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial capacity hint for the handle store (tracks + keyframes).
    pub initial_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: 256,
        }
    }
}
