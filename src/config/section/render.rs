//! `[render]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [render]
//! initial_header_level = 2    # `#` renders as <h2>
//! ```

use serde::{Deserialize, Serialize};

/// Markup rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// HTML heading level used for a level-1 markup heading.
    pub initial_header_level: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            initial_header_level: 2,
        }
    }
}
