//! `[storage]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [storage]
//! root = "wiki-pages"     # Page tree root, relative to wiki.toml
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Page tree storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the page tree. Created on first use.
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("wiki-pages"),
        }
    }
}
