//! Wiki configuration management for `wiki.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── media      # [media]
//! │   ├── render     # [render]
//! │   ├── routes     # [routes]
//! │   ├── storage    # [storage]
//! │   └── toolchain  # [toolchain]
//! ├── error.rs       # ConfigError
//! ├── util.rs        # config discovery, path resolution
//! └── mod.rs         # WikiConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section       | Purpose                                          |
//! |---------------|--------------------------------------------------|
//! | `[storage]`   | Page tree root directory                         |
//! | `[routes]`    | Show/edit/pdf URL prefixes of the web layer      |
//! | `[media]`     | Media root, URL and image/sysgen folders         |
//! | `[toolchain]` | External executables, work dir, timeout          |
//! | `[render]`    | Markup rendering options                         |
//!
//! The loaded [`WikiConfig`] is passed explicitly to every component;
//! nothing reads configuration from global state.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{MediaConfig, RenderConfig, RoutesConfig, StorageConfig, ToolchainConfig};

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{debug, log};
use util::{find_config_file, resolve_path};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing wiki.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WikiConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory all relative paths resolve against (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub routes: RoutesConfig,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub toolchain: ToolchainConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

impl WikiConfig {
    /// Load configuration, searching upward from cwd for `config_name`.
    ///
    /// A missing config file is not an error: defaults are used, rooted at cwd.
    pub fn load(config_name: &Path) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(config_name) {
            Some(path) => {
                debug!("config"; "using {}", path.display());
                let mut config = Self::from_path(&path)?;
                config.config_path = path;
                config
            }
            None => {
                debug!("config"; "no {} found, using defaults", config_name.display());
                Self {
                    config_path: cwd.join(config_name),
                    ..Self::default()
                }
            }
        };

        let root = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(cwd);
        config.finalize(&root);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} ignored: {}", display_path, fields.join(", "));
    }

    /// Resolve paths against `root` and normalize route prefixes.
    fn finalize(&mut self, root: &Path) {
        self.root = root.to_path_buf();
        self.storage.root = resolve_path(&self.storage.root, root);
        self.media.root = resolve_path(&self.media.root, root);
        self.toolchain.work_dir = resolve_path(&self.toolchain.work_dir, root);
        self.toolchain.template_dir = self
            .toolchain
            .template_dir
            .as_ref()
            .map(|dir| resolve_path(dir, root));
        self.routes.normalize();
    }

    /// Validate semantic constraints, collecting every problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.storage.root.as_os_str().is_empty() {
            problems.push("storage.root must not be empty".to_string());
        }
        if self.toolchain.timeout == 0 {
            problems.push("toolchain.timeout must be greater than 0".to_string());
        }
        if self.toolchain.dpi == 0 {
            problems.push("toolchain.dpi must be greater than 0".to_string());
        }
        if !(1..=6).contains(&self.render.initial_header_level) {
            problems.push(format!(
                "render.initial_header_level must be within 1..=6, got {}",
                self.render.initial_header_level
            ));
        }
        for (field, value) in [("media.images", &self.media.images), ("media.sysgen", &self.media.sysgen)] {
            if value.is_empty() || value.contains(['/', '\\']) {
                problems.push(format!("{field} must be a single folder name, got `{value}`"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(problems))
        }
    }

    /// Build a configuration rooted at `root` with default sections.
    ///
    /// Used by tests and embedders that do not read a `wiki.toml`.
    pub fn rooted(root: &Path) -> Self {
        let mut config = Self {
            config_path: root.join("wiki.toml"),
            ..Self::default()
        };
        config.finalize(root);
        config
    }
}

/// Parse a config snippet rooted at `/srv/wiki`, asserting no unknown fields.
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> WikiConfig {
    let (mut parsed, ignored) = WikiConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed.finalize(Path::new("/srv/wiki"));
    parsed
}

// ============================================================================
// tests
// ============================================================================
