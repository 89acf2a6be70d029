//! `[toolchain]` section configuration.
//!
//! External executables used to typeset, rasterize and probe generated
//! figures, and the working directory they run in.
//!
//! # Example
//!
//! ```toml
//! [toolchain]
//! work_dir = ".wiki-work"     # Per-type build directories live here
//! template_dir = "templates"  # Optional driver template overrides
//! pdflatex = "pdflatex"
//! makeindex = "makeindex"
//! ghostscript = "gs"
//! python = "python3"
//! ffmpeg = "ffmpeg"
//! timeout = 60                # Seconds per external process
//! dpi = 600                   # Ghostscript rasterization resolution
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// External toolchain settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    pub work_dir: PathBuf,
    pub template_dir: Option<PathBuf>,
    pub pdflatex: String,
    pub makeindex: String,
    pub ghostscript: String,
    pub python: String,
    pub ffmpeg: String,
    /// Timeout in seconds for a single external process.
    pub timeout: u64,
    pub dpi: u32,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from(".wiki-work"),
            template_dir: None,
            pdflatex: "pdflatex".to_string(),
            makeindex: "makeindex".to_string(),
            ghostscript: "gs".to_string(),
            python: "python3".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            timeout: 60,
            dpi: 600,
        }
    }
}

impl ToolchainConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// `(name, command)` pairs for availability checks.
    pub fn programs(&self) -> [(&'static str, &str); 5] {
        [
            ("pdflatex", &self.pdflatex),
            ("makeindex", &self.makeindex),
            ("ghostscript", &self.ghostscript),
            ("python", &self.python),
            ("ffmpeg", &self.ffmpeg),
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::test_parse_config;

    #[test]
    fn test_toolchain_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.toolchain.timeout(), Duration::from_secs(60));
        assert_eq!(config.toolchain.ghostscript, "gs");
        assert!(config.toolchain.template_dir.is_none());
    }

    #[test]
    fn test_toolchain_overrides() {
        let config = test_parse_config("[toolchain]\ntimeout = 5\npython = \"/usr/bin/python3\"");
        assert_eq!(config.toolchain.timeout, 5);
        assert_eq!(config.toolchain.python, "/usr/bin/python3");
    }
}
