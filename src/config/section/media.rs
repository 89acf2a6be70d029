//! `[media]` section configuration.
//!
//! Generated figures land in `{root}/{images}/{sysgen}/{hash}.{ext}` and are
//! served from `{url}{images}/{sysgen}/{hash}.{ext}`.
//!
//! # Example
//!
//! ```toml
//! [media]
//! root = "media"      # Filesystem media root
//! url = "/media/"     # Public URL of the media root
//! images = "wiki"     # Wiki image folder inside the media root
//! sysgen = "sysgen"   # System-generated folder inside the image folder
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Media directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub root: PathBuf,
    pub url: String,
    pub images: String,
    pub sysgen: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("media"),
            url: "/media/".to_string(),
            images: "wiki".to_string(),
            sysgen: "sysgen".to_string(),
        }
    }
}

impl MediaConfig {
    /// Directory of author-supplied images.
    pub fn image_dir(&self) -> PathBuf {
        self.root.join(&self.images)
    }

    /// Directory of generated assets.
    pub fn sysgen_dir(&self) -> PathBuf {
        self.image_dir().join(&self.sysgen)
    }

    /// Public URL of an author-supplied image.
    pub fn image_url(&self, name: &str) -> String {
        format!("{}{}/{}", self.url_base(), self.images, name)
    }

    /// Public URL of a generated asset.
    pub fn sysgen_url(&self, file_name: &str) -> String {
        format!("{}{}/{}/{}", self.url_base(), self.images, self.sysgen, file_name)
    }

    fn url_base(&self) -> String {
        if self.url.ends_with('/') {
            self.url.clone()
        } else {
            format!("{}/", self.url)
        }
    }
}
