//! `[routes]` section configuration.
//!
//! URL prefixes of the (external) web layer. Link rewriting targets the
//! `show` route.
//!
//! # Example
//!
//! ```toml
//! [routes]
//! show = "/wiki/show/"
//! edit = "/wiki/edit/"
//! pdf = "/wiki/ppdf/"
//! ```

use serde::{Deserialize, Serialize};

use crate::address::PageAddress;

/// Web route prefixes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    pub show: String,
    pub edit: String,
    pub pdf: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            show: "/wiki/show/".to_string(),
            edit: "/wiki/edit/".to_string(),
            pdf: "/wiki/ppdf/".to_string(),
        }
    }
}

impl RoutesConfig {
    /// Ensure every prefix starts and ends with `/`.
    pub fn normalize(&mut self) {
        for route in [&mut self.show, &mut self.edit, &mut self.pdf] {
            *route = normalize_prefix(route);
        }
    }

    /// Show URL of a page: `/wiki/show/a/b/`.
    pub fn show_url(&self, address: &PageAddress) -> String {
        format!("{}{}", self.show, address.route_path())
    }

    /// Show URL for an already-absolute path body (`a/b`, no slashes).
    pub fn show_url_for_path(&self, path: &str) -> String {
        let path = path.trim_matches('/');
        if path.is_empty() {
            self.show.clone()
        } else {
            format!("{}{}/", self.show, path)
        }
    }

    pub fn edit_url(&self, address: &PageAddress) -> String {
        format!("{}{}", self.edit, address.route_path())
    }

    pub fn pdf_url(&self, address: &PageAddress) -> String {
        format!("{}{}", self.pdf, address.route_path())
    }
}

fn normalize_prefix(route: &str) -> String {
    let trimmed = route.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_routes_defaults() {
        let config = test_parse_config("");
        let addr = PageAddress::parse("guide/setup").unwrap();
        assert_eq!(config.routes.show_url(&addr), "/wiki/show/guide/setup/");
        assert_eq!(config.routes.show_url(&PageAddress::root()), "/wiki/show/");
    }

    #[test]
    fn test_routes_normalized() {
        let config = test_parse_config("[routes]\nshow = \"pages\"");
        assert_eq!(config.routes.show, "/pages/");
        assert_eq!(config.routes.show_url_for_path("a/b"), "/pages/a/b/");
    }
}
