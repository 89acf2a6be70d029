//! Page types: storage, tree navigation and metadata.
//!
//! A [`PageNode`] is a transient projection of the filesystem, rebuilt on
//! every access. Nothing here owns page state beyond the derived
//! [`MetaCache`].

mod cache;
mod meta;
mod store;
mod tree;

pub use cache::MetaCache;
pub use meta::{PageMeta, split_frontmatter};
pub use store::PageStore;
pub use tree::TreeIndex;

use serde::Serialize;

use crate::address::PageAddress;
use crate::error::StorageError;

/// Display name of the root page.
pub const ROOT_SLUG: &str = "WikiRoot";

/// Read projection of one page.
#[derive(Debug, Clone, Serialize)]
pub struct PageNode {
    pub address: PageAddress,
    pub exists: bool,
    pub is_directory: bool,
    pub meta: PageMeta,
}

impl PageNode {
    /// Project `address` from the store, reading metadata through `cache`.
    pub fn load(
        store: &PageStore,
        cache: &MetaCache,
        address: PageAddress,
    ) -> Result<Self, StorageError> {
        let exists = store.exists(&address);
        let meta = if exists {
            cache.get(store, &address)?
        } else {
            PageMeta::default()
        };
        Ok(Self {
            exists,
            is_directory: address.is_root() || store.is_directory(&address),
            meta,
            address,
        })
    }

    /// Last address segment, `WikiRoot` for the root.
    pub fn slug(&self) -> &str {
        self.address.name().unwrap_or(ROOT_SLUG)
    }

    /// Metadata title, else the slug.
    pub fn title(&self) -> &str {
        self.meta.title.as_deref().unwrap_or_else(|| self.slug())
    }

    /// `[slug] title`, or `[slug]` when the page has no title of its own.
    pub fn long_title(&self) -> String {
        match &self.meta.title {
            Some(title) => format!("[{}] {}", self.slug(), title),
            None => format!("[{}]", self.slug()),
        }
    }

    /// Raw markup body, loaded on demand.
    pub fn raw_content(&self, store: &PageStore) -> Result<String, StorageError> {
        store.read(&self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_titles() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::open(dir.path()).unwrap();
        let cache = MetaCache::new();
        let address = PageAddress::parse("optics").unwrap();

        store.save(&address, "plain body").unwrap();
        let node = PageNode::load(&store, &cache, address.clone()).unwrap();
        assert_eq!(node.title(), "optics");
        assert_eq!(node.long_title(), "[optics]");
        assert!(node.exists && !node.is_directory);

        store.save(&address, "# Light\n").unwrap();
        cache.invalidate(&address);
        let node = PageNode::load(&store, &cache, address).unwrap();
        assert_eq!(node.title(), "Light");
        assert_eq!(node.long_title(), "[optics] Light");
        assert_eq!(node.raw_content(&store).unwrap(), "# Light\n");
    }

    #[test]
    fn test_root_node() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::open(dir.path()).unwrap();
        let node = PageNode::load(&store, &MetaCache::new(), PageAddress::root()).unwrap();
        assert!(node.exists && node.is_directory);
        assert_eq!(node.title(), ROOT_SLUG);
    }

    #[test]
    fn test_node_serializes_address_as_string() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::open(dir.path()).unwrap();
        let address = PageAddress::parse("notes/optics").unwrap();
        store.save(&address, "# Light").unwrap();

        let node = PageNode::load(&store, &MetaCache::new(), address).unwrap();
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["address"], "notes/optics");
        assert_eq!(json["exists"], true);
        assert_eq!(json["meta"]["title"], "Light");
        assert!(json["meta"]["author"].is_null());
    }
}
