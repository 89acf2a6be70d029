//! Structural queries over the page tree.
//!
//! Every query re-reads the directory listing; the filesystem stays the
//! source of truth.

use super::{MetaCache, PageNode, PageStore};
use crate::address::PageAddress;
use crate::error::StorageError;

/// Parent/children/siblings/series relationships of pages.
pub struct TreeIndex<'a> {
    store: &'a PageStore,
    cache: &'a MetaCache,
}

impl<'a> TreeIndex<'a> {
    pub fn new(store: &'a PageStore, cache: &'a MetaCache) -> Self {
        Self { store, cache }
    }

    /// Address one level up; `None` for the root.
    #[inline]
    pub fn parent(&self, address: &PageAddress) -> Option<PageAddress> {
        address.parent()
    }

    /// Pages one level below `address`, ordered by name.
    pub fn children(&self, address: &PageAddress) -> Result<Vec<PageNode>, StorageError> {
        let listing = self.store.list_children(address)?;
        listing
            .names()
            .into_iter()
            .filter_map(|name| address.child(name).ok())
            .map(|child| PageNode::load(self.store, self.cache, child))
            .collect()
    }

    /// Children of the parent, excluding `address` itself. Empty for the root.
    pub fn siblings(&self, address: &PageAddress) -> Result<Vec<PageNode>, StorageError> {
        let Some(parent) = address.parent() else {
            return Ok(Vec::new());
        };
        let mut nodes = self.children(&parent)?;
        nodes.retain(|node| &node.address != address);
        Ok(nodes)
    }

    /// Numbered parts sharing the `<prefix>_<NNN>` name of `address`.
    ///
    /// Includes `address` itself when it exists. Empty when the name does not
    /// follow the series pattern.
    pub fn series(&self, address: &PageAddress) -> Result<Vec<PageNode>, StorageError> {
        let (Some((prefix, _)), Some(parent)) = (address.series_key(), address.parent()) else {
            return Ok(Vec::new());
        };

        let mut parts = self.children(&parent)?;
        parts.retain(|node| {
            node.address
                .series_key()
                .is_some_and(|(other, _)| other == prefix)
        });
        parts.sort_by(|a, b| a.address.cmp(&b.address));
        Ok(parts)
    }

    /// Previous and next parts of a series.
    pub fn series_neighbors(
        &self,
        address: &PageAddress,
    ) -> Result<(Option<PageNode>, Option<PageNode>), StorageError> {
        let parts = self.series(address)?;
        let Some(pos) = parts.iter().position(|node| &node.address == address) else {
            return Ok((None, None));
        };
        let prev = pos.checked_sub(1).and_then(|i| parts.get(i)).cloned();
        let next = parts.get(pos + 1).cloned();
        Ok((prev, next))
    }
}
