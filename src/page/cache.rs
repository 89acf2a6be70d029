//! Read-through metadata cache keyed by page address.
//!
//! Derived from the page files, never authoritative: an entry is re-parsed
//! whenever the backing file's modification time is newer than the stamp
//! recorded at parse time, and dropped on any structural change.

use std::time::SystemTime;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::{PageMeta, PageStore};
use crate::address::PageAddress;
use crate::debug;
use crate::error::StorageError;

#[derive(Debug, Clone)]
struct CachedMeta {
    meta: PageMeta,
    stamp: SystemTime,
}

#[derive(Debug, Default)]
pub struct MetaCache {
    entries: RwLock<FxHashMap<PageAddress, CachedMeta>>,
}

impl MetaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached metadata, refreshed if the page changed on disk.
    pub fn get(&self, store: &PageStore, address: &PageAddress) -> Result<PageMeta, StorageError> {
        self.update(store, address, false)
    }

    /// Refresh the entry for `address`; `force` re-parses unconditionally.
    pub fn update(
        &self,
        store: &PageStore,
        address: &PageAddress,
        force: bool,
    ) -> Result<PageMeta, StorageError> {
        let Some(modified) = store.modified(address) else {
            self.entries.write().remove(address);
            return Ok(PageMeta::default());
        };

        if !force
            && let Some(entry) = self.entries.read().get(address)
            && modified <= entry.stamp
        {
            return Ok(entry.meta.clone());
        }

        let meta = PageMeta::parse(&store.read(address)?);
        debug!("store"; "metadata refreshed for {}", address);
        self.entries.write().insert(
            address.clone(),
            CachedMeta {
                meta: meta.clone(),
                stamp: modified,
            },
        );
        Ok(meta)
    }

    /// Drop the entry for `address`.
    pub fn invalidate(&self, address: &PageAddress) {
        self.entries.write().remove(address);
    }

    /// Drop `address` and every entry below it.
    pub fn invalidate_subtree(&self, address: &PageAddress) {
        self.entries
            .write()
            .retain(|key, _| key != address && !key.is_descendant_of(address));
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn addr(s: &str) -> PageAddress {
        PageAddress::parse(s).unwrap()
    }

    #[test]
    fn test_read_through() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::open(dir.path()).unwrap();
        let cache = MetaCache::new();

        store.save(&addr("p"), "# First\n").unwrap();
        assert_eq!(cache.get(&store, &addr("p")).unwrap().title.as_deref(), Some("First"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_stale_until_mtime_moves() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::open(dir.path()).unwrap();
        let cache = MetaCache::new();
        let page = addr("p");

        store.save(&page, "# First\n").unwrap();
        let path = store.codec().to_fs_path(&page);
        let stamp = std::fs::metadata(&path).unwrap().modified().unwrap();
        cache.get(&store, &page).unwrap();

        // Same mtime: cached value is served
        std::fs::write(&path, "# Second\n").unwrap();
        File::options().write(true).open(&path).unwrap().set_modified(stamp).unwrap();
        assert_eq!(cache.get(&store, &page).unwrap().title.as_deref(), Some("First"));

        // Forced refresh ignores the stamp
        assert_eq!(
            cache.update(&store, &page, true).unwrap().title.as_deref(),
            Some("Second")
        );

        // Newer mtime triggers a refresh
        std::fs::write(&path, "# Third\n").unwrap();
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(stamp + Duration::from_secs(10))
            .unwrap();
        assert_eq!(cache.get(&store, &page).unwrap().title.as_deref(), Some("Third"));
    }

    #[test]
    fn test_missing_page_evicted() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::open(dir.path()).unwrap();
        let cache = MetaCache::new();

        store.save(&addr("p"), "# T\n").unwrap();
        cache.get(&store, &addr("p")).unwrap();
        store.delete(&addr("p")).unwrap();
        assert!(cache.get(&store, &addr("p")).unwrap().is_empty());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_subtree() {
        let dir = TempDir::new().unwrap();
        let store = PageStore::open(dir.path()).unwrap();
        let cache = MetaCache::new();

        for page in ["a", "a/b", "ab"] {
            store.save(&addr(page), "# T\n").unwrap();
        }
        for page in ["a", "a/b", "ab"] {
            cache.get(&store, &addr(page)).unwrap();
        }
        cache.invalidate_subtree(&addr("a"));
        assert_eq!(cache.len(), 1);
    }
}
