//! Filesystem-backed page storage.
//!
//! The filesystem is the only source of truth. Every mutation keeps the
//! directory-page encoding intact:
//!
//! ```text
//! save("a/b") with "a" a plain file:
//!
//!   a            ->  .a.staging  ->  a/       (mkdir)
//!                                    a/_      (old body of "a")
//!                                    a/b      (new page)
//!
//! delete("a/b") with "a/" holding only "_":
//!
//!   a/_  ->  .a.staging  ->  a                (directory removed)
//! ```
//!
//! Mutations take the store-wide write lock, reads take the read lock. The
//! multi-step rename/mkdir sequences are therefore never observed halfway by
//! another caller of the same store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use parking_lot::RwLock;

use crate::address::{PageAddress, PathCodec, RESERVED, validate_segment};
use crate::debug;
use crate::error::StorageError;
use crate::utils::fs::{read_optional, write_atomic};

/// One level of a directory listing, each half sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub directories: Vec<String>,
    pub files: Vec<String>,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }

    /// All child names, merged and sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .directories
            .iter()
            .chain(&self.files)
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }
}

/// Content of a directory as seen by the collapse walk.
enum DirState {
    Empty,
    BodyOnly,
    Occupied,
}

/// CRUD over the page tree rooted at the storage directory.
#[derive(Debug)]
pub struct PageStore {
    codec: PathCodec,
    lock: RwLock<()>,
}

impl PageStore {
    /// Open a store, creating the root directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let codec = PathCodec::new(root);
        fs::create_dir_all(codec.root()).map_err(StorageError::io("create", codec.root()))?;
        Ok(Self {
            codec,
            lock: RwLock::new(()),
        })
    }

    #[inline]
    pub fn codec(&self) -> &PathCodec {
        &self.codec
    }

    /// True if the page exists as a file or as a directory. The root always exists.
    pub fn exists(&self, address: &PageAddress) -> bool {
        let _guard = self.lock.read();
        address.is_root() || self.codec.slot(address).exists()
    }

    /// True if the page is stored as a directory.
    pub fn is_directory(&self, address: &PageAddress) -> bool {
        let _guard = self.lock.read();
        self.codec.slot(address).is_dir()
    }

    /// Page body; empty for a missing page or a directory-page without `_`.
    pub fn read(&self, address: &PageAddress) -> Result<String, StorageError> {
        let _guard = self.lock.read();
        let path = self.codec.to_fs_path(address);
        Ok(read_optional(&path)
            .map_err(StorageError::io("read", &path))?
            .unwrap_or_default())
    }

    /// Modification time of the page body, if it has one.
    pub fn modified(&self, address: &PageAddress) -> Option<SystemTime> {
        let _guard = self.lock.read();
        fs::metadata(self.codec.to_fs_path(address))
            .and_then(|meta| meta.modified())
            .ok()
    }

    /// Children one level below `address`.
    ///
    /// Excludes the reserved `_` body, staging entries and anything that is
    /// not a legal address segment. Empty if `address` is not a directory.
    pub fn list_children(&self, address: &PageAddress) -> Result<Listing, StorageError> {
        let _guard = self.lock.read();
        let dir = self.codec.slot(address);
        if !dir.is_dir() {
            return Ok(Listing::default());
        }

        let mut listing = Listing::default();
        let entries = fs::read_dir(&dir).map_err(StorageError::io("list", &dir))?;
        for entry in entries {
            let entry = entry.map_err(StorageError::io("list", &dir))?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if validate_segment(&name, &name).is_err() {
                continue;
            }
            let file_type = entry.file_type().map_err(StorageError::io("stat", entry.path()))?;
            if file_type.is_dir() {
                listing.directories.push(name);
            } else {
                listing.files.push(name);
            }
        }
        listing.directories.sort_unstable();
        listing.files.sort_unstable();
        Ok(listing)
    }

    /// Write a page body, scaffolding directories from the root down.
    ///
    /// A plain file sitting where a directory is needed is converted into a
    /// directory-page that keeps its body in `_`.
    pub fn save(&self, address: &PageAddress, content: &str) -> Result<(), StorageError> {
        let _guard = self.lock.write();
        self.scaffold_parents(address)?;
        let path = self.codec.to_fs_path(address);
        write_atomic(&path, content.as_bytes()).map_err(StorageError::io("write", &path))?;
        debug!("store"; "wrote {}", path.display());
        Ok(())
    }

    /// Remove a page and collapse ancestors left effectively empty.
    ///
    /// Returns `false` if there was nothing to delete, including a
    /// directory-page without a body. A directory-page loses its body; the
    /// directory itself survives while it still has children.
    pub fn delete(&self, address: &PageAddress) -> Result<bool, StorageError> {
        if address.is_root() {
            return Err(StorageError::RootImmutable);
        }
        let _guard = self.lock.write();
        let slot = self.codec.slot(address);

        let start = match fs::symlink_metadata(&slot) {
            Ok(meta) if meta.is_dir() => {
                let body = slot.join(RESERVED);
                if !remove_file_if_exists(&body).map_err(StorageError::io("remove", &body))? {
                    return Ok(false);
                }
                address.clone()
            }
            Ok(_) => {
                fs::remove_file(&slot).map_err(StorageError::io("remove", &slot))?;
                address.parent().unwrap_or_default()
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
                return Ok(false);
            }
            Err(e) => return Err(StorageError::io("stat", &slot)(e)),
        };

        debug!("store"; "removed {}", address);
        self.collapse_from(start)?;
        Ok(true)
    }

    /// Move a page (and its whole subtree) to a new address.
    ///
    /// Returns `false` if `from` does not exist.
    pub fn rename(&self, from: &PageAddress, to: &PageAddress) -> Result<bool, StorageError> {
        if from.is_root() || to.is_root() {
            return Err(StorageError::RootImmutable);
        }
        if from == to {
            return Ok(self.exists(from));
        }
        if to.is_descendant_of(from) {
            return Err(StorageError::IntoDescendant {
                from: from.clone(),
                to: to.clone(),
            });
        }

        let _guard = self.lock.write();
        let from_slot = self.codec.slot(from);
        if !from_slot.exists() {
            return Ok(false);
        }
        let to_slot = self.codec.slot(to);
        if to_slot.exists() {
            return Err(StorageError::Conflict(to.clone()));
        }

        self.scaffold_parents(to)?;
        fs::rename(&from_slot, &to_slot).map_err(StorageError::io("rename", &from_slot))?;
        debug!("store"; "moved {} -> {}", from, to);

        if let Some(parent) = from.parent() {
            self.collapse_from(parent)?;
        }
        Ok(true)
    }

    // ------------------------------------------------------------------------
    // structural helpers (caller holds the write lock)
    // ------------------------------------------------------------------------

    /// Ensure every proper ancestor slot of `address` is a directory.
    fn scaffold_parents(&self, address: &PageAddress) -> Result<(), StorageError> {
        let root = self.codec.root();
        fs::create_dir_all(root).map_err(StorageError::io("create", root))?;

        let segments: Vec<&str> = address.segments().collect();
        let Some((_, parents)) = segments.split_last() else {
            return Ok(());
        };

        let mut slot = root.to_path_buf();
        for segment in parents {
            slot.push(segment);
            ensure_dir(&slot)?;
        }
        Ok(())
    }

    /// Walk upward from `start`, collapsing effectively empty directories.
    ///
    /// Stops at the first directory that still holds children, at a slot
    /// that is not a directory, or at the root.
    fn collapse_from(&self, start: PageAddress) -> Result<(), StorageError> {
        for address in std::iter::successors(Some(start), PageAddress::parent) {
            if address.is_root() {
                break;
            }
            let slot = self.codec.slot(&address);
            if !slot.is_dir() {
                break;
            }

            match dir_state(&slot).map_err(StorageError::io("list", &slot))? {
                DirState::Occupied => break,
                DirState::Empty => {
                    fs::remove_dir(&slot).map_err(StorageError::io("remove", &slot))?;
                    debug!("store"; "removed empty {}", address);
                }
                DirState::BodyOnly => {
                    collapse_body(&slot)?;
                    debug!("store"; "collapsed {}", address);
                }
            }
        }
        Ok(())
    }
}

/// Staging name beside `slot`. Dot-prefixed, so never a legal page name.
fn staging_path(slot: &Path) -> PathBuf {
    let name = slot
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    slot.with_file_name(format!(".{name}.staging"))
}

/// Make `slot` a directory, converting a plain file into a directory-page.
///
/// A staging file left behind by an interrupted conversion is picked up, so
/// retrying a failed save continues where it stopped.
fn ensure_dir(slot: &Path) -> Result<(), StorageError> {
    let staging = staging_path(slot);

    match fs::symlink_metadata(slot) {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => {
            fs::rename(slot, &staging).map_err(StorageError::io("rename", slot))?;
            fs::create_dir(slot).map_err(StorageError::io("mkdir", slot))?;
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir(slot).map_err(StorageError::io("mkdir", slot))?;
        }
        Err(e) => return Err(StorageError::io("stat", slot)(e)),
    }

    if staging.is_file() {
        let body = slot.join(RESERVED);
        fs::rename(&staging, &body).map_err(StorageError::io("rename", &staging))?;
        debug!("store"; "converted {} into a directory", slot.display());
    }
    Ok(())
}

/// Turn `slot/` holding only `_` back into a plain file (or nothing, if `_`
/// is empty).
fn collapse_body(slot: &Path) -> Result<(), StorageError> {
    let body = slot.join(RESERVED);
    let has_content = fs::metadata(&body)
        .map(|meta| meta.len() > 0)
        .map_err(StorageError::io("stat", &body))?;

    if !has_content {
        fs::remove_file(&body).map_err(StorageError::io("remove", &body))?;
        return fs::remove_dir(slot).map_err(StorageError::io("remove", slot));
    }

    let staging = staging_path(slot);
    fs::rename(&body, &staging).map_err(StorageError::io("rename", &body))?;
    fs::remove_dir(slot).map_err(StorageError::io("remove", slot))?;
    fs::rename(&staging, slot).map_err(StorageError::io("rename", &staging))
}

fn dir_state(dir: &Path) -> io::Result<DirState> {
    let mut state = DirState::Empty;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name() == RESERVED && entry.file_type()?.is_file() {
            state = DirState::BodyOnly;
        } else {
            return Ok(DirState::Occupied);
        }
    }
    Ok(state)
}

/// `Ok(false)` when there was no file to remove.
fn remove_file_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
