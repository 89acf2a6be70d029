//! Address <-> filesystem path mapping.
//!
//! Pure path arithmetic plus a single `is_dir` probe: a page is addressed
//! at its *slot* (`root/a/b`); when the slot is a directory the page body
//! lives in the reserved child file `_`.

use std::path::{Component, Path, PathBuf};

use super::{AddressError, PageAddress};

/// Reserved body file of a directory-page.
pub const RESERVED: &str = "_";

/// Maps page addresses onto a storage root.
#[derive(Debug, Clone)]
pub struct PathCodec {
    root: PathBuf,
}

impl PathCodec {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory entry that represents the page (file or directory).
    pub fn slot(&self, address: &PageAddress) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(address.segments());
        path
    }

    /// File holding the page body.
    ///
    /// `slot/_` when the slot is an existing directory (always for the root),
    /// otherwise the slot itself.
    pub fn to_fs_path(&self, address: &PageAddress) -> PathBuf {
        let slot = self.slot(address);
        if address.is_root() || slot.is_dir() {
            slot.join(RESERVED)
        } else {
            slot
        }
    }

    /// Inverse of [`to_fs_path`](Self::to_fs_path).
    ///
    /// Accepts either the slot or the reserved body file.
    pub fn to_address(&self, path: &Path) -> Result<PageAddress, AddressError> {
        let rel = path
            .strip_prefix(&self.root)
            .map_err(|_| AddressError::OutsideRoot(path.display().to_string()))?;

        let mut segments: Vec<&str> = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(name) => match name.to_str() {
                    Some(name) => segments.push(name),
                    None => {
                        return Err(AddressError::IllegalChar {
                            address: path.display().to_string(),
                            ch: char::REPLACEMENT_CHARACTER,
                        });
                    }
                },
                Component::CurDir => {}
                _ => return Err(AddressError::OutsideRoot(path.display().to_string())),
            }
        }

        if segments.last() == Some(&RESERVED) {
            segments.pop();
        }
        PageAddress::parse(&segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn addr(s: &str) -> PageAddress {
        PageAddress::parse(s).unwrap()
    }

    #[test]
    fn test_plain_mapping() {
        let codec = PathCodec::new("/srv/wiki");
        assert_eq!(codec.slot(&addr("a/b")), PathBuf::from("/srv/wiki/a/b"));
        assert_eq!(codec.to_fs_path(&PageAddress::root()), PathBuf::from("/srv/wiki/_"));
    }

    #[test]
    fn test_to_address_strips_reserved() {
        let codec = PathCodec::new("/srv/wiki");
        assert_eq!(codec.to_address(Path::new("/srv/wiki/a/_")).unwrap(), addr("a"));
        assert_eq!(codec.to_address(Path::new("/srv/wiki/a/b")).unwrap(), addr("a/b"));
        assert_eq!(codec.to_address(Path::new("/srv/wiki/_")).unwrap(), PageAddress::root());
        assert!(matches!(
            codec.to_address(Path::new("/elsewhere/a")),
            Err(AddressError::OutsideRoot(_))
        ));
    }

    #[test]
    fn test_roundtrip_across_representations() {
        let dir = TempDir::new().unwrap();
        let codec = PathCodec::new(dir.path());
        let page = addr("guide");

        // Absent: slot path
        assert_eq!(codec.to_address(&codec.to_fs_path(&page)).unwrap(), page);

        // Plain file
        fs::write(codec.slot(&page), "body").unwrap();
        assert_eq!(codec.to_fs_path(&page), dir.path().join("guide"));
        assert_eq!(codec.to_address(&codec.to_fs_path(&page)).unwrap(), page);

        // Directory-page
        fs::remove_file(codec.slot(&page)).unwrap();
        fs::create_dir(codec.slot(&page)).unwrap();
        assert_eq!(codec.to_fs_path(&page), dir.path().join("guide").join("_"));
        assert_eq!(codec.to_address(&codec.to_fs_path(&page)).unwrap(), page);
    }
}
