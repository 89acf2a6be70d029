//! Page address space.
//!
//! A [`PageAddress`] is the logical, slash-delimited name of a wiki page,
//! independent of how the page is laid out on disk:
//!
//! ```text
//! Address          Filesystem (under storage root)
//! =======          ===============================
//! ""  (root)   <-> ./_                (root is always a directory)
//! guide        <-> ./guide            (leaf page: plain file)
//! guide        <-> ./guide/_          (directory-page: reserved body file)
//! guide/intro  <-> ./guide/intro
//! ```
//!
//! # Module Structure
//!
//! - [`codec`]: address <-> filesystem path mapping
//!
//! # Segment rules
//!
//! Segments are non-empty runs of `[A-Za-z0-9_-]` and may not be the
//! reserved marker `_`. Because `.` is never legal, dot-prefixed names are
//! free for the store's staging entries and can never collide with a page.

pub mod codec;

pub use codec::{PathCodec, RESERVED};

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Address validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address `{0}` contains an empty segment")]
    EmptySegment(String),

    #[error("address `{0}` uses the reserved segment `_`")]
    Reserved(String),

    #[error("address `{address}` contains illegal character {ch:?}")]
    IllegalChar { address: String, ch: char },

    #[error("path `{0}` is outside the storage root")]
    OutsideRoot(String),
}

/// Logical page address (`""` is the root).
///
/// Invariants:
/// - No leading or trailing `/`
/// - Every segment passes [`validate_segment`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PageAddress(String);

impl PageAddress {
    /// The wiki root.
    pub const fn root() -> Self {
        Self(String::new())
    }

    /// Parse a user- or route-supplied address.
    ///
    /// Accepts the route form (`/a/b/`) as well as the bare form (`a/b`).
    /// Interior empty segments (`a//b`) are rejected, not collapsed.
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        for segment in trimmed.split('/') {
            validate_segment(segment, raw)?;
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Build the child address `self/name`.
    pub fn child(&self, name: &str) -> Result<Self, AddressError> {
        validate_segment(name, name)?;
        if self.is_root() {
            Ok(Self(name.to_string()))
        } else {
            Ok(Self(format!("{}/{}", self.0, name)))
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Segments from the root down. Empty for the root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Last segment, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.0.rsplit('/').next()
        }
    }

    /// All segments but the last; `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rsplit_once('/') {
            Some((parent, _)) => Some(Self(parent.to_string())),
            None => Some(Self::root()),
        }
    }

    /// Proper ancestors, nearest first, ending with the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> {
        std::iter::successors(self.parent(), Self::parent)
    }

    /// True if `self` lies strictly below `other`.
    pub fn is_descendant_of(&self, other: &Self) -> bool {
        if other.is_root() {
            return !self.is_root();
        }
        self.0.len() > other.0.len()
            && self.0.starts_with(other.as_str())
            && self.0.as_bytes()[other.0.len()] == b'/'
    }

    /// Absolute form used inside cross-reference tokens: `/a/b` (root is `/`).
    pub fn absolute(&self) -> String {
        format!("/{}", self.0)
    }

    /// Route form with trailing slash: `a/b/` (root is the empty string).
    pub fn route_path(&self) -> String {
        if self.is_root() {
            String::new()
        } else {
            format!("{}/", self.0)
        }
    }

    /// Split a series member name (`topic_002`) into `("topic", 2)`.
    ///
    /// Only the final segment is inspected; the suffix must be exactly three
    /// ASCII digits.
    pub fn series_key(&self) -> Option<(&str, u16)> {
        let name = self.name()?;
        let (prefix, digits) = name.rsplit_once('_')?;
        if digits.len() != 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some((prefix, digits.parse().ok()?))
    }
}

impl fmt::Display for PageAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.absolute())
    }
}

impl std::str::FromStr for PageAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Check a single address segment.
pub fn validate_segment(segment: &str, address: &str) -> Result<(), AddressError> {
    if segment.is_empty() {
        return Err(AddressError::EmptySegment(address.to_string()));
    }
    if segment == RESERVED {
        return Err(AddressError::Reserved(address.to_string()));
    }
    if let Some(ch) = segment
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(AddressError::IllegalChar {
            address: address.to_string(),
            ch,
        });
    }
    Ok(())
}
