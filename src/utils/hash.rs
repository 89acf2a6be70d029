//! Hashing utilities.
//!
//! - [`ContentHash`]: blake3 digest used as the generated-asset cache key
//! - [`fingerprint`]: short FxHash fingerprint for deterministic element ids
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let key = hash::ContentHash::of_parts(&["latex-preview", source]); // -> 64 hex chars
//! let id = hash::fingerprint(content); // -> "a1b2c3d4"
//! ```

use std::hash::Hasher;

use rustc_hash::FxHasher;

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hash a sequence of parts, NUL-separated so `("ab", "c")` and
    /// `("a", "bc")` never collide.
    pub fn of_parts(parts: &[&str]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                hasher.update(&[0]);
            }
            hasher.update(part.as_bytes());
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Get the raw bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full lowercase hex form, used as the cache file stem.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Display first 16 chars of hex for brevity
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Compute 64-bit hash from byte data.
#[inline]
pub fn compute<T: AsRef<[u8]> + ?Sized>(data: &T) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_ref());
    hasher.finish()
}

/// Compute hash and return as 8-char hex fingerprint.
#[inline]
pub fn fingerprint<T: AsRef<[u8]> + ?Sized>(value: &T) -> String {
    format!("{:016x}", compute(value))[..8].to_string()
}
