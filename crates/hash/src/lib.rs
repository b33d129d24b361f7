#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! MD5 content hashing for modman
//!
//! The remote catalog publishes one MD5 digest per archive member. These
//! digests detect truncated or damaged downloads; they are not a security
//! boundary. The same digest is used to derive a stable identity for
//! archives that carry no self-description.

use md5::{Digest, Md5};
use std::fmt;

/// An MD5 digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash {
    bytes: [u8; 16],
}

impl ContentHash {
    fn from_digest(hasher: Md5) -> Self {
        Self {
            bytes: hasher.finalize().into(),
        }
    }

    /// Lowercase hex encoding
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Compute the hash of a byte slice
    #[must_use]
    pub fn from_data(data: &[u8]) -> Self {
        let mut hasher = Md5::new();
        hasher.update(data);
        Self::from_digest(hasher)
    }

    /// Whether this digest equals a hex string published by the catalog
    ///
    /// Catalog digests are not consistently lowercase, so the comparison
    /// ignores case. Malformed hex never matches.
    #[must_use]
    pub fn matches_hex(&self, expected: &str) -> bool {
        self.to_hex().eq_ignore_ascii_case(expected.trim())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Stable identity for an archive layout: the hash of its sorted member names
///
/// Importing the same archive twice yields the same key regardless of the
/// order in which the archive lists its members.
#[must_use]
pub fn layout_key<S: AsRef<str>>(member_names: &[S]) -> ContentHash {
    let mut names: Vec<&str> = member_names.iter().map(AsRef::as_ref).collect();
    names.sort_unstable();

    let mut hasher = Md5::new();
    for name in names {
        hasher.update(name.as_bytes());
    }
    ContentHash::from_digest(hasher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_basics() {
        // Known MD5 of "hello world"
        let hash = ContentHash::from_data(b"hello world");
        assert_eq!(hash.to_hex(), "5eb63bbbe01eeed093cb22bb8f5acdc3");
        assert_eq!(hash.to_string(), hash.to_hex());
    }

    #[test]
    fn test_layout_key_is_order_independent() {
        let a = layout_key(&["Plugins/A.dll", "Libs/B.dll"]);
        let b = layout_key(&["Libs/B.dll", "Plugins/A.dll"]);
        assert_eq!(a, b);
        assert_ne!(a, layout_key(&["Plugins/A.dll"]));
    }
}
