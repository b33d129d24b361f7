//! Dotted numeric versions
//!
//! Versions are ordered sequences of non-negative integers compared
//! component-wise from the left. A shorter sequence compares as if it were
//! padded with zeros, so `1.2` equals `1.2.0` and sorts before `1.2.1`.
//! There is no constraint solving: the only questions asked of a version
//! are "is it the same" and "is the remote one newer".

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a dotted version string contains a non-numeric part
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version '{input}'")]
pub struct ParseVersionError {
    pub input: String,
}

/// A dotted numeric version such as `1.13.2`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(Vec<u64>);

impl Version {
    /// Build a version from its components
    #[must_use]
    pub fn new(components: impl Into<Vec<u64>>) -> Self {
        Self(components.into())
    }

    /// Parse a dotted string, falling back to `0.0.0` when it is malformed
    #[must_use]
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// The raw components
    #[must_use]
    pub fn components(&self) -> &[u64] {
        &self.0
    }

    fn significant(&self) -> &[u64] {
        let end = self
            .0
            .iter()
            .rposition(|c| *c != 0)
            .map_or(0, |idx| idx + 1);
        &self.0[..end]
    }
}

impl Default for Version {
    fn default() -> Self {
        Self(vec![0, 0, 0])
    }
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseVersionError {
                input: s.to_string(),
            });
        }

        trimmed
            .split('.')
            .map(str::parse::<u64>)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|_| ParseVersionError {
                input: s.to_string(),
            })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        for idx in 0..len {
            let a = self.0.get(idx).copied().unwrap_or(0);
            let b = other.0.get(idx).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Trailing zeros are insignificant for equality, so they must be for hashing too
        self.significant().hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}
