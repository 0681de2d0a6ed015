// SPDX-License-Identifier: Apache-2.0
//! Opaque content-hash labels.
//!
//! A [`Hash`] is never constructed by the engine itself — it is always
//! handed back by a [`crate::Storage`] implementation at save time. The
//! engine only ever compares hashes for bit-exact equality and orders them
//! lexicographically; it never inspects their contents.

use std::fmt;

/// Sentinel value for an unset parent link (root Content nodes, all
/// Aggregates). Never produced by a conforming `Storage::save`.
pub const HASH_NOT_SET: &str = "HASH_NOT_SET";

/// An opaque, store-assigned content hash.
///
/// Thin newtype over an owned string so the sentinel (`HASH_NOT_SET`) and
/// a real digest share one representation — callers only ever test
/// equality against it, never parse it. `Ord`/`PartialOrd` give the
/// lexicographic ordering the replica relies on for sorted
/// `loose_ends`/`predecessors`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash(String);

impl Hash {
    /// Wrap a store-assigned digest.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The `HASH_NOT_SET` sentinel: parent-of-root, parent-of-Aggregate.
    pub fn unset() -> Self {
        Self(HASH_NOT_SET.to_string())
    }

    /// `true` if this is the unset sentinel.
    pub fn is_unset(&self) -> bool {
        self.0 == HASH_NOT_SET
    }

    /// Borrow the underlying text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Hash {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Hash {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
