// SPDX-License-Identifier: Apache-2.0
//! Ergonomic construction of Content-node inputs for tests.

use chronotree_core::Hash;

/// Fluent builder for `(parent, payload)` pairs handed to
/// `ChronoTree::add`, mirroring this codebase's existing builder-pattern
/// test fixtures (`FootprintBuilder`, `SnapshotBuilder`, and friends).
#[derive(Debug, Clone, Default)]
pub struct PostBuilder {
    parent: Option<Hash>,
    text: String,
}

impl PostBuilder {
    /// Start building a root post (no parent) with empty text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the post this one replies to.
    pub fn parent(mut self, parent: Hash) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the post body text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Finish building, returning `(parent, payload)` ready for
    /// `ChronoTree::add`.
    pub fn build(self) -> (Hash, Vec<u8>) {
        (self.parent.unwrap_or_else(Hash::unset), self.text.into_bytes())
    }
}

/// Shorthand for a root post's payload bytes.
pub fn payload(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}
