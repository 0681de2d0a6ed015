// SPDX-License-Identifier: Apache-2.0
//! The immutable Node value type: Content vs. Aggregate.

use crate::hash::Hash;

/// An immutable DAG node: either a user-authored [`Node::Content`] post or a
/// content-free [`Node::Aggregate`] summarising a set of loose ends.
///
/// Modeled as a sum type (rather than a trait object or a single struct with
/// an optional payload) so pattern matching on node kind is exhaustive and
/// Aggregates structurally cannot carry a payload. `parent` is still present
/// on the Aggregate variant (every Node shares the same observable header)
/// but every constructor pins it to [`Hash::unset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A user-authored post. Persists forever once saved.
    Content {
        /// This node's own hash, set by `Storage::save`. `Hash::unset()`
        /// for a value under construction that has not yet been saved.
        hash: Hash,
        /// The Content node this one replies to, or `Hash::unset()` for a
        /// root post.
        parent: Hash,
        /// Loose ends that existed immediately before this node was
        /// created, sorted lexicographically.
        predecessors: Vec<Hash>,
        /// Opaque application payload. Never inspected by the engine.
        payload: Vec<u8>,
    },
    /// A content-free node naming the current set of loose ends.
    /// Transient: deleted as soon as a subsequent operation replaces it.
    Aggregate {
        /// This node's own hash, set by `Storage::save`.
        hash: Hash,
        /// Always `Hash::unset()` — Aggregates have no logical parent.
        parent: Hash,
        /// Loose ends this Aggregate summarises, sorted lexicographically.
        predecessors: Vec<Hash>,
    },
}

impl Node {
    /// Construct a new (unsaved) Content node. `hash` and `predecessors`
    /// are placeholders overwritten by [`crate::ChronoTree::add`]; callers
    /// only need to supply `parent` and `payload`.
    pub fn new_content(parent: Hash, payload: Vec<u8>) -> Self {
        Self::Content {
            hash: Hash::unset(),
            parent,
            predecessors: Vec::new(),
            payload,
        }
    }

    pub(crate) fn new_aggregate(predecessors: Vec<Hash>) -> Self {
        Self::Aggregate {
            hash: Hash::unset(),
            parent: Hash::unset(),
            predecessors,
        }
    }

    /// This node's own hash.
    pub fn hash(&self) -> &Hash {
        match self {
            Self::Content { hash, .. } | Self::Aggregate { hash, .. } => hash,
        }
    }

    /// `true` if this is a Content node.
    pub fn is_content(&self) -> bool {
        matches!(self, Self::Content { .. })
    }

    /// `true` if this is an Aggregate node.
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Self::Aggregate { .. })
    }

    /// The logical parent: the Content node this one replies to. Always
    /// `Hash::unset()` for Aggregates and root Content posts.
    pub fn parent(&self) -> &Hash {
        match self {
            Self::Content { parent, .. } | Self::Aggregate { parent, .. } => parent,
        }
    }

    /// The predecessor list: loose ends that existed just before this node
    /// was created, sorted lexicographically.
    pub fn predecessors(&self) -> &[Hash] {
        match self {
            Self::Content { predecessors, .. } | Self::Aggregate { predecessors, .. } => {
                predecessors
            }
        }
    }

    /// Opaque payload bytes, for Content nodes only.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Self::Content { payload, .. } => Some(payload),
            Self::Aggregate { .. } => None,
        }
    }

    /// Returns a clone of this node with `hash` cleared to the unset
    /// sentinel — what a conforming `Storage::save` must hash over.
    #[must_use]
    pub fn with_hash_cleared(&self) -> Self {
        self.with_hash(Hash::unset())
    }

    /// Returns a clone of this node with `hash` set to `hash` — used by
    /// `Storage` implementations after computing the digest.
    #[must_use]
    pub fn with_hash(&self, hash: Hash) -> Self {
        match self {
            Self::Content {
                parent,
                predecessors,
                payload,
                ..
            } => Self::Content {
                hash,
                parent: parent.clone(),
                predecessors: predecessors.clone(),
                payload: payload.clone(),
            },
            Self::Aggregate { predecessors, .. } => Self::Aggregate {
                hash,
                parent: Hash::unset(),
                predecessors: predecessors.clone(),
            },
        }
    }
}
