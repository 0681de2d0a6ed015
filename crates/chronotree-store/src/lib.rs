// SPDX-License-Identifier: Apache-2.0
//! In-memory `Storage` backend for `chronotree-core`.
//!
//! [`MemoryStore`] is a reference implementation: nodes are keyed by the
//! SHA-1 digest of a canonical CBOR encoding of their fields, and every
//! assigned hash is additionally recorded in an append-only log for
//! diagnostics. It makes no correctness claims of its own — it exists so
//! `chronotree-core` is exercisable and testable.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions
)]

use std::collections::HashMap;

use chronotree_core::{Hash, Node, Storage};
use serde::Serialize;
use sha1::{Digest, Sha1};

/// Failure causes for [`MemoryStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `find` or `delete` referenced a hash never saved (or already
    /// deleted) in this store.
    #[error("[STORE_NOT_FOUND] {hash} is not present in this store")]
    NotFound {
        /// The hash that was looked up.
        hash: Hash,
    },

    /// Canonical encoding of a node's fields failed. Should not occur for
    /// well-formed `Node` values; surfaced rather than panicking.
    #[error("[STORE_ENCODE_FAILURE] failed to canonically encode node: {0}")]
    Encode(String),
}

/// Advisory configuration for [`MemoryStore`].
///
/// Mirrors the advisory-budget pattern used elsewhere in this codebase for
/// in-memory tiers: exceeding `max_bytes` never fails a `save`, it only
/// flips [`MemoryStore::is_over_budget`]. Enforcement (eviction) is left to
/// callers, since Content nodes in a ChronoTree are defined to live forever
/// and this engine performs no garbage collection.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Advisory total-bytes-stored budget.
    pub max_bytes: Option<usize>,
}

/// In-memory, content-addressed `Storage` backend.
pub struct MemoryStore {
    nodes: HashMap<Hash, Node>,
    /// Append-only log of every hash ever assigned, in save order.
    log: Vec<Hash>,
    byte_count: usize,
    config: StoreConfig,
}

impl MemoryStore {
    /// Create an empty store with no byte budget.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with the given advisory configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            nodes: HashMap::new(),
            log: Vec::new(),
            byte_count: 0,
            config,
        }
    }

    /// Number of distinct nodes currently stored (Aggregates included).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` if no nodes are stored.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The append-only save log, oldest first. Includes hashes of nodes
    /// that were later deleted (Aggregates) — the log is a history, not a
    /// view of current contents.
    pub fn log(&self) -> &[Hash] {
        &self.log
    }

    /// Total canonical-encoding bytes across all currently stored nodes.
    pub fn byte_count(&self) -> usize {
        self.byte_count
    }

    /// `true` if `byte_count` exceeds the configured budget. Always
    /// `false` when no budget was configured.
    pub fn is_over_budget(&self) -> bool {
        self.config.max_bytes.is_some_and(|max| self.byte_count > max)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStore {
    type Error = StoreError;

    fn save(&mut self, node: Node, _tree_name: Option<&str>) -> Result<Hash, Self::Error> {
        let bytes = canonical_bytes(&node)?;
        let hash = hash_bytes(&bytes);

        if !self.nodes.contains_key(&hash) {
            self.byte_count += bytes.len();
            self.nodes.insert(hash.clone(), node.with_hash(hash.clone()));
        }
        self.log.push(hash.clone());
        Ok(hash)
    }

    fn find(&self, hash: &Hash, _tree_name: Option<&str>) -> Result<Node, Self::Error> {
        self.nodes
            .get(hash)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { hash: hash.clone() })
    }

    fn delete(&mut self, hash: &Hash, _tree_name: Option<&str>) -> Result<(), Self::Error> {
        // A no-op on a missing hash is legal: callers may hold `Node`
        // values returned before a concurrent-in-spirit delete, and
        // deletion only ever reclaims transient Aggregates.
        self.nodes.remove(hash);
        Ok(())
    }
}

/// Canonical CBOR encoding of a node's hashable fields (everything except
/// its own `hash`), mirroring the `to_canonical_bytes` pattern used for
/// deterministic hashing elsewhere in this codebase. `Node`/`Hash` stay
/// free of a `serde` dependency; this shape is private to the store.
#[derive(Serialize)]
struct CanonicalNode<'a> {
    kind: CanonicalKind,
    parent: &'a str,
    predecessors: Vec<&'a str>,
    payload: Option<&'a [u8]>,
}

#[derive(Serialize)]
enum CanonicalKind {
    Content,
    Aggregate,
}

fn canonical_bytes(node: &Node) -> Result<Vec<u8>, StoreError> {
    let canon = CanonicalNode {
        kind: if node.is_content() {
            CanonicalKind::Content
        } else {
            CanonicalKind::Aggregate
        },
        parent: node.parent().as_str(),
        predecessors: node.predecessors().iter().map(Hash::as_str).collect(),
        payload: node.payload(),
    };
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(&canon, &mut bytes).map_err(|e| StoreError::Encode(e.to_string()))?;
    Ok(bytes)
}

fn hash_bytes(bytes: &[u8]) -> Hash {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    Hash::new(hex_encode(&digest))
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // `write!` into a `String` never fails.
        let _ = write!(out, "{byte:02x}");
    }
    out
}
