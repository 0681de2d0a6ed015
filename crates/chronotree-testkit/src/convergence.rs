// SPDX-License-Identifier: Apache-2.0
//! Convergence-checking helpers for multi-replica tests.

use chronotree_core::{ChronoTree, Hash, Storage};
use sha1::{Digest, Sha1};

use crate::rng::DeterministicRng;

/// A stable digest of a replica's `loose_ends`, independent of the order
/// operations were applied in — used to assert bitter-end determinism and
/// commutativity/associativity properties without comparing `Vec<Hash>`
/// directly.
pub fn loose_ends_digest<S: Storage>(tree: &ChronoTree<S>) -> String {
    let mut buf = String::new();
    for hash in tree.loose_ends() {
        buf.push_str(hash.as_str());
        buf.push('\n');
    }
    hex_sha1(buf.as_bytes())
}

/// A stable digest of a replica's entire `known_nodes` mapping.
/// `ChronoTree::known_nodes` already iterates in sorted-hash order, so this
/// is identical across two replicas that know the same set of nodes
/// regardless of the order each replica learned about them.
pub fn known_nodes_digest<S: Storage>(tree: &ChronoTree<S>) -> String {
    let mut buf = String::new();
    for (hash, node) in tree.known_nodes() {
        buf.push_str(hash.as_str());
        buf.push('|');
        buf.push_str(if node.is_content() { "C" } else { "A" });
        buf.push('|');
        buf.push_str(node.parent().as_str());
        buf.push('|');
        for predecessor in node.predecessors() {
            buf.push_str(predecessor.as_str());
            buf.push(',');
        }
        buf.push('|');
        if let Some(bytes) = node.payload() {
            buf.push_str(&hex_encode(bytes));
        }
        buf.push('\n');
    }
    hex_sha1(buf.as_bytes())
}

/// Pick a pseudo-random known Content hash to reply to, or `None` if the
/// replica has no Content nodes yet (only the seed Aggregate).
pub fn random_known_content_hash<S: Storage>(
    tree: &ChronoTree<S>,
    rng: &mut DeterministicRng,
) -> Option<Hash> {
    let contents: Vec<Hash> = tree
        .known_nodes()
        .iter()
        .filter(|(_, node)| node.is_content())
        .map(|(hash, _)| hash.clone())
        .collect();
    rng.choose(&contents).cloned()
}

fn hex_sha1(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
