// SPDX-License-Identifier: Apache-2.0
//! The external content-addressable store contract.

use crate::node::Node;
use std::error::Error as StdError;

/// Capability object for a content-addressable byte store keyed by
/// [`crate::Hash`]. Any backend satisfying this contract may be used as a
/// ChronoTree's backing store — an in-memory `HashMap`, an on-disk CAS, or
/// a remote service behind a blocking adapter.
///
/// `tree_name` is an advisory diagnostic label with no semantic effect;
/// implementations may ignore it entirely.
pub trait Storage {
    /// Backend-specific failure cause (I/O error, corruption, capacity).
    type Error: StdError + Send + Sync + 'static;

    /// Persist `node` and return its newly assigned hash.
    ///
    /// Implementations MUST clear `node`'s own `hash` field to the unset
    /// sentinel before computing the digest, so the digest is a pure
    /// function of `type`/`parent`/`predecessors`/payload. Saving
    /// identical logical content twice must return equal hashes.
    fn save(&mut self, node: Node, tree_name: Option<&str>) -> Result<crate::Hash, Self::Error>;

    /// Retrieve the node previously saved under `hash`.
    ///
    /// # Errors
    ///
    /// Returns a backend-defined error if `hash` was never saved (or was
    /// deleted and never re-saved).
    fn find(&self, hash: &crate::Hash, tree_name: Option<&str>) -> Result<Node, Self::Error>;

    /// Remove the hash → node mapping for `hash`.
    ///
    /// MAY be a no-op: Content nodes live forever and are never deleted by
    /// the engine; only Aggregates are ever passed here. Must not
    /// invalidate `Node` values callers already hold.
    fn delete(&mut self, hash: &crate::Hash, tree_name: Option<&str>) -> Result<(), Self::Error>;
}
