// SPDX-License-Identifier: Apache-2.0
//! Error taxonomy for the ChronoTree engine.
//!
//! Mirrors the small, exhaustive, structured-field style used by
//! `echo-cas::CasError` elsewhere in this codebase rather than
//! stringly-typed errors: callers match on variants, not message text.

use crate::hash::Hash;

/// Errors raised by [`crate::ChronoTree`] operations.
///
/// The `Storage` variants wrap a backend-defined error type so a store
/// implementation can carry I/O errors, capacity errors, or corruption
/// details without this crate knowing about them.
#[derive(Debug, thiserror::Error)]
pub enum ChronoError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// `get_node` (or internal traversal) referenced a hash absent from
    /// `known_nodes`.
    #[error("[CHRONO_UNKNOWN_HASH] {hash} is not a known node")]
    UnknownHash {
        /// The hash that was looked up.
        hash: Hash,
    },

    /// `Storage::find` could not retrieve an ancestor hash referenced by a
    /// known or freshly-fetched node. Fatal for the operation in progress.
    #[error("[CHRONO_STORAGE_NOT_FOUND] ancestor {hash} unavailable in storage: {source}")]
    StorageNotFound {
        /// The hash that could not be retrieved.
        hash: Hash,
        /// The underlying storage failure.
        #[source]
        source: E,
    },

    /// `Storage::save` failed while persisting a new Content or Aggregate
    /// node. Fatal for the operation in progress.
    #[error("[CHRONO_STORAGE_SAVE_FAILURE] save failed: {source}")]
    StorageSave {
        /// The underlying storage failure.
        #[source]
        source: E,
    },

    /// `Storage::delete` failed while reclaiming a superseded Aggregate.
    /// Fatal for the operation in progress — deletion failures still
    /// invalidate the in-progress mutation because the in-memory
    /// `bitter_end` reassignment has not yet happened.
    #[error("[CHRONO_STORAGE_DELETE_FAILURE] delete failed: {source}")]
    StorageDelete {
        /// The underlying storage failure.
        #[source]
        source: E,
    },

    /// Raised by `add` when the given parent hash is set but not present
    /// in `known_nodes`.
    #[error("[CHRONO_INVALID_INPUT] {reason}")]
    InvalidInput {
        /// Human-readable explanation of what was invalid.
        reason: String,
    },
}
