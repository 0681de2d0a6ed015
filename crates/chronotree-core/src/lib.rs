// SPDX-License-Identifier: Apache-2.0
//! ChronoTree: a content-addressed, append-only DAG of immutable posts with
//! convergent, order-independent merging across replicas.
//!
//! This crate is the merge/bitter-end engine only: the [`Node`] data model,
//! the [`Storage`] contract an external content-addressable store must
//! satisfy, and the [`ChronoTree`] replica that folds a foreign digest into
//! its own state while maintaining the invariants that make merging
//! commutative, associative, and idempotent.
//!
//! No storage backend, transport, or identity/auth layer lives here — see
//! `chronotree-store` for a reference in-memory `Storage` implementation
//! and `chronotree-testkit` for deterministic test fixtures.
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
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions
)]

mod error;
mod hash;
mod node;
mod replica;
mod storage;

pub use error::ChronoError;
pub use hash::{Hash, HASH_NOT_SET};
pub use node::Node;
pub use replica::ChronoTree;
pub use storage::Storage;
