// SPDX-License-Identifier: Apache-2.0
//! Shared test doubles, builders, and a deterministic PRNG for exercising
//! `chronotree-core` without every test crate re-inventing them.
//!
//! # Modules
//!
//! - [`rng`] — deterministic xorshift64* PRNG for reproducible scenarios
//! - [`post`] — builder for `(parent, payload)` pairs
//! - [`convergence`] — digest helpers for comparing replica state
//! - [`shared`] — `Rc<RefCell<S>>`-backed `Storage` handle for multi-replica tests
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

pub mod convergence;
pub mod post;
pub mod rng;
pub mod shared;

pub use convergence::{known_nodes_digest, loose_ends_digest, random_known_content_hash};
pub use post::{payload, PostBuilder};
pub use rng::DeterministicRng;
pub use shared::SharedStore;
