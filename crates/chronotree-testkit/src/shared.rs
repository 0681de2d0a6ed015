// SPDX-License-Identifier: Apache-2.0
//! A cheaply-cloneable `Storage` wrapper so multiple `ChronoTree` replicas
//! in one test can share a single backing store: replicas are independent
//! values sharing only the `Storage` instance.
//!
//! `ChronoTree` owns its `Storage` by value, so two independently-evolving
//! replicas that must later `merge` each other's bitter ends need a
//! store both can read every hash through. [`SharedStore`] is an
//! `Rc<RefCell<S>>` handle implementing `Storage` by delegation, so
//! cloning it (cheap — one `Rc` bump) hands a second replica a view onto
//! the same underlying data.

use std::cell::RefCell;
use std::rc::Rc;

use chronotree_core::{Hash, Node, Storage};

/// A shared handle onto a single `Storage` backend, for multi-replica
/// tests. Not `Send`/`Sync` — single-threaded test harness use only.
#[derive(Debug)]
pub struct SharedStore<S>(Rc<RefCell<S>>);

impl<S> SharedStore<S> {
    /// Wrap `store` for sharing across multiple `ChronoTree` replicas.
    pub fn new(store: S) -> Self {
        Self(Rc::new(RefCell::new(store)))
    }
}

impl<S> Clone for SharedStore<S> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<S: Storage> Storage for SharedStore<S> {
    type Error = S::Error;

    fn save(&mut self, node: Node, tree_name: Option<&str>) -> Result<Hash, Self::Error> {
        self.0.borrow_mut().save(node, tree_name)
    }

    fn find(&self, hash: &Hash, tree_name: Option<&str>) -> Result<Node, Self::Error> {
        self.0.borrow().find(hash, tree_name)
    }

    fn delete(&mut self, hash: &Hash, tree_name: Option<&str>) -> Result<(), Self::Error> {
        self.0.borrow_mut().delete(hash, tree_name)
    }
}
