// SPDX-License-Identifier: Apache-2.0
//! The ChronoTree replica engine: init/attach, add, and merge.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use tracing::{debug, debug_span, trace};

use crate::error::ChronoError;
use crate::hash::Hash;
use crate::node::Node;
use crate::storage::Storage;

/// A single ChronoTree replica: a `Storage`-backed view of one evolving DAG
/// of posts, tracking the set of current loose ends and the digest that
/// summarises them (the bitter end).
///
/// Not `Sync`-safe across threads calling mutating methods concurrently —
/// callers must supply their own mutual exclusion.
pub struct ChronoTree<S: Storage> {
    storage: S,
    name: Option<String>,
    known_nodes: BTreeMap<Hash, Node>,
    loose_ends: BTreeSet<Hash>,
    bitter_end: Hash,
}

impl<S: Storage> ChronoTree<S> {
    /// Construct a replica backed by `storage`.
    ///
    /// If `head` is `None`, a fresh empty Aggregate is synthesised and
    /// saved, and becomes the initial bitter end. If `head` is `Some`, the
    /// replica attaches to it by walking its ancestor DAG through `storage`.
    ///
    /// # Errors
    ///
    /// Propagates `Storage` failures encountered while seeding (`head =
    /// None`) or while traversing the ancestor DAG (`head = Some`).
    pub fn new(
        mut storage: S,
        head: Option<Hash>,
        name: Option<String>,
    ) -> Result<Self, ChronoError<S::Error>> {
        let span = debug_span!("chronotree_init", name = name.as_deref().unwrap_or(""));
        let _enter = span.enter();

        let mut known_nodes = BTreeMap::new();
        let tree_name = name.as_deref();

        let bitter_end = match head {
            None => {
                debug!("seeding empty replica with a fresh empty Aggregate");
                let empty_aggregate = Node::new_aggregate(Vec::new());
                let hash = storage
                    .save(empty_aggregate.clone(), tree_name)
                    .map_err(|source| ChronoError::StorageSave { source })?;
                known_nodes.insert(hash.clone(), empty_aggregate.with_hash(hash.clone()));
                hash
            }
            Some(head_hash) => {
                debug!(head = %head_hash, "attaching to existing head");
                traverse_from(&storage, &head_hash, &mut known_nodes, tree_name)?;
                head_hash
            }
        };

        let head_node = known_nodes
            .get(&bitter_end)
            .ok_or_else(|| ChronoError::UnknownHash {
                hash: bitter_end.clone(),
            })?;
        let loose_ends: BTreeSet<Hash> = if head_node.is_content() {
            std::iter::once(bitter_end.clone()).collect()
        } else {
            head_node.predecessors().iter().cloned().collect()
        };

        debug!(bitter_end = %bitter_end, loose_ends = loose_ends.len(), "replica initialised");

        Ok(Self {
            storage,
            name,
            known_nodes,
            loose_ends,
            bitter_end,
        })
    }

    /// The current bitter-end digest.
    pub fn bitter_end(&self) -> &Hash {
        &self.bitter_end
    }

    /// The current loose ends, sorted lexicographically.
    pub fn loose_ends(&self) -> Vec<Hash> {
        self.loose_ends.iter().cloned().collect()
    }

    /// The full known-nodes mapping, ordered by sorted hash.
    pub fn known_nodes(&self) -> &BTreeMap<Hash, Node> {
        &self.known_nodes
    }

    /// The diagnostic tree name, if set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Shared access to the backing store.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Look up a node by hash.
    ///
    /// # Errors
    ///
    /// Returns [`ChronoError::UnknownHash`] if `hash` is not in
    /// `known_nodes`.
    pub fn get_node(&self, hash: &Hash) -> Result<&Node, ChronoError<S::Error>> {
        self.known_nodes
            .get(hash)
            .ok_or_else(|| ChronoError::UnknownHash { hash: hash.clone() })
    }

    /// Publish a new Content node replying to `parent` (`Hash::unset()` for
    /// a root post), carrying `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`ChronoError::InvalidInput`] if `parent` is set but not a
    /// known node — see `DESIGN.md` for why this validates rather than
    /// silently accepting a dangling reference. Propagates `Storage`
    /// failures; on failure the replica's observable state
    /// (`bitter_end`/`loose_ends`) is unchanged, since those fields are
    /// only reassigned after every fallible step succeeds.
    pub fn add(&mut self, parent: Hash, payload: Vec<u8>) -> Result<&mut Self, ChronoError<S::Error>> {
        let span = debug_span!("chronotree_add", name = self.name.as_deref().unwrap_or(""));
        let _enter = span.enter();

        if !parent.is_unset() && !self.known_nodes.contains_key(&parent) {
            return Err(ChronoError::InvalidInput {
                reason: format!("add: parent {parent} is not a known node"),
            });
        }

        let predecessors: Vec<Hash> = self
            .loose_ends
            .iter()
            .filter(|h| **h != parent)
            .cloned()
            .collect();

        let node = Node::Content {
            hash: Hash::unset(),
            parent: parent.clone(),
            predecessors,
            payload,
        };

        let tree_name = self.name.clone();
        let hash = self
            .storage
            .save(node.clone(), tree_name.as_deref())
            .map_err(|source| ChronoError::StorageSave { source })?;
        debug!(hash = %hash, parent = %parent, "saved new Content node");
        self.known_nodes.insert(hash.clone(), node.with_hash(hash));

        self.conclude_mutation(tree_name.as_deref())?;
        Ok(self)
    }

    /// Fold the foreign hash `other` (typically a peer's bitter end) into
    /// this replica.
    ///
    /// # Errors
    ///
    /// Propagates `Storage` failures encountered while traversing `other`'s
    /// ancestor DAG or synthesising a new Aggregate. On failure the
    /// replica's observable state is unchanged (see `add`'s documentation).
    pub fn merge(&mut self, other: Hash) -> Result<&mut Self, ChronoError<S::Error>> {
        let span = debug_span!("chronotree_merge", name = self.name.as_deref().unwrap_or(""));
        let _enter = span.enter();

        if other == self.bitter_end && self.known_nodes.contains_key(&other) {
            trace!(other = %other, "fast exit: already at this bitter end");
            return Ok(self);
        }

        let tree_name = self.name.clone();
        traverse_from(&self.storage, &other, &mut self.known_nodes, tree_name.as_deref())?;
        self.conclude_mutation(tree_name.as_deref())?;
        Ok(self)
    }

    /// Human-readable diagnostic dump. Returns a `String` rather than
    /// writing to stdout so callers may route it through `tracing`, a UI,
    /// or any other sink.
    pub fn print(&self) -> String {
        self.to_string()
    }

    /// Shared tail of `add`/`merge`: recompute `loose_ends` from the
    /// (already-updated) `known_nodes` graph, synthesise or adopt the new
    /// bitter end, and evict every superseded Aggregate.
    ///
    /// A `merge` traversal may pull in a *foreign* Aggregate (a peer's
    /// bitter end, if the peer was itself in the Multi-Aggregate state) in
    /// addition to our own previous one. Both are transient summaries, not
    /// real DAG content, so both are swept here — not just our own prior
    /// bitter end — to uphold the invariant that any Aggregate left in
    /// `known_nodes` equals the current `bitter_end`. See `DESIGN.md` for
    /// why this generalises beyond evicting only our own prior Aggregate.
    fn conclude_mutation(&mut self, tree_name: Option<&str>) -> Result<(), ChronoError<S::Error>> {
        let loose = compute_loose_ends(&self.known_nodes);

        let new_end = if loose.len() == 1 {
            let mut it = loose.iter();
            match it.next() {
                Some(h) => h.clone(),
                None => {
                    return Err(ChronoError::InvalidInput {
                        reason: "internal: loose_ends reported length 1 with no element".into(),
                    })
                }
            }
        } else {
            let predecessors: Vec<Hash> = loose.iter().cloned().collect();
            let aggregate = Node::new_aggregate(predecessors);
            let hash = self
                .storage
                .save(aggregate.clone(), tree_name)
                .map_err(|source| ChronoError::StorageSave { source })?;
            debug!(hash = %hash, predecessors = loose.len(), "synthesised new Aggregate");
            self.known_nodes
                .insert(hash.clone(), aggregate.with_hash(hash.clone()));
            hash
        };

        let stale_aggregates: Vec<Hash> = self
            .known_nodes
            .iter()
            .filter(|(hash, node)| node.is_aggregate() && **hash != new_end)
            .map(|(hash, _)| hash.clone())
            .collect();
        for stale in stale_aggregates {
            self.storage
                .delete(&stale, tree_name)
                .map_err(|source| ChronoError::StorageDelete { source })?;
            self.known_nodes.remove(&stale);
            debug!(evicted = %stale, "evicted superseded Aggregate");
        }

        self.loose_ends = loose;
        self.bitter_end = new_end;
        Ok(())
    }
}

impl<S: Storage> fmt::Display for ChronoTree<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ChronoTree(name={:?}, bitter_end={}, loose_ends={}, known_nodes={})",
            self.name,
            self.bitter_end,
            self.loose_ends.len(),
            self.known_nodes.len()
        )?;
        for hash in &self.loose_ends {
            writeln!(f, "  loose end: {hash}")?;
        }
        Ok(())
    }
}

/// Breadth-first traversal of the ancestor DAG rooted at `start`, inserting
/// every previously-unknown node into `known`. Already-known hashes are
/// skipped entirely — their ancestors are not re-walked, since Content
/// nodes are immutable and equal hashes imply equal subtrees.
fn traverse_from<S: Storage>(
    storage: &S,
    start: &Hash,
    known: &mut BTreeMap<Hash, Node>,
    tree_name: Option<&str>,
) -> Result<(), ChronoError<S::Error>> {
    let mut queue: VecDeque<Hash> = VecDeque::new();
    queue.push_back(start.clone());

    while let Some(hash) = queue.pop_front() {
        if hash.is_unset() || known.contains_key(&hash) {
            continue;
        }
        let node = storage
            .find(&hash, tree_name)
            .map_err(|source| ChronoError::StorageNotFound {
                hash: hash.clone(),
                source,
            })?;
        trace!(hash = %hash, "discovered node");

        let parent = node.parent().clone();
        let predecessors = node.predecessors().to_vec();
        known.insert(hash, node);

        if !parent.is_unset() {
            queue.push_back(parent);
        }
        for predecessor in predecessors {
            queue.push_back(predecessor);
        }
    }
    Ok(())
}

/// Compute the current loose-end set over `known`: Content hashes with no
/// other Content node referencing them as `parent` or in `predecessors`.
///
/// Aggregates never count on either side of this computation: they carry
/// no real DAG edges of their own (their `predecessors` list is a
/// *summary* of the loose ends, not a disqualifying reference), and an
/// Aggregate's own hash is never itself a loose end. This treats every
/// Aggregate that may transiently be present in `known` uniformly (e.g.
/// a foreign Aggregate just pulled in by a `merge` traversal, before
/// `conclude_mutation` evicts it), not just the replica's own prior one.
fn compute_loose_ends(known: &BTreeMap<Hash, Node>) -> BTreeSet<Hash> {
    let mut referenced: BTreeSet<Hash> = BTreeSet::new();
    for node in known.values().filter(|node| node.is_content()) {
        if !node.parent().is_unset() {
            referenced.insert(node.parent().clone());
        }
        referenced.extend(node.predecessors().iter().cloned());
    }

    let mut loose: BTreeSet<Hash> = known
        .iter()
        .filter(|(_, node)| node.is_content())
        .map(|(hash, _)| hash.clone())
        .collect();
    for hash in &referenced {
        loose.remove(hash);
    }
    loose
}
