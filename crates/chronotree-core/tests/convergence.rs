// SPDX-License-Identifier: Apache-2.0
//! End-to-end scenarios: the six concrete examples plus the quantified
//! invariants they exist to exercise (closure, bitter-end determinism,
//! idempotence, commutativity, associativity, Aggregate transience).
#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use chronotree_core::{ChronoTree, Hash, Node};
use chronotree_store::MemoryStore;
use chronotree_testkit::{known_nodes_digest, loose_ends_digest, SharedStore};

type Store = SharedStore<MemoryStore>;
type Tree = ChronoTree<Store>;

fn new_store() -> Store {
    SharedStore::new(MemoryStore::new())
}

fn new_tree(store: Store, head: Option<Hash>) -> Tree {
    ChronoTree::new(store, head, None).expect("ChronoTree::new")
}

/// Pre-save a root Content post directly through `storage`, bypassing
/// `ChronoTree::add` (used to seed a shared ancestor before any replica
/// attaches).
fn save_root(store: &mut Store, payload: &[u8]) -> Hash {
    use chronotree_core::Storage as _;
    let root = Node::new_content(Hash::unset(), payload.to_vec());
    store.save(root, None).expect("save root")
}

#[test]
fn scenario_1_empty_construction() {
    let tree = new_tree(new_store(), None);
    let head = tree.get_node(tree.bitter_end()).expect("bitter end is known");
    assert!(head.is_aggregate());
    assert!(head.predecessors().is_empty());
    // Per DESIGN.md's resolution of Open Question 1, a lone Content
    // bitter end is always included in `loose_ends` — the empty
    // Aggregate is the one state where `loose_ends` is legitimately
    // empty, since there is no Content node yet to be a loose end.
    assert!(tree.loose_ends().is_empty());
}

#[test]
fn scenario_2_single_post() {
    let mut store = new_store();
    let root = save_root(&mut store, b"root");
    let mut tree = new_tree(store, Some(root.clone()));

    tree.add(root.clone(), b"hello".to_vec()).expect("add");

    let n_hash = tree.bitter_end().clone();
    assert_eq!(tree.loose_ends(), vec![n_hash.clone()]);
    assert_eq!(tree.known_nodes().len(), 2);
    assert!(tree.known_nodes().contains_key(&root));
    assert!(tree.known_nodes().contains_key(&n_hash));
}

#[test]
fn scenario_3_simple_split_merge() {
    let mut store = new_store();
    let root = save_root(&mut store, b"root");

    let mut l = new_tree(store.clone(), Some(root.clone()));
    let mut r = new_tree(store, Some(root.clone()));

    l.add(root.clone(), b"a".to_vec()).expect("add a");
    let a_hash = l.bitter_end().clone();

    r.add(root.clone(), b"b".to_vec()).expect("add b");
    let b_hash = r.bitter_end().clone();

    l.merge(b_hash.clone()).expect("merge");

    let merged = l.get_node(l.bitter_end()).expect("bitter end known");
    assert!(merged.is_aggregate());
    assert!(merged.parent().is_unset());

    let mut expected = vec![a_hash, b_hash];
    expected.sort();
    assert_eq!(merged.predecessors(), expected.as_slice());
}

#[test]
fn scenario_4_commutativity_pair() {
    let mut store = new_store();
    let root = save_root(&mut store, b"root");

    let mut l = new_tree(store.clone(), Some(root.clone()));
    let mut r = new_tree(store, Some(root.clone()));

    l.add(root.clone(), b"a".to_vec()).expect("add a");
    let l_bitter_end_before_merge = l.bitter_end().clone();

    r.add(root.clone(), b"b".to_vec()).expect("add b");
    let r_bitter_end_before_merge = r.bitter_end().clone();

    l.merge(r_bitter_end_before_merge).expect("l merges r");
    r.merge(l_bitter_end_before_merge).expect("r merges l");

    assert_eq!(l.bitter_end(), r.bitter_end());
    assert_eq!(loose_ends_digest(&l), loose_ends_digest(&r));
    assert_eq!(known_nodes_digest(&l), known_nodes_digest(&r));
}

#[test]
fn scenario_5_three_way_associativity() {
    let mut store = new_store();
    let root = save_root(&mut store, b"root");

    let mut a = new_tree(store.clone(), Some(root.clone()));
    let mut b = new_tree(store.clone(), Some(root.clone()));
    let mut c = new_tree(store, Some(root.clone()));

    a.add(root.clone(), b"a".to_vec()).expect("add a");
    b.add(root.clone(), b"b".to_vec()).expect("add b");
    c.add(root.clone(), b"c".to_vec()).expect("add c");

    let a_end = a.bitter_end().clone();
    let b_end = b.bitter_end().clone();
    let c_end = c.bitter_end().clone();

    // (a -> b) -> c
    a.merge(b_end.clone()).expect("a merges b");
    a.merge(c_end.clone()).expect("a merges c");

    // a -> (b -> c)
    b.merge(c_end).expect("b merges c");
    b.merge(a_end.clone()).expect("b merges a");

    // (c -> a) -> b
    c.merge(a_end).expect("c merges a");
    c.merge(b_end).expect("c merges b");

    assert_eq!(a.bitter_end(), b.bitter_end());
    assert_eq!(b.bitter_end(), c.bitter_end());
    assert_eq!(loose_ends_digest(&a), loose_ends_digest(&b));
    assert_eq!(loose_ends_digest(&b), loose_ends_digest(&c));
    assert_eq!(known_nodes_digest(&a), known_nodes_digest(&b));
    assert_eq!(known_nodes_digest(&b), known_nodes_digest(&c));
}

#[test]
fn merge_is_idempotent() {
    let mut store = new_store();
    let root = save_root(&mut store, b"root");

    let mut l = new_tree(store.clone(), Some(root.clone()));
    let mut r = new_tree(store, Some(root.clone()));

    l.add(root.clone(), b"a".to_vec()).expect("add a");
    r.add(root, b"b".to_vec()).expect("add b");
    let r_end = r.bitter_end().clone();

    l.merge(r_end.clone()).expect("first merge");
    let end_after_first = l.bitter_end().clone();
    let loose_after_first = l.loose_ends();

    l.merge(r_end.clone()).expect("second merge, no-op");
    assert_eq!(l.bitter_end(), &end_after_first);
    assert_eq!(l.loose_ends(), loose_after_first);

    l.merge(r_end).expect("third merge, still no-op");
    assert_eq!(l.bitter_end(), &end_after_first);
}

#[test]
fn content_nodes_never_mutate_once_known() {
    let mut store = new_store();
    let root = save_root(&mut store, b"root");
    let mut tree = new_tree(store, Some(root.clone()));

    tree.add(root.clone(), b"first".to_vec()).expect("add first");
    let first_hash = tree.bitter_end().clone();
    let first_node_before = tree.get_node(&first_hash).expect("known").clone();

    tree.add(first_hash.clone(), b"second".to_vec()).expect("add second");

    let first_node_after = tree.get_node(&first_hash).expect("still known").clone();
    assert_eq!(first_node_before, first_node_after);
}

#[test]
fn aggregates_in_known_nodes_always_equal_bitter_end() {
    let mut store = new_store();
    let root = save_root(&mut store, b"root");

    let mut l = new_tree(store.clone(), Some(root.clone()));
    let mut r = new_tree(store, Some(root.clone()));

    l.add(root.clone(), b"a".to_vec()).expect("add a");
    r.add(root, b"b".to_vec()).expect("add b");
    let r_end = r.bitter_end().clone();

    l.merge(r_end).expect("merge");

    for (hash, node) in l.known_nodes() {
        if node.is_aggregate() {
            assert_eq!(hash, l.bitter_end(), "stray Aggregate left behind in known_nodes");
        }
    }
}

/// A peer whose own bitter end is itself an Aggregate (Multi-Aggregate
/// state) gets merged in; the foreign Aggregate must not survive as a
/// stray entry once the merging replica recomputes its own bitter end.
#[test]
fn merging_a_foreign_aggregate_bitter_end_does_not_leak_it() {
    let mut store = new_store();
    let root = save_root(&mut store, b"root");

    let mut receiver = new_tree(store.clone(), Some(root.clone()));
    let mut peer = new_tree(store.clone(), Some(root.clone()));
    let mut third = new_tree(store, Some(root.clone()));

    // receiver has its own divergent loose end.
    receiver.add(root.clone(), b"mine".to_vec()).expect("add mine");

    // peer and third each add, then peer merges third — peer's bitter
    // end becomes a Multi-Aggregate over two loose ends neither of which
    // is `receiver`'s.
    peer.add(root.clone(), b"peer".to_vec()).expect("add peer");
    third.add(root, b"third".to_vec()).expect("add third");
    let third_end = third.bitter_end().clone();
    peer.merge(third_end).expect("peer merges third");

    let peer_aggregate_end = peer.bitter_end().clone();
    assert!(peer.get_node(&peer_aggregate_end).expect("known").is_aggregate());

    receiver.merge(peer_aggregate_end.clone()).expect("receiver merges peer's aggregate");

    for (hash, node) in receiver.known_nodes() {
        if node.is_aggregate() {
            assert_eq!(
                hash,
                receiver.bitter_end(),
                "foreign Aggregate {hash} survived merge as a stray entry"
            );
        }
    }
    assert_ne!(receiver.bitter_end(), &peer_aggregate_end);
}

#[test]
fn add_rejects_unknown_parent() {
    let tree_store = new_store();
    let mut tree = new_tree(tree_store, None);
    let dangling = Hash::new("never-saved-anywhere");
    let err = tree.add(dangling, b"x".to_vec()).unwrap_err();
    assert!(matches!(err, chronotree_core::ChronoError::InvalidInput { .. }));
}

#[test]
fn scenario_6_randomised_three_way_convergence() {
    use chronotree_testkit::{random_known_content_hash, DeterministicRng};

    let mut store = new_store();
    let root = save_root(&mut store, b"root");

    let mut replicas: Vec<Tree> = (0..3)
        .map(|_| new_tree(store.clone(), Some(root.clone())))
        .collect();
    let mut rngs: Vec<DeterministicRng> = (0..3u64).map(|i| DeterministicRng::new(1000 + i)).collect();

    for iteration in 0..100 {
        for (i, replica) in replicas.iter_mut().enumerate() {
            let parent = random_known_content_hash(replica, &mut rngs[i])
                .unwrap_or_else(|| root.clone());
            let payload = format!("iter{iteration}-replica{i}").into_bytes();
            replica.add(parent, payload).expect("add");
        }

        let ends: Vec<Hash> = replicas.iter().map(|t| t.bitter_end().clone()).collect();
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    let other_end = ends[j].clone();
                    replicas[i].merge(other_end).expect("merge");
                }
            }
        }

        let first_end = replicas[0].bitter_end().clone();
        let first_loose = loose_ends_digest(&replicas[0]);
        let first_known = known_nodes_digest(&replicas[0]);
        for replica in &replicas[1..] {
            assert_eq!(replica.bitter_end(), &first_end, "iteration {iteration}");
            assert_eq!(loose_ends_digest(replica), first_loose, "iteration {iteration}");
            assert_eq!(known_nodes_digest(replica), first_known, "iteration {iteration}");
        }
    }
}
