use super::*;

use crate::base::BaseNode;
use crate::bits::{combine, first_set_bit, last_set_bit, BASE_BITS};
use crate::node::RecursiveNode;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{BTreeSet, HashSet};

/// Walks a node and returns the full keys it stores, checking structure on the way.
fn validate_node(node: &Node, bit_width: u32, depth: u32) -> Vec<u64> {
    // 64 -> 32 -> 16 -> 8: at most four levels below the root.
    assert!(depth <= 3, "recursion deeper than the width halvings allow");
    match node {
        Node::Base(base) => {
            assert_eq!(bit_width, BASE_BITS, "base node at {bit_width}-bit level");
            validate_base(base)
        }
        Node::Recursive(rec) => {
            assert_eq!(rec.bit_width, bit_width, "recursive node width");
            validate_recursive(rec, depth)
        }
    }
}

fn validate_base(base: &BaseNode) -> Vec<u64> {
    let keys: Vec<u64> = (0..256u64)
        .filter(|&x| base.presence[(x / 64) as usize] & (1 << (x % 64)) != 0)
        .collect();
    assert!(!keys.is_empty(), "live base node must not be empty");
    assert_eq!(Some(base.minimum), first_set_bit(&base.presence));
    assert_eq!(Some(base.maximum), last_set_bit(&base.presence));
    keys
}

fn validate_recursive(rec: &RecursiveNode, depth: u32) -> Vec<u64> {
    let child_bits = rec.child_bit_width();
    assert!(!rec.clusters.is_empty(), "live recursive node must have a cluster");
    assert_eq!(rec.half_mask, (1u64 << child_bits) - 1);

    let cluster_ids: BTreeSet<u64> = rec.clusters.keys().copied().collect();
    match &rec.summary {
        Some(summary) => {
            assert!(rec.clusters.len() >= 2, "summary kept for a single cluster");
            let summarized: BTreeSet<u64> = validate_node(summary, child_bits, depth + 1)
                .into_iter()
                .collect();
            assert_eq!(summarized, cluster_ids, "summary must mirror the clusters");
        }
        None => assert_eq!(rec.clusters.len(), 1, "missing summary"),
    }

    let mut keys = Vec::new();
    for (&c, cluster) in &rec.clusters {
        for offset in validate_node(cluster, child_bits, depth + 1) {
            keys.push(combine(c, offset, rec.bit_width));
        }
    }
    keys.sort_unstable();
    assert_eq!(keys.first(), Some(&rec.minimum), "cached minimum");
    assert_eq!(keys.last(), Some(&rec.maximum), "cached maximum");
    keys
}

fn validate_tree(t: &VebTree) -> Vec<u64> {
    match &t.root {
        None => {
            assert_eq!(t.count, 0);
            Vec::new()
        }
        Some(root) => {
            let mut keys = validate_node(root, t.universe.bit_width(), 0);
            keys.sort_unstable();
            let distinct: HashSet<u64> = keys.iter().copied().collect();
            assert_eq!(distinct.len(), keys.len(), "key stored twice");
            assert_eq!(keys.len(), t.count, "reachable keys must match VebTree::len");
            keys
        }
    }
}

#[derive(Arbitrary, Clone, Copy, Debug)]
enum Width {
    W8,
    W16,
    W32,
    W64,
}

impl Width {
    fn universe(self) -> Universe {
        match self {
            Width::W8 => Universe::U8,
            Width::W16 => Universe::U16,
            Width::W32 => Universe::U32,
            Width::W64 => Universe::U64,
        }
    }
}

/// Spreads a small seed across the universe so that keys share clusters at
/// every level while still reaching both ends of the key space.
fn spread(seed: u64, universe: Universe) -> u64 {
    let max_key = universe.max_key();
    if max_key <= 1023 {
        return seed.min(max_key);
    }
    let stride = max_key / 1023;
    (seed * stride).min(max_key)
}

#[derive(Arbitrary, Clone, Debug)]
enum Op {
    #[proptest(weight = 50)]
    Insert(#[proptest(strategy = "0u64..1024")] u64),
    #[proptest(weight = 25)]
    Remove(#[proptest(strategy = "0u64..1024")] u64),
    #[proptest(weight = 15)]
    Predecessor(#[proptest(strategy = "0u64..1024")] u64),
    #[proptest(weight = 9)]
    Contains(#[proptest(strategy = "0u64..1024")] u64),
    #[proptest(weight = 1)]
    Clear,
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(width in any::<Width>(), ops in prop::collection::vec(any::<Op>(), 0..=1000)) {
        let universe = width.universe();
        let mut t = VebTree::with_universe(universe);
        let mut m: BTreeSet<u64> = BTreeSet::new();

        for op in ops {
            match op {
                Op::Insert(seed) => {
                    let key = spread(seed, universe);
                    prop_assert_eq!(t.insert(key), Ok(m.insert(key)));
                }
                Op::Remove(seed) => {
                    let key = spread(seed, universe);
                    prop_assert_eq!(t.remove(key), Ok(m.remove(&key)));
                }
                Op::Predecessor(seed) => {
                    let key = spread(seed, universe);
                    prop_assert_eq!(t.predecessor(key), Ok(m.range(..key).next_back().copied()));
                }
                Op::Contains(seed) => {
                    let key = spread(seed, universe);
                    prop_assert_eq!(t.contains(key), Ok(m.contains(&key)));
                }
                Op::Clear => {
                    t.clear();
                    m.clear();
                }
            }

            prop_assert_eq!(t.len(), m.len());
            prop_assert_eq!(t.min(), m.first().copied());
            prop_assert_eq!(t.max(), m.last().copied());
        }

        let stored = validate_tree(&t);
        let expected: Vec<u64> = m.iter().copied().collect();
        prop_assert_eq!(stored, expected);
        let desc: Vec<u64> = t.iter_desc().collect();
        let expected_desc: Vec<u64> = m.iter().rev().copied().collect();
        prop_assert_eq!(desc, expected_desc);
    }

    #[test]
    fn prop_predecessor_every_seed_8bit(keys in prop::collection::btree_set(0u64..256, 0..64)) {
        let mut t = VebTree::new(8).unwrap();
        for &k in &keys {
            t.insert(k).unwrap();
        }
        for seed in 0..256u64 {
            prop_assert_eq!(t.predecessor(seed), Ok(keys.range(..seed).next_back().copied()));
        }
    }

    #[test]
    fn prop_out_of_range_rejected(key in 256u64.., width in prop_oneof![Just(8u32), Just(16), Just(32)]) {
        let mut t = VebTree::new(width).unwrap();
        t.insert(0).unwrap();
        let universe = t.universe();
        prop_assume!(!universe.contains_key(key));

        let err = VebError::KeyOutOfRange { key, bit_width: width };
        prop_assert_eq!(t.insert(key), Err(err.clone()));
        prop_assert_eq!(t.remove(key), Err(err.clone()));
        prop_assert_eq!(t.contains(key), Err(err.clone()));
        prop_assert_eq!(t.predecessor(key), Err(err));
        prop_assert_eq!(t.len(), 1);
        validate_tree(&t);
    }
}

/// Calls `f` with every ordering of `keys`, one swap apart (Heap's algorithm).
fn for_each_ordering(keys: &[u64], mut f: impl FnMut(&[u64])) {
    let mut keys = keys.to_vec();
    let mut counters = vec![0usize; keys.len()];
    f(&keys);

    let mut i = 1;
    while i < keys.len() {
        if counters[i] < i {
            let j = if i % 2 == 0 { 0 } else { counters[i] };
            keys.swap(j, i);
            f(&keys);
            counters[i] += 1;
            i = 1;
        } else {
            counters[i] = 0;
            i += 1;
        }
    }
}

// Keys sharing and splitting clusters at the 32-, 16- and 8-bit levels.
const SMALL_SET: [u64; 6] = [
    0x0000_0005,
    0x0000_0006,
    0x0000_0105,
    0x0001_0000,
    0x0001_0004,
    0xFFFF_FFFF,
];

#[test]
fn exhaustive_insert_order_small_set() {
    for_each_ordering(&SMALL_SET, |order| {
        let mut t = VebTree::new(32).unwrap();
        for &k in order {
            assert_eq!(t.insert(k), Ok(true));
        }

        let mut expected = SMALL_SET.to_vec();
        expected.sort_unstable();
        assert_eq!(validate_tree(&t), expected);
        for w in expected.windows(2) {
            assert_eq!(t.predecessor(w[1]), Ok(Some(w[0])));
        }
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let mut base_tree = VebTree::new(32).unwrap();
    let mut base_set: BTreeSet<u64> = BTreeSet::new();
    for &k in &SMALL_SET {
        base_tree.insert(k).unwrap();
        base_set.insert(k);
    }

    for_each_ordering(&SMALL_SET, |order| {
        let mut t = base_tree.clone();
        let mut m = base_set.clone();

        for &k in order {
            assert_eq!(t.remove(k), Ok(m.remove(&k)));
            assert_eq!(t.len(), m.len());
            validate_tree(&t);
            for probe in [0, 6, 0x0106, 0x0001_0004, 0x0002_0000, u32::MAX as u64] {
                assert_eq!(
                    t.predecessor(probe),
                    Ok(m.range(..probe).next_back().copied()),
                    "probe {probe:#x}"
                );
            }
        }
        assert_eq!(t.len(), 0);
        assert!(t.root.is_none());
    });
}
