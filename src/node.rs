//! Node kinds of the van Emde Boas tree and the interface they share.

use std::collections::HashMap;

use log::trace;

use crate::base::BaseNode;
use crate::bits::{cluster_of, combine, half_mask, offset_of, BASE_BITS};

/// Outcome of removing a key from a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Removal {
    /// The key was not stored; nothing changed.
    Absent,
    /// The key was removed and the node still holds other keys.
    Removed,
    /// The key was the last one. The caller must drop the node.
    Emptied,
}

/// Operations every node kind supports.
///
/// Keys are relative to the node's own universe. `min` and `max` are only
/// meaningful on a live node, and live nodes are never empty.
pub(crate) trait VebNode {
    /// Returns `true` if `x` was not already present.
    fn insert(&mut self, x: u64) -> bool;
    fn contains(&self, x: u64) -> bool;
    /// Largest stored key strictly less than `x`.
    fn predecessor(&self, x: u64) -> Option<u64>;
    fn remove(&mut self, x: u64) -> Removal;
    fn min(&self) -> u64;
    fn max(&self) -> u64;
}

// =============================================================================
// Node
// =============================================================================

#[derive(Clone, Debug)]
pub(crate) enum Node {
    Base(Box<BaseNode>),
    Recursive(Box<RecursiveNode>),
}

impl Node {
    /// Creates a node over a `bit_width`-bit universe holding only `x`.
    pub(crate) fn new(bit_width: u32, x: u64) -> Self {
        if bit_width <= BASE_BITS {
            Node::Base(Box::new(BaseNode::new(x)))
        } else {
            Node::Recursive(Box::new(RecursiveNode::new(bit_width, x)))
        }
    }
}

impl VebNode for Node {
    #[inline]
    fn insert(&mut self, x: u64) -> bool {
        match self {
            Node::Base(node) => node.insert(x),
            Node::Recursive(node) => node.insert(x),
        }
    }

    #[inline]
    fn contains(&self, x: u64) -> bool {
        match self {
            Node::Base(node) => node.contains(x),
            Node::Recursive(node) => node.contains(x),
        }
    }

    #[inline]
    fn predecessor(&self, x: u64) -> Option<u64> {
        match self {
            Node::Base(node) => node.predecessor(x),
            Node::Recursive(node) => node.predecessor(x),
        }
    }

    #[inline]
    fn remove(&mut self, x: u64) -> Removal {
        match self {
            Node::Base(node) => node.remove(x),
            Node::Recursive(node) => node.remove(x),
        }
    }

    #[inline]
    fn min(&self) -> u64 {
        match self {
            Node::Base(node) => node.min(),
            Node::Recursive(node) => node.min(),
        }
    }

    #[inline]
    fn max(&self) -> u64 {
        match self {
            Node::Base(node) => node.max(),
            Node::Recursive(node) => node.max(),
        }
    }
}

// =============================================================================
// Recursive node
// =============================================================================

/// Node over a universe wider than 8 bits.
///
/// A key `x` lives in cluster `x >> (bit_width / 2)` at offset
/// `x & half_mask`. Every key is stored in its cluster, including the
/// current minimum and maximum.
///
/// The summary records which clusters are non-empty. It only exists while
/// the node has two or more clusters, and when present it holds exactly the
/// keys of `clusters`.
#[derive(Clone, Debug)]
pub(crate) struct RecursiveNode {
    pub(crate) minimum: u64,
    pub(crate) maximum: u64,
    pub(crate) bit_width: u32,
    pub(crate) half_mask: u64,
    pub(crate) summary: Option<Node>,
    pub(crate) clusters: HashMap<u64, Node>,
}

impl RecursiveNode {
    pub(crate) fn new(bit_width: u32, x: u64) -> Self {
        debug_assert!(bit_width > BASE_BITS && bit_width % 2 == 0);
        trace!("creating {bit_width}-bit node holding {x:#x}");
        let mut clusters = HashMap::with_capacity(1);
        clusters.insert(
            cluster_of(x, bit_width),
            Node::new(bit_width / 2, offset_of(x, bit_width)),
        );
        Self {
            minimum: x,
            maximum: x,
            bit_width,
            half_mask: half_mask(bit_width),
            summary: None,
            clusters,
        }
    }

    #[inline]
    pub(crate) fn child_bit_width(&self) -> u32 {
        self.bit_width / 2
    }

    #[inline]
    fn split(&self, x: u64) -> (u64, u64) {
        (cluster_of(x, self.bit_width), x & self.half_mask)
    }

    #[inline]
    fn join(&self, cluster: u64, offset: u64) -> u64 {
        combine(cluster, offset, self.bit_width)
    }

    /// Index of the lowest non-empty cluster.
    fn lowest_cluster(&self) -> Option<u64> {
        match &self.summary {
            Some(summary) => Some(summary.min()),
            None => self.clusters.keys().next().copied(),
        }
    }

    /// Index of the highest non-empty cluster.
    fn highest_cluster(&self) -> Option<u64> {
        match &self.summary {
            Some(summary) => Some(summary.max()),
            None => self.clusters.keys().next().copied(),
        }
    }

    /// Drops the bookkeeping for cluster `c`, which has just become empty.
    fn release_cluster(&mut self, c: u64) {
        trace!("releasing cluster {c:#x} of {}-bit node", self.bit_width);
        self.clusters.remove(&c);
        if self.clusters.len() < 2 {
            self.summary = None;
        } else if let Some(summary) = &mut self.summary {
            if summary.remove(c) == Removal::Emptied {
                self.summary = None;
            }
        }
    }
}

impl VebNode for RecursiveNode {
    fn insert(&mut self, x: u64) -> bool {
        if x < self.minimum {
            self.minimum = x;
        }
        if x > self.maximum {
            self.maximum = x;
        }

        let (c, i) = self.split(x);
        let child_bits = self.child_bit_width();
        if let Some(cluster) = self.clusters.get_mut(&c) {
            return cluster.insert(i);
        }

        if let Some(summary) = &mut self.summary {
            summary.insert(c);
        } else {
            // Second cluster: start the summary with both indices.
            let mut summary = Node::new(child_bits, c);
            for &existing in self.clusters.keys() {
                summary.insert(existing);
            }
            self.summary = Some(summary);
        }
        self.clusters.insert(c, Node::new(child_bits, i));
        true
    }

    fn contains(&self, x: u64) -> bool {
        if x < self.minimum || x > self.maximum {
            return false;
        }
        if x == self.minimum || x == self.maximum {
            return true;
        }
        let (c, i) = self.split(x);
        self.clusters
            .get(&c)
            .is_some_and(|cluster| cluster.contains(i))
    }

    fn predecessor(&self, x: u64) -> Option<u64> {
        if x <= self.minimum {
            return None;
        }
        if x > self.maximum {
            return Some(self.maximum);
        }

        let (c, i) = self.split(x);
        if let Some(cluster) = self.clusters.get(&c) {
            if i > cluster.min() {
                if let Some(offset) = cluster.predecessor(i) {
                    return Some(self.join(c, offset));
                }
            }
        }

        // The answer sits in the nearest non-empty cluster below `c`.
        let lower = self
            .summary
            .as_ref()
            .and_then(|summary| summary.predecessor(c));
        // The minimum is stored in its cluster and `x > minimum`, so some
        // cluster below `c` holds a key whenever control gets here.
        debug_assert!(
            lower.is_some(),
            "no cluster below {c:#x} in {}-bit node although {x:#x} > minimum",
            self.bit_width
        );
        if let Some(b) = lower {
            debug_assert!(
                self.clusters.contains_key(&b),
                "summary lists cluster {b:#x} that is not stored"
            );
        }
        match lower.and_then(|b| self.clusters.get(&b).map(|cluster| (b, cluster))) {
            Some((b, cluster)) => Some(self.join(b, cluster.max())),
            None => Some(self.minimum),
        }
    }

    fn remove(&mut self, x: u64) -> Removal {
        if self.minimum == self.maximum {
            return if x == self.minimum {
                Removal::Emptied
            } else {
                Removal::Absent
            };
        }
        if x < self.minimum || x > self.maximum {
            return Removal::Absent;
        }

        let (c, i) = self.split(x);
        let Some(cluster) = self.clusters.get_mut(&c) else {
            return Removal::Absent;
        };
        match cluster.remove(i) {
            Removal::Absent => return Removal::Absent,
            Removal::Removed => {}
            Removal::Emptied => {
                self.release_cluster(c);
                if self.clusters.is_empty() {
                    return Removal::Emptied;
                }
            }
        }

        if x == self.minimum {
            if let Some(low) = self.lowest_cluster() {
                if let Some(cluster) = self.clusters.get(&low) {
                    self.minimum = self.join(low, cluster.min());
                }
            }
        }
        if x == self.maximum {
            if let Some(high) = self.highest_cluster() {
                if let Some(cluster) = self.clusters.get(&high) {
                    self.maximum = self.join(high, cluster.max());
                }
            }
        }
        Removal::Removed
    }

    #[inline]
    fn min(&self) -> u64 {
        self.minimum
    }

    #[inline]
    fn max(&self) -> u64 {
        self.maximum
    }
}
