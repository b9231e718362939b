//! Leaf level of the tree: a 256-key bitmap.

use crate::bits::{first_set_bit, last_set_bit, prev_set_bit, BASE_SIZE, BITMAP_WORDS};
use crate::node::{Removal, VebNode};

/// Base node over the 8-bit universe `0..256`.
///
/// A base node is never empty: it is created holding one key and its owner
/// drops it as soon as `remove` reports [`Removal::Emptied`].
#[derive(Clone, Debug)]
pub(crate) struct BaseNode {
    pub(crate) minimum: u64,
    pub(crate) maximum: u64,
    pub(crate) presence: [u64; BITMAP_WORDS],
}

impl BaseNode {
    pub(crate) fn new(x: u64) -> Self {
        debug_assert!(x < BASE_SIZE as u64);
        let mut node = Self {
            minimum: x,
            maximum: x,
            presence: [0; BITMAP_WORDS],
        };
        node.set(x);
        node
    }

    #[inline]
    fn word_and_bit(x: u64) -> (usize, u64) {
        ((x / 64) as usize, 1u64 << (x % 64))
    }

    #[inline]
    fn set(&mut self, x: u64) -> bool {
        let (word, bit) = Self::word_and_bit(x);
        let was_set = self.presence[word] & bit != 0;
        self.presence[word] |= bit;
        !was_set
    }

    #[inline]
    fn clear(&mut self, x: u64) -> bool {
        let (word, bit) = Self::word_and_bit(x);
        let was_set = self.presence[word] & bit != 0;
        self.presence[word] &= !bit;
        was_set
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.presence.iter().map(|w| w.count_ones() as usize).sum()
    }
}

impl VebNode for BaseNode {
    fn insert(&mut self, x: u64) -> bool {
        debug_assert!(x < BASE_SIZE as u64);
        if x < self.minimum {
            self.minimum = x;
        }
        if x > self.maximum {
            self.maximum = x;
        }
        self.set(x)
    }

    fn contains(&self, x: u64) -> bool {
        let (word, bit) = Self::word_and_bit(x);
        self.presence[word] & bit != 0
    }

    fn predecessor(&self, x: u64) -> Option<u64> {
        if x <= self.minimum {
            return None;
        }
        prev_set_bit(&self.presence, x)
    }

    fn remove(&mut self, x: u64) -> Removal {
        if !self.clear(x) {
            return Removal::Absent;
        }
        if self.presence.iter().all(|&w| w == 0) {
            return Removal::Emptied;
        }
        if x == self.minimum {
            if let Some(minimum) = first_set_bit(&self.presence) {
                self.minimum = minimum;
            }
        }
        if x == self.maximum {
            if let Some(maximum) = last_set_bit(&self.presence) {
                self.maximum = maximum;
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
