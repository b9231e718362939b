//! # veb-set
//!
//! An ordered set of unsigned integers backed by a van Emde Boas tree.
//!
//! Insert, remove, membership and predecessor queries take O(log log U)
//! steps, where U is the size of the key universe (`2^bit_width`). Each
//! level of the tree splits a key into a high half (cluster index) and a low
//! half (offset in the cluster) until an 8-bit bitmap node is reached.
//!
//! ## Example
//!
//! ```rust
//! use veb_set::VebTree;
//!
//! let mut set = VebTree::new(16)?;
//! set.insert(5)?;
//! set.insert(6)?;
//! set.insert(100)?;
//!
//! assert_eq!(set.predecessor(100)?, Some(6));
//! assert_eq!(set.predecessor(6)?, Some(5));
//! assert_eq!(set.predecessor(5)?, None);
//! assert!(set.insert(70_000).is_err());
//! # Ok::<(), veb_set::VebError>(())
//! ```

mod base;
mod bits;
mod error;
mod node;
mod universe;

use std::fmt;
use std::iter::FusedIterator;

use log::{debug, trace};

pub use error::{Result, VebError};
pub use universe::Universe;

use node::{Node, Removal, VebNode};

/// Ordered set over the keys of a [`Universe`].
///
/// The root node is created by the first insert and dropped, together with
/// everything below it, once the last key is removed.
///
/// Keys outside the universe are rejected with
/// [`VebError::KeyOutOfRange`]; they are never truncated.
#[derive(Clone)]
pub struct VebTree {
    universe: Universe,
    root: Option<Node>,
    count: usize,
}

impl VebTree {
    /// Creates an empty set over `bit_width`-bit keys (8, 16, 32 or 64).
    pub fn new(bit_width: u32) -> Result<Self> {
        Ok(Self::with_universe(Universe::new(bit_width)?))
    }

    /// Creates an empty set over an already validated universe.
    pub fn with_universe(universe: Universe) -> Self {
        Self {
            universe,
            root: None,
            count: 0,
        }
    }

    #[inline]
    pub fn universe(&self) -> Universe {
        self.universe
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Smallest key in the set.
    #[inline]
    pub fn min(&self) -> Option<u64> {
        self.root.as_ref().map(|root| root.min())
    }

    /// Largest key in the set.
    #[inline]
    pub fn max(&self) -> Option<u64> {
        self.root.as_ref().map(|root| root.max())
    }

    /// Adds `key` to the set. Returns `true` if it was not already present.
    pub fn insert(&mut self, key: u64) -> Result<bool> {
        let key = self.universe.check(key)?;
        trace!("insert {key:#x} into {} set", self.universe);
        let added = match &mut self.root {
            Some(root) => root.insert(key),
            None => {
                self.root = Some(Node::new(self.universe.bit_width(), key));
                true
            }
        };
        if added {
            self.count += 1;
        }
        Ok(added)
    }

    /// Returns `true` if `key` is in the set.
    pub fn contains(&self, key: u64) -> Result<bool> {
        let key = self.universe.check(key)?;
        Ok(self.root.as_ref().is_some_and(|root| root.contains(key)))
    }

    /// Largest key in the set strictly less than `key`.
    pub fn predecessor(&self, key: u64) -> Result<Option<u64>> {
        let key = self.universe.check(key)?;
        Ok(self.root.as_ref().and_then(|root| root.predecessor(key)))
    }

    /// Removes `key` from the set. Returns `true` if it was present.
    pub fn remove(&mut self, key: u64) -> Result<bool> {
        let key = self.universe.check(key)?;
        let Some(root) = &mut self.root else {
            return Ok(false);
        };
        trace!("remove {key:#x} from {} set", self.universe);
        match root.remove(key) {
            Removal::Absent => Ok(false),
            Removal::Removed => {
                self.count -= 1;
                Ok(true)
            }
            Removal::Emptied => {
                debug!("last key removed, releasing {} root", self.universe);
                self.root = None;
                self.count = 0;
                Ok(true)
            }
        }
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        debug!("clearing {} set of {} keys", self.universe, self.count);
        self.root = None;
        self.count = 0;
    }

    /// Iterates over the keys from largest to smallest.
    pub fn iter_desc(&self) -> Descending<'_> {
        Descending {
            root: self.root.as_ref(),
            next: self.max(),
        }
    }
}

impl Default for VebTree {
    fn default() -> Self {
        Self::with_universe(Universe::default())
    }
}

impl fmt::Debug for VebTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<u64> = self.iter_desc().collect();
        keys.reverse();
        f.debug_set().entries(keys).finish()
    }
}

/// Descending iterator returned by [`VebTree::iter_desc`].
pub struct Descending<'a> {
    root: Option<&'a Node>,
    next: Option<u64>,
}

impl Iterator for Descending<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let current = self.next?;
        self.next = self.root.and_then(|root| root.predecessor(current));
        Some(current)
    }
}

impl FusedIterator for Descending<'_> {}


#[cfg(test)]
mod proptests;
