//! # cowtree
//!
//! An in-memory B-tree ordered map with O(1) copy-on-write snapshots.
//!
//! Keys are ordered by a caller-supplied [`Comparator`]; there is no default
//! ordering. Cloning a [`CowTree`] shares every node with the original. Later
//! writes on either handle copy only the nodes on the written path, so the
//! handles diverge lazily and never observe each other's changes.
//!
//! ## Example
//!
//! ```rust
//! use cowtree::CowTree;
//!
//! let mut tree = CowTree::new(|a: &u64, b: &u64| a < b);
//! tree.insert(10, "ten");
//! tree.insert(20, "twenty");
//!
//! let snapshot = tree.clone();
//! tree.insert(30, "thirty");
//! tree.remove(&10);
//!
//! assert_eq!(snapshot.get(&10), Some(&"ten"));
//! assert_eq!(snapshot.get(&30), None);
//! assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![20, 30]);
//! ```

#![forbid(unsafe_code)]

use std::fmt;
use std::sync::Arc;

pub mod cmp;
mod cow;
pub mod error;
pub mod iter;
mod node;
pub mod options;
pub mod set;

pub use cmp::Comparator;
pub use error::{Error, Occupied, Result};
pub use iter::{Ascend, Descend, Keys, Values};
pub use options::Options;
pub use set::CowSet;

use cow::Tracker;
use node::{Insertion, Node, NodeRef, Target};
use options::Layout;

/// An ordered map backed by a copy-on-write B-tree.
///
/// - Point lookups, inserts and removals take O(log n) comparator calls.
/// - [`Clone`] is O(1) and yields an independent handle.
/// - Writes copy only the nodes they touch that are still shared.
///
/// A handle is single-writer: mutation takes `&mut self`. Distinct handles
/// (an original and its clones) can be read and written from separate threads
/// without synchronization.
pub struct CowTree<K, V, C> {
    root: NodeRef<K, V>,
    tracker: Tracker,
    count: usize,
    cmp: C,
    options: Options,
    layout: Layout,
}

impl<K, V, C> CowTree<K, V, C> {
    /// Create an empty tree with the default degree of 128.
    pub fn new(cmp: C) -> Self {
        Self::build(cmp, Options::default(), options::DEFAULT_LAYOUT)
    }

    /// Create an empty tree with explicit options.
    pub fn with_options(cmp: C, options: Options) -> Result<Self> {
        let layout = options.layout()?;
        Ok(Self::build(cmp, options, layout))
    }

    fn build(cmp: C, options: Options, layout: Layout) -> Self {
        let mut tracker = Tracker::new();
        Self {
            root: Arc::new(Node::leaf(tracker.get_mut())),
            tracker,
            count: 0,
            cmp,
            options,
            layout,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn options(&self) -> Options {
        self.options
    }

    pub fn degree(&self) -> usize {
        self.options.degree
    }

    /// Number of levels; a tree whose root is a leaf has height 1.
    pub fn height(&self) -> usize {
        self.root.height()
    }

    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Drop every item. Clones taken earlier keep theirs.
    pub fn clear(&mut self) {
        self.tracker.reset();
        self.root = Arc::new(Node::leaf(self.tracker.get_mut()));
        self.count = 0;
    }

    /// Smallest item.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.root.first().map(|(k, v)| (k, v))
    }

    /// Largest item.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.root.last().map(|(k, v)| (k, v))
    }

    /// All items in ascending order.
    pub fn iter(&self) -> Ascend<'_, K, V> {
        Ascend::new(&self.root)
    }

    pub fn keys(&self) -> Keys<Ascend<'_, K, V>> {
        Keys(self.iter())
    }

    pub fn values(&self) -> Values<Ascend<'_, K, V>> {
        Values(self.iter())
    }
}

impl<K, V, C: Comparator<K>> CowTree<K, V, C> {
    pub fn get(&self, key: &K) -> Option<&V> {
        self.root.find(key, &self.cmp).map(|(_, v)| v)
    }

    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.root.find(key, &self.cmp).map(|(k, v)| (k, v))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.root.find(key, &self.cmp).is_some()
    }

    /// Ascending traversal. With a pivot, starts at the first key `>= pivot`.
    pub fn ascend(&self, pivot: Option<&K>) -> Ascend<'_, K, V> {
        match pivot {
            Some(pivot) => Ascend::seek(&self.root, pivot, &self.cmp),
            None => Ascend::new(&self.root),
        }
    }

    /// Descending traversal. With a pivot, starts at the last key `<= pivot`.
    pub fn descend(&self, pivot: Option<&K>) -> Descend<'_, K, V> {
        match pivot {
            Some(pivot) => Descend::seek(&self.root, pivot, &self.cmp),
            None => Descend::new(&self.root),
        }
    }
}

impl<K: Clone, V: Clone, C: Comparator<K>> CowTree<K, V, C> {
    /// Insert or replace. Returns the previous value for an equal key; the
    /// stored key is replaced as well.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.replace(key, value).map(|(_, v)| v)
    }

    /// Insert or replace, returning the whole previous item.
    pub fn replace(&mut self, key: K, value: V) -> Option<(K, V)> {
        let cow = self.tracker.get_mut();
        let (mut key, mut value) = (key, value);
        loop {
            let root = node::mutable(&mut self.root, cow);
            match root.insert(key, value, &self.cmp, self.layout, cow) {
                Insertion::Replaced(old) => return Some(old),
                Insertion::Inserted => {
                    self.count += 1;
                    return None;
                }
                Insertion::Full(k, v) => {
                    Node::split_root(&mut self.root, cow);
                    tracing::trace!(height = self.root.height(), len = self.count, "root split");
                    key = k;
                    value = v;
                }
            }
        }
    }

    /// Insert only if the key is absent. An equal key leaves the tree
    /// untouched and hands the pair back.
    pub fn try_insert(&mut self, key: K, value: V) -> std::result::Result<(), Occupied<K, V>> {
        if self.contains_key(&key) {
            return Err(Occupied { key, value });
        }
        self.replace(key, value);
        Ok(())
    }

    /// Mutable access to a value. Nodes on the path that are shared with a
    /// clone are copied first.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        if !self.contains_key(key) {
            return None;
        }
        let cow = self.tracker.get_mut();
        node::mutable(&mut self.root, cow).get_mut(key, &self.cmp, cow)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        self.delete(Target::Key(key))
    }

    /// Remove and return the smallest item.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.delete(Target::First)
    }

    /// Remove and return the largest item.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.delete(Target::Last)
    }

    fn delete(&mut self, target: Target<'_, K>) -> Option<(K, V)> {
        if self.count == 0 {
            return None;
        }
        let cow = self.tracker.get_mut();
        let removed = node::mutable(&mut self.root, cow).remove(target, &self.cmp, self.layout, cow)?;
        self.count -= 1;

        let collapsed = match self.root.children() {
            [child] if self.root.items.is_empty() => Some(Arc::clone(child)),
            _ => None,
        };
        if let Some(child) = collapsed {
            self.root = child;
            tracing::trace!(height = self.root.height(), len = self.count, "root collapse");
        }
        Some(removed)
    }
}

impl<K, V, C: Clone> Clone for CowTree<K, V, C> {
    /// O(1) snapshot. Both handles get fresh trackers, so neither writes to a
    /// node that is now reachable from the other.
    fn clone(&self) -> Self {
        self.tracker.retire();
        tracing::trace!(len = self.count, "snapshot");
        Self {
            root: Arc::clone(&self.root),
            tracker: Tracker::new(),
            count: self.count,
            cmp: self.cmp.clone(),
            options: self.options,
            layout: self.layout,
        }
    }
}

impl<K: Clone, V: Clone, C: Comparator<K>> Extend<(K, V)> for CowTree<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for CowTree<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}


#[cfg(test)]
mod proptests;
