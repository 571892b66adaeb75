//! Ordered set over the same copy-on-write tree.

use std::fmt;

use crate::cmp::Comparator;
use crate::error::Result;
use crate::iter::{Ascend, Descend, Keys};
use crate::options::Options;
use crate::CowTree;

/// An ordered set: a [`CowTree`] with unit values.
///
/// ```rust
/// use cowtree::CowSet;
///
/// let mut set = CowSet::new(|a: &i32, b: &i32| a < b);
/// assert!(set.insert(3));
/// assert!(!set.insert(3));
///
/// let snapshot = set.clone();
/// set.remove(&3);
/// assert!(snapshot.contains(&3));
/// ```
pub struct CowSet<K, C> {
    tree: CowTree<K, (), C>,
}

impl<K, C> CowSet<K, C> {
    pub fn new(cmp: C) -> Self {
        Self {
            tree: CowTree::new(cmp),
        }
    }

    pub fn with_options(cmp: C, options: Options) -> Result<Self> {
        Ok(Self {
            tree: CowTree::with_options(cmp, options)?,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn height(&self) -> usize {
        self.tree.height()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn first(&self) -> Option<&K> {
        self.tree.first().map(|(k, _)| k)
    }

    pub fn last(&self) -> Option<&K> {
        self.tree.last().map(|(k, _)| k)
    }

    pub fn iter(&self) -> Keys<Ascend<'_, K, ()>> {
        self.tree.keys()
    }
}

impl<K, C: Comparator<K>> CowSet<K, C> {
    pub fn contains(&self, key: &K) -> bool {
        self.tree.contains_key(key)
    }

    /// The stored key equal to `key`.
    pub fn get(&self, key: &K) -> Option<&K> {
        self.tree.get_key_value(key).map(|(k, _)| k)
    }

    pub fn ascend(&self, pivot: Option<&K>) -> Keys<Ascend<'_, K, ()>> {
        Keys(self.tree.ascend(pivot))
    }

    pub fn descend(&self, pivot: Option<&K>) -> Keys<Descend<'_, K, ()>> {
        Keys(self.tree.descend(pivot))
    }
}

impl<K: Clone, C: Comparator<K>> CowSet<K, C> {
    /// Add a key. Returns `false`, leaving the stored key in place, if an
    /// equal key is already present.
    pub fn insert(&mut self, key: K) -> bool {
        self.tree.try_insert(key, ()).is_ok()
    }

    /// Add a key, replacing and returning an equal stored key.
    pub fn replace(&mut self, key: K) -> Option<K> {
        self.tree.replace(key, ()).map(|(k, _)| k)
    }

    pub fn remove(&mut self, key: &K) -> bool {
        self.tree.remove_entry(key).is_some()
    }

    pub fn take(&mut self, key: &K) -> Option<K> {
        self.tree.remove_entry(key).map(|(k, _)| k)
    }

    pub fn pop_first(&mut self) -> Option<K> {
        self.tree.pop_first().map(|(k, _)| k)
    }

    pub fn pop_last(&mut self) -> Option<K> {
        self.tree.pop_last().map(|(k, _)| k)
    }
}

impl<K, C: Clone> Clone for CowSet<K, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: Clone, C: Comparator<K>> Extend<K> for CowSet<K, C> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for k in iter {
            self.insert(k);
        }
    }
}

impl<K: fmt::Debug, C> fmt::Debug for CowSet<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
