//! B-tree nodes and the copy-on-write mutation paths.
//!
//! Nodes are shared between tree handles through `Arc`. A handle writes to a
//! node only after [`mutable`] has produced a copy carrying the handle's own
//! [`Cow`] token, so every write path copies at most one node per level.

use std::mem;
use std::sync::Arc;

use crate::cmp::Comparator;
use crate::cow::Cow;
use crate::options::Layout;

pub(crate) type NodeRef<K, V> = Arc<Node<K, V>>;

#[derive(Clone)]
pub(crate) struct Node<K, V> {
    /// Token of the handle allowed to write to this node in place.
    pub(crate) cow: Cow,
    pub(crate) items: Vec<(K, V)>,
    pub(crate) children: Children<K, V>,
}

/// Leaf or branch. A branch has exactly `items.len() + 1` children; child `i`
/// holds the keys between `items[i - 1]` and `items[i]`.
#[derive(Clone)]
pub(crate) enum Children<K, V> {
    Leaf,
    Branch(Vec<NodeRef<K, V>>),
}

/// Outcome of inserting into a subtree.
pub(crate) enum Insertion<K, V> {
    /// Key was present; holds the previous item.
    Replaced((K, V)),
    Inserted,
    /// The node that had to take the item is at capacity. The pair is handed
    /// back so the parent can split that node and retry.
    Full(K, V),
}

/// What a removal is looking for.
pub(crate) enum Target<'k, K> {
    Key(&'k K),
    First,
    Last,
}

impl<K> Clone for Target<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Target<'_, K> {}

// =============================================================================
// Copy-on-write
// =============================================================================

/// Return the node in `slot` as privately owned by `cow`.
///
/// A node tagged with another token is replaced by a shallow copy (new item
/// and child vectors, same child `Arc`s) tagged with `cow`. The original stays
/// untouched for whichever handles still reach it.
pub(crate) fn mutable<K: Clone, V: Clone>(slot: &mut NodeRef<K, V>, cow: Cow) -> &mut Node<K, V> {
    if slot.cow != cow {
        *slot = Arc::new(slot.copy_for(cow));
    }
    // Tag matches, so no other handle may write here. `make_mut` only copies
    // if a stale reference to this node is still alive somewhere.
    Arc::make_mut(slot)
}

impl<K, V> Node<K, V> {
    pub(crate) fn leaf(cow: Cow) -> Self {
        Self {
            cow,
            items: Vec::new(),
            children: Children::Leaf,
        }
    }

    fn branch(cow: Cow, median: (K, V), left: NodeRef<K, V>, right: NodeRef<K, V>) -> Self {
        Self {
            cow,
            items: vec![median],
            children: Children::Branch(vec![left, right]),
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.children, Children::Leaf)
    }

    /// Child references; empty for a leaf.
    #[inline]
    pub(crate) fn children(&self) -> &[NodeRef<K, V>] {
        match &self.children {
            Children::Leaf => &[],
            Children::Branch(children) => children,
        }
    }

    /// Lower-bound bisection: the first index whose key is not less than
    /// `key`, and whether that item equals `key`.
    #[inline]
    pub(crate) fn search<C: Comparator<K>>(&self, key: &K, cmp: &C) -> (usize, bool) {
        let i = self.items.partition_point(|(k, _)| cmp.less(k, key));
        (i, i < self.items.len() && !cmp.less(key, &self.items[i].0))
    }

    pub(crate) fn find<C: Comparator<K>>(&self, key: &K, cmp: &C) -> Option<&(K, V)> {
        let mut node = self;
        loop {
            let (i, found) = node.search(key, cmp);
            if found {
                return Some(&node.items[i]);
            }
            match &node.children {
                Children::Leaf => return None,
                Children::Branch(children) => node = &children[i],
            }
        }
    }

    pub(crate) fn first(&self) -> Option<&(K, V)> {
        let mut node = self;
        while let Children::Branch(children) = &node.children {
            node = &children[0];
        }
        node.items.first()
    }

    pub(crate) fn last(&self) -> Option<&(K, V)> {
        let mut node = self;
        while let Children::Branch(children) = &node.children {
            node = &children[children.len() - 1];
        }
        node.items.last()
    }

    /// Levels from this node down to its leaves, inclusive.
    pub(crate) fn height(&self) -> usize {
        let mut node = self;
        let mut height = 1;
        while let Children::Branch(children) = &node.children {
            node = &children[0];
            height += 1;
        }
        height
    }
}

impl<K: Clone, V: Clone> Node<K, V> {
    fn copy_for(&self, cow: Cow) -> Self {
        // One spare slot: the copy is made because a write is about to happen.
        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.extend_from_slice(&self.items);
        let children = match &self.children {
            Children::Leaf => Children::Leaf,
            Children::Branch(children) => {
                let mut copy = Vec::with_capacity(children.len() + 1);
                copy.extend(children.iter().cloned());
                Children::Branch(copy)
            }
        };
        Self {
            cow,
            items,
            children,
        }
    }

    /// Build a new root over the current root after splitting it.
    pub(crate) fn split_root(root: &mut NodeRef<K, V>, cow: Cow) {
        let (median, right) = mutable(root, cow).split();
        let left = Arc::clone(root);
        *root = Arc::new(Self::branch(cow, median, left, Arc::new(right)));
    }

    /// Split a full node around its median. `self` keeps the lower half; the
    /// median and a new node holding the upper half are returned.
    fn split(&mut self) -> ((K, V), Node<K, V>) {
        let mid = self.items.len() / 2;
        let upper = self.items.split_off(mid + 1);
        let median = self.items.remove(mid);
        let children = match &mut self.children {
            Children::Leaf => Children::Leaf,
            Children::Branch(children) => Children::Branch(children.split_off(mid + 1)),
        };
        let right = Node {
            cow: self.cow,
            items: upper,
            children,
        };
        (median, right)
    }

    /// Insert into the subtree rooted here. `self` must already be mutable
    /// for `cow`. Full children are split on the way back up.
    pub(crate) fn insert<C: Comparator<K>>(
        &mut self,
        key: K,
        value: V,
        cmp: &C,
        layout: Layout,
        cow: Cow,
    ) -> Insertion<K, V> {
        let (i, found) = self.search(&key, cmp);
        if found {
            return Insertion::Replaced(mem::replace(&mut self.items[i], (key, value)));
        }

        let children = match &mut self.children {
            Children::Leaf => {
                if self.items.len() == layout.max_items {
                    return Insertion::Full(key, value);
                }
                self.items.insert(i, (key, value));
                return Insertion::Inserted;
            }
            Children::Branch(children) => children,
        };

        let (key, value) = match mutable(&mut children[i], cow).insert(key, value, cmp, layout, cow) {
            Insertion::Full(key, value) => (key, value),
            done => return done,
        };

        if self.items.len() == layout.max_items {
            return Insertion::Full(key, value);
        }
        let (median, right) = mutable(&mut children[i], cow).split();
        children.insert(i + 1, Arc::new(right));
        self.items.insert(i, median);
        self.insert(key, value, cmp, layout, cow)
    }

    /// Locate `key` for writing, copying every node on the way down.
    pub(crate) fn get_mut<C: Comparator<K>>(&mut self, key: &K, cmp: &C, cow: Cow) -> Option<&mut V> {
        let (i, found) = self.search(key, cmp);
        if found {
            return Some(&mut self.items[i].1);
        }
        match &mut self.children {
            Children::Leaf => None,
            Children::Branch(children) => mutable(&mut children[i], cow).get_mut(key, cmp, cow),
        }
    }

    /// Remove from the subtree rooted here. `self` must already be mutable
    /// for `cow`. Children left under `min_items` are refilled from a sibling
    /// or merged into one before returning.
    pub(crate) fn remove<C: Comparator<K>>(
        &mut self,
        target: Target<'_, K>,
        cmp: &C,
        layout: Layout,
        cow: Cow,
    ) -> Option<(K, V)> {
        let (i, found) = match target {
            Target::Key(key) => self.search(key, cmp),
            Target::First => (0, self.is_leaf() && !self.items.is_empty()),
            Target::Last => match (&self.children, self.items.len()) {
                (Children::Leaf, 0) => (0, false),
                (Children::Leaf, n) => (n - 1, true),
                (Children::Branch(_), n) => (n, false),
            },
        };

        let children = match &mut self.children {
            Children::Leaf => {
                return if found {
                    Some(self.items.remove(i))
                } else {
                    None
                };
            }
            Children::Branch(children) => children,
        };

        let removed = if found {
            // Pull the predecessor up from the left subtree into this slot.
            let predecessor = mutable(&mut children[i], cow).remove(Target::Last, cmp, layout, cow);
            debug_assert!(predecessor.is_some(), "non-root subtree cannot be empty");
            mem::replace(&mut self.items[i], predecessor?)
        } else {
            mutable(&mut children[i], cow).remove(target, cmp, layout, cow)?
        };

        if children[i].items.len() < layout.min_items {
            self.rebalance(i, layout, cow);
        }
        Some(removed)
    }

    /// Restore `min_items` in child `i` by merging it with a neighbour or
    /// rotating one item through the separator.
    fn rebalance(&mut self, i: usize, layout: Layout, cow: Cow) {
        let Node { items, children, .. } = self;
        let Children::Branch(children) = children else {
            return;
        };

        // Work on the pair (i, i + 1); the last child pairs with its left neighbour.
        let i = if i == items.len() { i - 1 } else { i };
        let (head, tail) = children.split_at_mut(i + 1);
        let left = mutable(&mut head[i], cow);
        let right = mutable(&mut tail[0], cow);

        if left.items.len() + right.items.len() < layout.max_items {
            left.items.push(items.remove(i));
            left.items.append(&mut right.items);
            if let (Children::Branch(lc), Children::Branch(rc)) = (&mut left.children, &mut right.children) {
                lc.append(rc);
            }
            children.remove(i + 1);
        } else if left.items.len() > right.items.len() {
            let Some(up) = left.items.pop() else {
                return;
            };
            right.items.insert(0, mem::replace(&mut items[i], up));
            if let (Children::Branch(lc), Children::Branch(rc)) = (&mut left.children, &mut right.children) {
                if let Some(child) = lc.pop() {
                    rc.insert(0, child);
                }
            }
        } else {
            let up = right.items.remove(0);
            left.items.push(mem::replace(&mut items[i], up));
            if let (Children::Branch(lc), Children::Branch(rc)) = (&mut left.children, &mut right.children) {
                lc.push(rc.remove(0));
            }
        }
    }
}
