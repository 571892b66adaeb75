//! Lazy in-order traversal.
//!
//! Both iterators keep an explicit stack of `(node, index)` frames borrowed
//! from the tree, so they never touch shared state and can be dropped at any
//! item.

use std::iter::FusedIterator;

use crate::cmp::Comparator;
use crate::node::{Children, Node};

/// Ascending iterator, optionally starting at the first key `>= pivot`.
pub struct Ascend<'a, K, V> {
    /// `(node, i)`: `node.items[i]` is the next item to yield from `node`,
    /// after any deeper frames are exhausted.
    stack: Vec<(&'a Node<K, V>, usize)>,
}

impl<'a, K, V> Ascend<'a, K, V> {
    pub(crate) fn new(root: &'a Node<K, V>) -> Self {
        let mut it = Self { stack: Vec::new() };
        it.push_leftmost(root);
        it
    }

    pub(crate) fn seek<C: Comparator<K>>(root: &'a Node<K, V>, pivot: &K, cmp: &C) -> Self {
        let mut stack = Vec::new();
        let mut node = root;
        loop {
            let (i, found) = node.search(pivot, cmp);
            stack.push((node, i));
            if found {
                break;
            }
            match &node.children {
                Children::Leaf => break,
                Children::Branch(children) => node = &children[i],
            }
        }
        Self { stack }
    }

    fn push_leftmost(&mut self, mut node: &'a Node<K, V>) {
        loop {
            self.stack.push((node, 0));
            match &node.children {
                Children::Leaf => return,
                Children::Branch(children) => node = &children[0],
            }
        }
    }
}

impl<'a, K, V> Iterator for Ascend<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node, i) = self.stack.last_mut()?;
            let node: &'a Node<K, V> = *node;
            if *i < node.items.len() {
                let idx = *i;
                *i += 1;
                if let Children::Branch(children) = &node.children {
                    self.push_leftmost(&children[idx + 1]);
                }
                let (k, v) = &node.items[idx];
                return Some((k, v));
            }
            self.stack.pop();
        }
    }
}

impl<K, V> FusedIterator for Ascend<'_, K, V> {}

/// Descending iterator, optionally starting at the last key `<= pivot`.
pub struct Descend<'a, K, V> {
    /// `(node, i)`: `node.items[i - 1]` is the next item to yield from `node`.
    stack: Vec<(&'a Node<K, V>, usize)>,
}

impl<'a, K, V> Descend<'a, K, V> {
    pub(crate) fn new(root: &'a Node<K, V>) -> Self {
        let mut it = Self { stack: Vec::new() };
        it.push_rightmost(root);
        it
    }

    pub(crate) fn seek<C: Comparator<K>>(root: &'a Node<K, V>, pivot: &K, cmp: &C) -> Self {
        let mut stack = Vec::new();
        let mut node = root;
        loop {
            // Number of items `<= pivot`.
            let j = node.items.partition_point(|(k, _)| !cmp.less(pivot, k));
            let found = j > 0 && !cmp.less(&node.items[j - 1].0, pivot);
            stack.push((node, j));
            if found {
                break;
            }
            match &node.children {
                Children::Leaf => break,
                Children::Branch(children) => node = &children[j],
            }
        }
        Self { stack }
    }

    fn push_rightmost(&mut self, mut node: &'a Node<K, V>) {
        loop {
            let n = node.items.len();
            self.stack.push((node, n));
            match &node.children {
                Children::Leaf => return,
                Children::Branch(children) => node = &children[n],
            }
        }
    }
}

impl<'a, K, V> Iterator for Descend<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node, i) = self.stack.last_mut()?;
            let node: &'a Node<K, V> = *node;
            if *i > 0 {
                *i -= 1;
                let idx = *i;
                if let Children::Branch(children) = &node.children {
                    self.push_rightmost(&children[idx]);
                }
                let (k, v) = &node.items[idx];
                return Some((k, v));
            }
            self.stack.pop();
        }
    }
}

impl<K, V> FusedIterator for Descend<'_, K, V> {}

/// Keys of an [`Ascend`] or [`Descend`] traversal.
pub struct Keys<I>(pub(crate) I);

impl<'a, K: 'a, V: 'a, I> Iterator for Keys<I>
where
    I: Iterator<Item = (&'a K, &'a V)>,
{
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, _)| k)
    }
}

impl<'a, K: 'a, V: 'a, I> FusedIterator for Keys<I> where I: FusedIterator<Item = (&'a K, &'a V)> {}

/// Values of an [`Ascend`] or [`Descend`] traversal.
pub struct Values<I>(pub(crate) I);

impl<'a, K: 'a, V: 'a, I> Iterator for Values<I>
where
    I: Iterator<Item = (&'a K, &'a V)>,
{
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, v)| v)
    }
}

impl<'a, K: 'a, V: 'a, I> FusedIterator for Values<I> where I: FusedIterator<Item = (&'a K, &'a V)> {}
