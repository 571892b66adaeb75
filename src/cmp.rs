//! Caller-supplied key ordering.

/// A strict weak ordering over `K`.
///
/// `less` must be irreflexive, transitive and consistent for the lifetime of
/// the tree. Two keys are considered equal when neither is less than the other.
/// Violating the contract does not cause memory unsafety, but lookups, inserts
/// and removals may then return arbitrary results.
///
/// Any `Fn(&K, &K) -> bool` closure or function is a comparator:
///
/// ```rust
/// use cowtree::CowTree;
///
/// let mut by_len = CowTree::new(|a: &&str, b: &&str| a.len() < b.len());
/// by_len.insert("ccc", 3);
/// by_len.insert("a", 1);
/// assert_eq!(by_len.first(), Some((&"a", &1)));
/// ```
pub trait Comparator<K: ?Sized> {
    fn less(&self, a: &K, b: &K) -> bool;
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> bool,
{
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        self(a, b)
    }
}
