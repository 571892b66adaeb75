use super::*;

use proptest::prelude::*;
use std::collections::BTreeMap;

type Tree = CowTree<u16, u64, fn(&u16, &u16) -> bool>;

fn less(a: &u16, b: &u16) -> bool {
    a < b
}

fn new_tree(degree: usize) -> Tree {
    CowTree::with_options(less as fn(&u16, &u16) -> bool, Options::with_degree(degree)).unwrap()
}

/// Check ordering, node size bounds, uniform leaf depth and the item count.
fn validate_tree<K, V, C: Comparator<K>>(t: &CowTree<K, V, C>) {
    fn walk<K, V, C: Comparator<K>>(
        node: &Node<K, V>,
        cmp: &C,
        layout: Layout,
        is_root: bool,
        depth: usize,
        leaf_depth: &mut Option<usize>,
    ) -> usize {
        let n = node.items.len();
        assert!(n <= layout.max_items, "node over capacity: {n}");
        if !is_root {
            assert!(n >= layout.min_items, "node under min: {n}");
        }
        for w in node.items.windows(2) {
            assert!(cmp.less(&w[0].0, &w[1].0), "items not strictly ordered");
        }

        let children = node.children();
        if node.is_leaf() {
            match *leaf_depth {
                Some(d) => assert_eq!(d, depth, "leaves at different depths"),
                None => *leaf_depth = Some(depth),
            }
            return n;
        }

        assert_eq!(children.len(), n + 1, "branch must have items + 1 children");
        assert!(!is_root || n > 0, "branch root must not be empty");
        let mut count = n;
        for (i, child) in children.iter().enumerate() {
            // Child i sits strictly between separators i - 1 and i.
            if let Some((lo, _)) = i.checked_sub(1).map(|j| &node.items[j]) {
                if let Some((first, _)) = child.first() {
                    assert!(cmp.less(lo, first), "child below its lower separator");
                }
            }
            if let Some((hi, _)) = node.items.get(i) {
                if let Some((last, _)) = child.last() {
                    assert!(cmp.less(last, hi), "child above its upper separator");
                }
            }
            count += walk(child, cmp, layout, false, depth + 1, leaf_depth);
        }
        count
    }

    let mut leaf_depth = None;
    let count = walk(&t.root, &t.cmp, t.layout, true, 0, &mut leaf_depth);
    assert_eq!(count, t.count, "reachable item count must match CowTree::len");
    assert_eq!(leaf_depth.map(|d| d + 1), Some(t.height()));
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, u64),
    TryInsert(u16, u64),
    Remove(u16),
    Get(u16),
    PopFirst,
    PopLast,
    Snapshot,
}

fn key_strategy() -> impl Strategy<Value = u16> + Clone {
    // Small key space so removes and replacements actually hit.
    0u16..512
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        45 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        5 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::TryInsert(k, v)),
        25 => key.clone().prop_map(Op::Remove),
        20 => key.clone().prop_map(Op::Get),
        2 => Just(Op::PopFirst),
        2 => Just(Op::PopLast),
        1 => Just(Op::Snapshot),
    ];
    prop::collection::vec(op, 0..=2000)
}

fn items(t: &Tree) -> Vec<(u16, u64)> {
    t.iter().map(|(k, v)| (*k, *v)).collect()
}

fn model_items(m: &BTreeMap<u16, u64>) -> Vec<(u16, u64)> {
    m.iter().map(|(k, v)| (*k, *v)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(degree in 2usize..=6, ops in ops_strategy()) {
        let mut t = new_tree(degree);
        let mut m: BTreeMap<u16, u64> = BTreeMap::new();
        let mut snapshots: Vec<(Tree, BTreeMap<u16, u64>)> = Vec::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    prop_assert_eq!(t.insert(key, value), m.insert(key, value));
                }
                Op::TryInsert(key, value) => {
                    let got = t.try_insert(key, value).is_ok();
                    let expected = !m.contains_key(&key);
                    if expected {
                        m.insert(key, value);
                    }
                    prop_assert_eq!(got, expected);
                }
                Op::Remove(key) => {
                    prop_assert_eq!(t.remove(&key), m.remove(&key));
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key).copied(), m.get(&key).copied());
                }
                Op::PopFirst => {
                    prop_assert_eq!(t.pop_first(), m.pop_first());
                }
                Op::PopLast => {
                    prop_assert_eq!(t.pop_last(), m.pop_last());
                }
                Op::Snapshot => {
                    snapshots.push((t.clone(), m.clone()));
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_tree(&t);
        prop_assert_eq!(items(&t), model_items(&m));

        for (snapshot, model) in &snapshots {
            validate_tree(snapshot);
            prop_assert_eq!(items(snapshot), model_items(model));
        }
    }

    #[test]
    fn prop_pivot_iteration(
        degree in 2usize..=5,
        keys in prop::collection::btree_set(key_strategy(), 0..300),
        pivot in key_strategy(),
    ) {
        let mut t = new_tree(degree);
        for k in &keys {
            t.insert(*k, u64::from(*k));
        }

        let up: Vec<u16> = t.ascend(Some(&pivot)).map(|(k, _)| *k).collect();
        let expected: Vec<u16> = keys.range(pivot..).copied().collect();
        prop_assert_eq!(up, expected);

        let down: Vec<u16> = t.descend(Some(&pivot)).map(|(k, _)| *k).collect();
        let expected: Vec<u16> = keys.range(..=pivot).rev().copied().collect();
        prop_assert_eq!(down, expected);

        let all_down: Vec<u16> = t.descend(None).map(|(k, _)| *k).collect();
        let expected: Vec<u16> = keys.iter().rev().copied().collect();
        prop_assert_eq!(all_down, expected);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<u16> = (0..7).collect();

    for_each_permutation(&keys, |perm| {
        let mut t = new_tree(2);
        let mut m: BTreeMap<u16, u64> = BTreeMap::new();

        for (i, k) in perm.into_iter().enumerate() {
            let v = i as u64;
            assert_eq!(t.insert(k, v), m.insert(k, v));
            validate_tree(&t);
        }

        assert_eq!(items(&t), model_items(&m));
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys: Vec<u16> = (0..7).collect();

    // Insert in a fixed order, then remove in all permutations, each from a
    // snapshot of the same base tree.
    let mut base_tree = new_tree(2);
    let mut base_map: BTreeMap<u16, u64> = BTreeMap::new();
    for (i, k) in keys.iter().enumerate() {
        let v = i as u64;
        assert_eq!(base_tree.insert(*k, v), base_map.insert(*k, v));
    }
    let base_items = items(&base_tree);

    for_each_permutation(&keys, |perm| {
        let mut t = base_tree.clone();
        let mut m = base_map.clone();

        for k in perm {
            assert_eq!(t.remove(&k), m.remove(&k));
            assert_eq!(t.len(), m.len());
            validate_tree(&t);
        }
        assert_eq!(t.len(), 0);
        assert_eq!(t.height(), 1);
    });

    validate_tree(&base_tree);
    assert_eq!(items(&base_tree), base_items);
}

#[test]
fn merge_after_delete_at_min() {
    for degree in 2..=6 {
        let mut t = new_tree(degree);
        let mut k = 0u16;
        // Grow until the root splits, so every leaf is a non-root node.
        while t.height() < 2 {
            t.insert(k, 0);
            k += 1;
        }
        let layout = t.layout;
        let first_leaf_len = t.root.children()[0].items.len();
        assert_eq!(first_leaf_len, layout.min_items);

        t.remove(&0);
        validate_tree(&t);
        assert_eq!(t.len(), usize::from(k) - 1);
    }
}
