use std::cmp::Ordering;

use avl_list::{AvlTreeList, Handle};
use proptest::prelude::*;
use proptest::test_runner::Config;

type Entry = (i16, u32);
type Comparator = fn(&Entry, &Entry) -> Ordering;

fn by_key(a: &Entry, b: &Entry) -> Ordering {
    a.0.cmp(&b.0)
}

#[derive(Debug, Clone)]
enum Op {
    Add(i16),
    Remove(usize),
    PopSmallest,
    PopGreatest,
    Reposition(usize, i16),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (-64i16..64).prop_map(Op::Add),
        2 => any::<usize>().prop_map(Op::Remove),
        1 => Just(Op::PopSmallest),
        1 => Just(Op::PopGreatest),
        2 => (any::<usize>(), -64i16..64).prop_map(|(at, key)| Op::Reposition(at, key)),
    ]
}

fn assert_invariants(list: &AvlTreeList<Entry, Comparator>) {
    assert!(list.is_balanced());
    assert!(list.is_tree_sorted());
    assert!(list.is_list_sorted());
    assert!(list.is_count_consistent());
}

proptest! {
    #![proptest_config(Config {
        cases: 128,
        ..Config::default()
    })]

    /// Stable sort of the inserted values, ties in insertion order.
    #[test]
    fn add_matches_stable_sort(keys in prop::collection::vec(-100i16..100, 0..500)) {
        let mut list = AvlTreeList::with_comparator(by_key as Comparator);
        let mut expected = Vec::with_capacity(keys.len());
        for (seq, key) in keys.iter().enumerate() {
            list.add((*key, seq as u32));
            expected.push((*key, seq as u32));
            assert_invariants(&list);
        }
        expected.sort_by(by_key);

        prop_assert_eq!(list.len(), expected.len());
        prop_assert_eq!(list.to_vec(), expected.clone());
        expected.reverse();
        prop_assert_eq!(list.iter().rev().copied().collect::<Vec<_>>(), expected);
    }

    /// Random mix of mutations against a plain vector model.
    #[test]
    fn mutations_keep_invariants(ops in prop::collection::vec(op(), 1..400)) {
        let mut list = AvlTreeList::with_comparator(by_key as Comparator);
        let mut live: Vec<(Handle, Entry)> = Vec::new();
        let mut seq = 0u32;

        for op in ops {
            match op {
                Op::Add(key) => {
                    let entry = (key, seq);
                    seq += 1;
                    live.push((list.add(entry), entry));
                }
                Op::Remove(at) if !live.is_empty() => {
                    let (handle, entry) = live.swap_remove(at % live.len());
                    prop_assert_eq!(list.remove(handle), Ok(entry));
                    prop_assert!(list.remove(handle).is_err());
                }
                Op::PopSmallest => {
                    let popped = list.pop_smallest();
                    let min = live.iter().map(|(_, entry)| entry.0).min();
                    prop_assert_eq!(popped.map(|entry| entry.0), min);
                    if let Some(entry) = popped {
                        live.retain(|(_, live_entry)| *live_entry != entry);
                    }
                }
                Op::PopGreatest => {
                    let popped = list.pop_greatest();
                    let max = live.iter().map(|(_, entry)| entry.0).max();
                    prop_assert_eq!(popped.map(|entry| entry.0), max);
                    if let Some(entry) = popped {
                        live.retain(|(_, live_entry)| *live_entry != entry);
                    }
                }
                Op::Reposition(at, key) if !live.is_empty() => {
                    let at = at % live.len();
                    let handle = live[at].0;
                    list.update(handle, |entry| entry.0 = key).unwrap();
                    live[at].1 .0 = key;
                }
                Op::Remove(_) | Op::Reposition(..) => {}
            }

            assert_invariants(&list);
            prop_assert_eq!(list.len(), live.len());
            for (handle, entry) in live.iter() {
                prop_assert_eq!(list.get(*handle), Some(entry));
            }
        }

        let mut keys: Vec<_> = live.iter().map(|(_, entry)| entry.0).collect();
        keys.sort();
        prop_assert_eq!(list.iter().map(|entry| entry.0).collect::<Vec<_>>(), keys);
    }

    /// Neighbor queries agree with a linear scan.
    #[test]
    fn neighbors_match_scan(
        keys in prop::collection::vec(-1000i32..1000, 0..200),
        probes in prop::collection::vec(-1100i32..1100, 1..50),
    ) {
        let list: AvlTreeList<i32> = keys.iter().copied().collect();
        for probe in probes {
            let exact = keys.contains(&probe).then_some(probe);
            let above = exact.or_else(|| keys.iter().copied().filter(|key| *key > probe).min());
            let below = exact.or_else(|| keys.iter().copied().filter(|key| *key < probe).max());
            prop_assert_eq!(list.get_smallest_above(&probe).copied(), above);
            prop_assert_eq!(list.get_greatest_below(&probe).copied(), below);
        }
    }
}
