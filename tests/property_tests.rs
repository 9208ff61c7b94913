use proptest::prelude::*;
use rangedict::{DualList, PlainList, RangeIterable, RangedList, Readable, Run, Writable};

#[derive(Debug, Clone)]
enum Op {
    Id(usize, u8),
    Slice(usize, usize, u8),
    Ids(Vec<usize>, u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<usize>(), 0..4u8).prop_map(|(id, v)| Op::Id(id, v)),
        (any::<usize>(), any::<usize>(), 0..4u8).prop_map(|(a, b, v)| Op::Slice(a, b, v)),
        (prop::collection::vec(any::<usize>(), 0..8), 0..4u8).prop_map(|(ids, v)| Op::Ids(ids, v)),
    ]
}

/// Apply `op` to both lists, folding raw numbers into `[0, size)`.
fn apply(op: &Op, size: usize, ranged: &mut RangedList<u8>, plain: &mut PlainList<u8>) {
    match op {
        Op::Id(id, v) => {
            let id = id % size;
            ranged.set_value_by_id(id, *v).unwrap();
            plain.set_value_by_id(id, *v).unwrap();
        }
        Op::Slice(a, b, v) => {
            let (a, b) = (a % (size + 1), b % (size + 1));
            ranged.set_value_by_slice(a, b, *v).unwrap();
            plain.set_value_by_slice(a, b, *v).unwrap();
        }
        Op::Ids(ids, v) => {
            let ids: Vec<usize> = ids.iter().map(|id| id % size).collect();
            ranged.set_value_by_ids(&ids, *v).unwrap();
            plain.set_value_by_ids(&ids, *v).unwrap();
        }
    }
}

proptest! {
    #[test]
    fn test_ranged_list_matches_plain_list(
        size in 1..60usize,
        ops in prop::collection::vec(op_strategy(), 0..40),
    ) {
        let mut ranged = RangedList::new(size, 0u8);
        let mut plain = PlainList::new(size, 0u8);
        for op in &ops {
            apply(op, size, &mut ranged, &mut plain);
            prop_assert!(ranged.check_invariants());
        }

        prop_assert_eq!(ranged.iter().collect::<Vec<_>>(), plain.as_slice().to_vec());
        // Both tables are maximal, so they must be identical.
        prop_assert_eq!(ranged.get_ranges(), plain.get_ranges());
        for value in 0..4u8 {
            prop_assert_eq!(ranged.count(&value), plain.count(&value));
            prop_assert_eq!(ranged.index(&value), plain.index(&value));
        }
    }

    #[test]
    fn test_set_values_matches_elementwise_writes(
        values in prop::collection::vec(0..3u8, 1..50),
        a in any::<usize>(),
        b in any::<usize>(),
        fill in prop::collection::vec(0..3u8, 50),
        ids_raw in prop::collection::vec(any::<usize>(), 0..12),
    ) {
        let size = values.len();
        let (a, b) = (a % (size + 1), b % (size + 1));
        let (start, stop) = (a.min(b), a.max(b));
        let mut ranged = RangedList::from_values(values.clone());
        let mut plain = PlainList::from_values(values);

        let span = &fill[..stop - start];
        ranged.set_values_by_slice(a, b, span.iter().copied()).unwrap();
        for (offset, &value) in span.iter().enumerate() {
            plain.set_value_by_id(start + offset, value).unwrap();
        }
        prop_assert!(ranged.check_invariants());
        prop_assert_eq!(ranged.get_ranges(), plain.get_ranges());

        let ids: Vec<usize> = ids_raw.iter().map(|id| id % size).collect();
        let by_id = &fill[..ids.len()];
        ranged.set_values_by_ids(&ids, by_id.iter().copied()).unwrap();
        for (&id, &value) in ids.iter().zip(by_id) {
            plain.set_value_by_id(id, value).unwrap();
        }
        prop_assert!(ranged.check_invariants());
        prop_assert_eq!(ranged.get_ranges(), plain.get_ranges());

        prop_assert!(ranged.set_values_by_slice(0, size, vec![0u8; size + 1]).is_err());
    }

    #[test]
    fn test_set_then_get_leaves_other_ids(
        values in prop::collection::vec(0..3u8, 1..50),
        id_raw in any::<usize>(),
        value in 0..3u8,
    ) {
        let id = id_raw % values.len();
        let mut list = RangedList::from_values(values.clone());
        list.set_value_by_id(id, value).unwrap();

        prop_assert_eq!(list.get_value_by_id(id).unwrap(), value);
        for (other, &expected) in values.iter().enumerate() {
            if other != id {
                prop_assert_eq!(list.get_value_by_id(other).unwrap(), expected);
            }
        }
        prop_assert!(list.check_invariants());
    }

    #[test]
    fn test_rewriting_current_value_is_noop(
        values in prop::collection::vec(0..3u8, 1..50),
        id_raw in any::<usize>(),
    ) {
        let id = id_raw % values.len();
        let mut list = RangedList::from_values(values);
        let before = list.get_ranges();
        let current = list.get_value_by_id(id).unwrap();
        list.set_value_by_id(id, current).unwrap();
        prop_assert_eq!(list.get_ranges(), before);
    }

    #[test]
    fn test_set_value_by_ids_is_order_independent(
        values in prop::collection::vec(0..3u8, 1..40),
        ids_raw in prop::collection::vec(any::<usize>(), 0..10),
        value in 0..3u8,
    ) {
        let ids: Vec<usize> = ids_raw.iter().map(|id| id % values.len()).collect();
        let mut reversed_ids = ids.clone();
        reversed_ids.reverse();

        let mut forward = RangedList::from_values(values.clone());
        let mut backward = RangedList::from_values(values);
        forward.set_value_by_ids(&ids, value).unwrap();
        backward.set_value_by_ids(&reversed_ids, value).unwrap();
        prop_assert_eq!(forward.get_ranges(), backward.get_ranges());
    }

    #[test]
    fn test_ranges_by_slice_and_ids_match_baseline(
        values in prop::collection::vec(0..3u8, 1..40),
        a in any::<usize>(),
        b in any::<usize>(),
        ids_raw in prop::collection::vec(any::<usize>(), 0..12),
    ) {
        let size = values.len();
        let (a, b) = (a % (size + 1), b % (size + 1));
        let ids: Vec<usize> = ids_raw.iter().map(|id| id % size).collect();
        let ranged = RangedList::from_values(values.clone());
        let plain = PlainList::from_values(values);

        let got: Vec<Run<u8>> = ranged.iter_ranges_by_slice(a, b).unwrap().collect();
        let want: Vec<Run<u8>> = plain.iter_ranges_by_slice(a, b).unwrap().collect();
        prop_assert_eq!(got, want);

        let got: Vec<Run<u8>> = ranged.iter_ranges_by_ids(&ids).unwrap().collect();
        let want: Vec<Run<u8>> = plain.iter_ranges_by_ids(&ids).unwrap().collect();
        prop_assert_eq!(got, want);

        prop_assert_eq!(
            ranged.iter_by_ids(&ids).unwrap().collect::<Vec<_>>(),
            ids.iter().map(|&id| plain.as_slice()[id]).collect::<Vec<_>>()
        );
        prop_assert_eq!(
            ranged.get_value_by_slice(a, b).is_ok(),
            plain.get_value_by_slice(a, b).is_ok()
        );
    }

    #[test]
    fn test_dual_list_matches_elementwise(
        left in prop::collection::vec(0..4u32, 1..40),
        right_raw in prop::collection::vec(0..4u32, 1..40),
    ) {
        let size = left.len();
        let right: Vec<u32> = (0..size).map(|i| right_raw[i % right_raw.len()]).collect();
        let left_list = RangedList::from_values(left.clone());
        let right_list = RangedList::from_values(right.clone());
        let sum = DualList::add(&left_list, &right_list).unwrap();

        let expected: Vec<u32> = left.iter().zip(&right).map(|(a, b)| a + b).collect();
        prop_assert_eq!(sum.iter().collect::<Vec<_>>(), expected.clone());
        prop_assert_eq!(sum.get_ranges(), PlainList::from_values(expected).get_ranges());
    }
}
