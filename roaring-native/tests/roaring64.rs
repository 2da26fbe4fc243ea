use proptest::prelude::*;
use roaring::RoaringTreemap;
use roaring_native::{Bitmap64, Portable};

fn expected_serialized_bitmap() -> Bitmap64 {
    let mut bitmap = Bitmap64::new();

    for i in 0..2u64 {
        let base = i << 32;
        // Range container
        bitmap.add_range(base | 0x0_0000..=base | 0x0_9000);
        bitmap.add_range(base | 0x0_A000..=base | 0x1_0000);
        // Array container
        bitmap.add(base | 0x2_0000);
        bitmap.add(base | 0x2_0005);
        // Bitmap container
        for j in (0..0x1_0000).step_by(2) {
            bitmap.add(base | 0x80000 + j);
        }
    }
    bitmap
}

#[test]
fn test_portable_roundtrip() {
    let mut expected = expected_serialized_bitmap();
    expected.run_optimize();

    let buffer = expected.serialize::<Portable>();
    assert_eq!(buffer.len(), expected.get_serialized_size_in_bytes::<Portable>());

    let bitmap = Bitmap64::try_deserialize::<Portable>(&buffer).unwrap();
    bitmap.internal_validate().unwrap();
    assert_eq!(bitmap, expected);
    assert!(bitmap.iter().eq(expected.iter()))
}

#[test]
fn test_portable_prefix_reports_consumed_bytes() {
    let expected = expected_serialized_bitmap();
    let mut buffer = expected.serialize::<Portable>();
    let len = buffer.len();
    buffer.extend_from_slice(b"trailing");

    let (bitmap, used) = Bitmap64::try_deserialize_prefix::<Portable>(&buffer).unwrap();
    assert_eq!(used, len);
    assert_eq!(bitmap, expected);
}

#[test]
fn test_readable_by_roaring_treemap() {
    let mut bitmap = expected_serialized_bitmap();
    bitmap.remove_run_compression();
    let buffer = bitmap.serialize::<Portable>();

    let treemap = RoaringTreemap::deserialize_from(&buffer[..]).unwrap();
    assert_eq!(treemap.len(), bitmap.cardinality());
    assert!(treemap.iter().eq(bitmap.iter()));
}

#[test]
fn test_reads_roaring_treemap() {
    let values: Vec<u64> = (0..3000u64)
        .map(|i| i * 7919)
        .chain((0..5000u64).map(|i| (5 << 32) | (i * 3)))
        .chain([u64::MAX])
        .collect();
    let treemap: RoaringTreemap = values.iter().copied().collect();
    let mut buffer = Vec::new();
    treemap.serialize_into(&mut buffer).unwrap();

    let bitmap = Bitmap64::try_deserialize::<Portable>(&buffer).unwrap();
    bitmap.internal_validate().unwrap();
    assert!(bitmap.iter().eq(treemap.iter()));

    // both sides pick the array or bitmap store by the same threshold
    assert_eq!(bitmap.serialize::<Portable>(), buffer);
}

#[test]
fn test_extremes() {
    let mut bitmap = Bitmap64::new();
    assert_eq!(bitmap.minimum(), None);
    assert_eq!(bitmap.maximum(), None);
    assert_eq!(bitmap.select(0), None);

    bitmap.add_range(u64::MAX - 2..);
    bitmap.add(0);
    assert_eq!(bitmap.to_vec(), [0, u64::MAX - 2, u64::MAX - 1, u64::MAX]);
    assert_eq!(bitmap.minimum(), Some(0));
    assert_eq!(bitmap.maximum(), Some(u64::MAX));
    assert_eq!(bitmap.rank(u64::MAX), 4);
    assert_eq!(bitmap.select(3), Some(u64::MAX));

    bitmap.remove_range(1..);
    assert_eq!(bitmap.to_vec(), [0]);
    bitmap.internal_validate().unwrap();
}

fn wide_values() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(
        prop_oneof![
            proptest::num::u64::ANY,
            (0u64..4, 0u64..(1 << 17)).prop_map(|(high, low)| (high << 32) | low),
        ],
        0..3000,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn treemap_cardinality_roundtrip(values in wide_values()) {
        let bitmap = Bitmap64::of(&values);
        let mut sorted = values;
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(bitmap.cardinality(), sorted.len() as u64);
        prop_assert_eq!(bitmap.to_vec(), sorted);
    }

    #[test]
    fn test_treemap_serialization_roundtrip(values in wide_values(), optimize in any::<bool>()) {
        let mut original = Bitmap64::of(&values);
        if optimize {
            original.run_optimize();
        }
        let buffer = original.serialize::<Portable>();
        let deserialized = Bitmap64::try_deserialize::<Portable>(&buffer).unwrap();
        prop_assert_eq!(original, deserialized);
    }

    #[test]
    fn treemap_algebra_matches_roaring(a in wide_values(), b in wide_values()) {
        let left = Bitmap64::of(&a);
        let right = Bitmap64::of(&b);
        let model_a: RoaringTreemap = a.iter().copied().collect();
        let model_b: RoaringTreemap = b.iter().copied().collect();

        prop_assert!(left.and(&right).iter().eq((&model_a & &model_b).iter()));
        prop_assert!(left.or(&right).iter().eq((&model_a | &model_b).iter()));
        prop_assert!(left.xor(&right).iter().eq((&model_a ^ &model_b).iter()));
        prop_assert!(left.andnot(&right).iter().eq((&model_a - &model_b).iter()));
        prop_assert_eq!(left.is_subset(&right), model_a.is_subset(&model_b));

        let mut inplace = left.clone();
        inplace -= &right;
        inplace.internal_validate().unwrap();
        prop_assert!(inplace.iter().eq((&model_a - &model_b).iter()));
    }

    #[test]
    fn treemap_rank_select_inverse(values in wide_values()) {
        let bitmap = Bitmap64::of(&values);
        for (r, value) in bitmap.iter().enumerate().step_by(17) {
            prop_assert_eq!(bitmap.select(r as u64), Some(value));
            prop_assert_eq!(bitmap.rank(value), r as u64 + 1);
            prop_assert_eq!(bitmap.position(value), Some(r as u64));
        }
    }
}
