use roaring_native::{AnyBitmap, Bitmap, Bitmap64, Error, Width};

fn handle(width: Width, values: &[u64]) -> AnyBitmap {
    let mut bitmap = AnyBitmap::new(width);
    for &value in values {
        bitmap.add(value).unwrap();
    }
    bitmap
}

#[test]
fn both_widths_behave_alike_within_u32() {
    for width in [Width::Bits32, Width::Bits64] {
        let mut bitmap = AnyBitmap::new(width);
        assert_eq!(bitmap.width(), width);
        assert!(bitmap.is_empty());

        bitmap.add_range(1, 5);
        assert_eq!(bitmap.to_vec(), [1, 2, 3, 4]);
        assert_eq!(bitmap.range_cardinality(0, 5), 4);
        assert_eq!(bitmap.rank(3), 3);
        assert_eq!(bitmap.select(2), Some(3));
        assert_eq!(bitmap.position(4), Some(3));
        assert!(bitmap.contains_range(1, 5));
        assert!(!bitmap.contains_range(0, 5));

        assert!(bitmap.add_checked(10).unwrap());
        assert!(!bitmap.add_checked(10).unwrap());
        assert!(bitmap.remove_checked(10));
        assert!(!bitmap.remove_checked(10));

        bitmap.remove_range(2, 4);
        assert_eq!(bitmap.to_vec(), [1, 4]);
        assert_eq!(bitmap.minimum(), 1);
        assert_eq!(bitmap.maximum(), 4);

        bitmap.clear();
        assert_eq!(bitmap.cardinality(), 0);
        assert_eq!(bitmap.minimum(), width.max_value());
        assert_eq!(bitmap.maximum(), 0);
    }
}

#[test]
fn algebra_scenario() {
    for width in [Width::Bits32, Width::Bits64] {
        let a = handle(width, &[1, 2, 3]);
        let b = handle(width, &[2, 3, 4]);

        assert_eq!(a.and(&b).unwrap().to_vec(), [2, 3]);
        assert_eq!(a.or(&b).unwrap().to_vec(), [1, 2, 3, 4]);
        assert_eq!(a.xor(&b).unwrap().to_vec(), [1, 4]);
        assert_eq!(a.andnot(&b).unwrap().to_vec(), [1]);
        assert_eq!(a.and_cardinality(&b).unwrap(), 2);
        assert_eq!(a.or_cardinality(&b).unwrap(), 4);
        assert_eq!(a.xor_cardinality(&b).unwrap(), 2);
        assert_eq!(a.andnot_cardinality(&b).unwrap(), 1);
        assert!(a.intersect(&b).unwrap());
        assert!(!a.is_subset(&b).unwrap());
        assert!(a.and(&b).unwrap().is_strict_subset(&a).unwrap());

        let mut c = a.clone();
        c.xor_inplace(&b).unwrap();
        c.or_inplace(&b).unwrap();
        c.andnot_inplace(&a).unwrap();
        c.and_inplace(&b).unwrap();
        assert_eq!(c.to_vec(), [4]);
    }
}

#[test]
fn mixing_widths_is_an_error() {
    let mut narrow = handle(Width::Bits32, &[1, 2]);
    let wide = handle(Width::Bits64, &[2, 1 << 40]);

    let err = narrow.or(&wide).unwrap_err();
    assert!(matches!(
        err,
        Error::TypeMismatch {
            expected: Width::Bits32,
            found: Width::Bits64
        }
    ));
    assert!(narrow.and_inplace(&wide).is_err());
    assert!(narrow.equals(&wide).is_err());
    assert!(wide.is_subset(&narrow).is_err());
    assert!(narrow.to_vec64().is_err());
    assert!(wide.to_vec32().is_err());

    assert_eq!(narrow.to_vec(), [1, 2]);
    assert_eq!(wide.to_vec(), [2, 1 << 40]);
}

#[test]
fn values_past_32_bits() {
    let mut narrow = AnyBitmap::new(Width::Bits32);
    assert!(matches!(
        narrow.add(1 << 32),
        Err(Error::OutOfRange {
            value: 4_294_967_296,
            width: Width::Bits32
        })
    ));
    assert!(narrow.add_many64(&[1, 1 << 33]).is_err());
    assert!(narrow.is_empty());

    narrow.add(u64::from(u32::MAX)).unwrap();
    assert!(!narrow.contains(1 << 32));
    narrow.remove(1 << 32);
    assert_eq!(narrow.rank(u64::MAX), 1);
    assert_eq!(narrow.position(1 << 32), None);

    // ranges are clamped to the 32-bit domain
    narrow.add_range(u64::from(u32::MAX) - 1, u64::MAX);
    assert_eq!(narrow.cardinality(), 2);
    assert!(narrow.contains_range(u64::from(u32::MAX) - 1, 1 << 32));

    let mut wide = AnyBitmap::new(Width::Bits64);
    assert!(matches!(wide.add_many32(&[1, 2]), Err(Error::TypeMismatch { .. })));
    assert!(wide.is_empty());
    wide.add_many64(&[1, 2]).unwrap();
    wide.add(u64::MAX).unwrap();
    assert_eq!(wide.to_vec64().unwrap(), [1, 2, u64::MAX]);
}

#[test]
fn serialization_follows_width() {
    let narrow = AnyBitmap::from(Bitmap::of(&[1, 2, 3]));
    let wide = AnyBitmap::from(Bitmap64::of(&[1, 2, 3]));

    let narrow_bytes = narrow.serialize();
    let wide_bytes = wide.serialize();
    assert_eq!(narrow_bytes.len(), 22);
    assert_eq!(wide_bytes.len(), 8 + 4 + 22);
    assert_eq!(narrow.get_serialized_size_in_bytes(), 22);
    assert_eq!(wide.get_serialized_size_in_bytes(), 34);

    let decoded = AnyBitmap::deserialize(Width::Bits64, &wide_bytes).unwrap();
    assert!(decoded.equals(&wide).unwrap());
    assert_eq!(decoded.as_bitmap64(), wide.as_bitmap64());
    assert!(decoded.as_bitmap().is_none());

    let mut target = handle(Width::Bits32, &[9]);
    target.deserialize_in_place(&narrow_bytes).unwrap();
    assert_eq!(target.to_vec32().unwrap(), [1, 2, 3]);

    assert!(target.deserialize_in_place(&narrow_bytes[..10]).is_err());
    assert_eq!(target.to_vec(), [1, 2, 3]);
}

#[test]
fn chunked_iteration() {
    let mut bitmap = AnyBitmap::new(Width::Bits64);
    bitmap.add_range((7 << 32) - 3, (7 << 32) + 3);
    let mut iter = bitmap.iter();
    let mut buf = [0u64; 4];

    assert_eq!(iter.next_many(&mut buf), 4);
    assert_eq!(buf, [(7 << 32) - 3, (7 << 32) - 2, (7 << 32) - 1, 7 << 32]);
    assert_eq!(iter.next_many(&mut buf), 2);
    assert_eq!(iter.next(), None);
}
