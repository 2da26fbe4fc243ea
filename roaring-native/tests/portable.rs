use roaring::RoaringBitmap;
use roaring_native::{Bitmap, Error, FormatError, Portable};

fn decode(bytes: &[u8]) -> roaring_native::Result<Bitmap> {
    Bitmap::try_deserialize::<Portable>(bytes)
}

fn format_error(bytes: &[u8]) -> FormatError {
    match decode(bytes) {
        Err(Error::Format(err)) => err,
        other => panic!("expected a format error, got {other:?}"),
    }
}

#[test]
fn empty_bitmap() {
    let bytes = Bitmap::new().serialize::<Portable>();
    assert_eq!(bytes, [0x3a, 0x30, 0, 0, 0, 0, 0, 0]);
    assert!(decode(&bytes).unwrap().is_empty());
}

#[test]
fn small_array() {
    let bytes = Bitmap::of(&[1, 2, 3]).serialize::<Portable>();
    #[rustfmt::skip]
    let expected = [
        0x3a, 0x30, 0, 0, // cookie
        1, 0, 0, 0,       // one container
        0, 0, 2, 0,       // key 0, cardinality 3
        16, 0, 0, 0,      // offset
        1, 0, 2, 0, 3, 0,
    ];
    assert_eq!(bytes, expected);
    assert_eq!(decode(&bytes).unwrap().to_vec(), [1, 2, 3]);
}

#[test]
fn run_optimized_layout() {
    let mut bitmap = Bitmap::of(&[1, 2, 3, 4]);
    assert_eq!(bitmap.get_serialized_size_in_bytes::<Portable>(), 24);

    assert!(bitmap.run_optimize());
    let bytes = bitmap.serialize::<Portable>();
    #[rustfmt::skip]
    let expected = [
        0x3b, 0x30, 0, 0, // run cookie, one container
        1,                // run flags
        0, 0, 3, 0,       // key 0, cardinality 4
        1, 0,             // one run
        1, 0, 3, 0,       // start 1, length 4
    ];
    assert_eq!(bytes, expected);
    assert_eq!(decode(&bytes).unwrap(), bitmap);
}

#[test]
fn offsets_follow_run_headers_from_four_containers() {
    let mut bitmap: Bitmap = (0..4u32).map(|key| key << 16).collect();
    bitmap.add_range(0..100);
    bitmap.run_optimize();

    let bytes = bitmap.serialize::<Portable>();
    // cookie, one flag byte, four headers, four offsets
    let header = 4 + 1 + 16 + 16;
    assert_eq!(u32::from_le_bytes(bytes[21..25].try_into().unwrap()), header);
    assert_eq!(decode(&bytes).unwrap(), bitmap);
}

#[test]
fn prefix_and_trailing_bytes() {
    let bitmap = Bitmap::of(&[5, 1 << 20]);
    let mut bytes = bitmap.serialize::<Portable>();
    let len = bytes.len();
    bytes.extend_from_slice(&[0xff; 9]);

    assert_eq!(decode(&bytes).unwrap(), bitmap);
    let (decoded, used) = Bitmap::try_deserialize_prefix::<Portable>(&bytes).unwrap();
    assert_eq!(decoded, bitmap);
    assert_eq!(used, len);
}

#[test]
fn serialize_into_appends() {
    let bitmap = Bitmap::of(&[1, 2, 3]);
    let mut dst = b"head".to_vec();
    let written = bitmap.serialize_into::<Portable>(&mut dst).to_vec();
    assert_eq!(written.len(), 22);
    assert_eq!(&dst[..4], b"head");
    assert_eq!(&dst[4..], &written[..]);
}

#[test]
fn every_truncation_is_rejected() {
    let mut bitmap: Bitmap = (0..5000).chain([1 << 20, 3 << 20]).collect();
    bitmap.add_range(2 << 20..(2 << 20) + 300);
    bitmap.run_optimize();
    let bytes = bitmap.serialize::<Portable>();

    for len in 0..bytes.len() {
        assert!(
            matches!(format_error(&bytes[..len]), FormatError::Truncated { .. }),
            "prefix of {len} bytes"
        );
    }
}

#[test]
fn unknown_cookie() {
    let mut bytes = Bitmap::of(&[1]).serialize::<Portable>();
    bytes[0] = 0x00;
    assert!(matches!(format_error(&bytes), FormatError::UnknownCookie(_)));
}

#[test]
fn too_many_containers() {
    let mut bytes = vec![0x3a, 0x30, 0, 0];
    bytes.extend_from_slice(&(70_000u32).to_le_bytes());
    assert_eq!(format_error(&bytes), FormatError::TooManyContainers(70_000));
}

#[test]
fn unsorted_keys() {
    #[rustfmt::skip]
    let bytes = [
        0x3a, 0x30, 0, 0,
        2, 0, 0, 0,
        1, 0, 0, 0,       // key 1, one value
        1, 0, 0, 0,       // key 1 again
        24, 0, 0, 0,
        26, 0, 0, 0,
        7, 0, 8, 0,
    ];
    assert_eq!(format_error(&bytes), FormatError::UnsortedKeys { index: 1 });
}

#[test]
fn unsorted_array() {
    #[rustfmt::skip]
    let bytes = [
        0x3a, 0x30, 0, 0,
        1, 0, 0, 0,
        0, 0, 2, 0,
        16, 0, 0, 0,
        1, 0, 3, 0, 2, 0,
    ];
    assert_eq!(format_error(&bytes), FormatError::UnsortedArray { index: 0 });
}

#[test]
fn zero_runs() {
    #[rustfmt::skip]
    let bytes = [
        0x3b, 0x30, 0, 0,
        1,
        0, 0, 0, 0,
        0, 0,
    ];
    assert_eq!(format_error(&bytes), FormatError::EmptyContainer { index: 0 });
}

#[test]
fn overlapping_runs() {
    #[rustfmt::skip]
    let bytes = [
        0x3b, 0x30, 0, 0,
        1,
        0, 0, 7, 0,
        2, 0,
        0, 0, 4, 0,       // 0..=4
        3, 0, 2, 0,       // 3..=5
    ];
    assert_eq!(format_error(&bytes), FormatError::InvalidRuns { index: 0 });
}

#[test]
fn adjacent_runs_are_merged() {
    #[rustfmt::skip]
    let bytes = [
        0x3b, 0x30, 0, 0,
        1,
        0, 0, 5, 0,
        2, 0,
        0, 0, 2, 0,       // 0..=2
        3, 0, 2, 0,       // 3..=5
    ];
    let bitmap = decode(&bytes).unwrap();
    bitmap.internal_validate().unwrap();
    assert_eq!(bitmap.to_vec(), [0, 1, 2, 3, 4, 5]);
    assert_eq!(bitmap.get_serialized_size_in_bytes::<Portable>(), 15);
}

#[test]
fn oversized_runs_are_decoded_compactly() {
    #[rustfmt::skip]
    let bytes = [
        0x3b, 0x30, 0, 0,
        1,
        0, 0, 2, 0,
        3, 0,
        1, 0, 0, 0,       // 1
        3, 0, 0, 0,       // 3
        5, 0, 0, 0,       // 5
    ];
    let bitmap = decode(&bytes).unwrap();
    bitmap.internal_validate().unwrap();
    assert_eq!(bitmap.to_vec(), [1, 3, 5]);
    assert_eq!(bitmap, Bitmap::of(&[1, 3, 5]));
    assert_eq!(bitmap.get_serialized_size_in_bytes::<Portable>(), 22);
}

#[test]
fn scattered_adds_after_range_stay_compact() {
    let mut bitmap = Bitmap::new();
    bitmap.add_range(0..10);
    for v in (100..65_000).step_by(2) {
        bitmap.add(v);
    }
    bitmap.internal_validate().unwrap();
    assert_eq!(bitmap.cardinality(), 32_460);
    // cookie, count, one header entry, one offset, one bitmap container
    assert_eq!(bitmap.get_serialized_size_in_bytes::<Portable>(), 16 + 8192);

    let bytes = bitmap.serialize::<Portable>();
    assert_eq!(decode(&bytes).unwrap(), bitmap);
}

#[test]
fn cardinality_mismatch() {
    #[rustfmt::skip]
    let bytes = [
        0x3b, 0x30, 0, 0,
        1,
        0, 0, 9, 0,       // declares ten values
        1, 0,
        0, 0, 2, 0,       // holds three
    ];
    assert_eq!(
        format_error(&bytes),
        FormatError::CardinalityMismatch {
            index: 0,
            declared: 10,
            actual: 3
        }
    );
}

#[test]
fn readable_by_roaring() {
    let values: Vec<u32> = (0..10_000)
        .map(|i| i * 13)
        .chain(1_000_000..1_005_000)
        .chain([u32::MAX])
        .collect();
    let bitmap = Bitmap::of(&values);
    let bytes = bitmap.serialize::<Portable>();

    let other = RoaringBitmap::deserialize_from(&bytes[..]).unwrap();
    assert!(other.iter().eq(bitmap.iter()));

    let mut roundtrip = Vec::new();
    other.serialize_into(&mut roundtrip).unwrap();
    assert_eq!(roundtrip, bytes);
}

#[test]
fn reads_roaring() {
    let other: RoaringBitmap = (0..200_000).step_by(5).chain([7, u32::MAX]).collect();
    let mut bytes = Vec::new();
    other.serialize_into(&mut bytes).unwrap();
    assert_eq!(bytes.len(), other.serialized_size());

    let bitmap = decode(&bytes).unwrap();
    bitmap.internal_validate().unwrap();
    assert!(bitmap.iter().eq(other.iter()));
}
