#![no_main]

use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;
use roaring_native::{AnyBitmap, Bitmap, Bitmap64, Portable, Width};

fn check_bitmap(input: &[u8]) {
    let Ok((mut bitmap, used)) = Bitmap::try_deserialize_prefix::<Portable>(input) else {
        return;
    };
    bitmap.internal_validate().unwrap();
    assert!(used <= input.len());

    let encoded = bitmap.serialize::<Portable>();
    assert_eq!(encoded.len(), bitmap.get_serialized_size_in_bytes::<Portable>());
    assert_eq!(Bitmap::try_deserialize::<Portable>(&encoded).unwrap(), bitmap);

    let start_cardinality = bitmap.cardinality();
    let mut new_cardinality = start_cardinality;
    for i in 100..1000 {
        if bitmap.add_checked(i) {
            new_cardinality += 1;
        }
    }
    assert_eq!(new_cardinality, bitmap.cardinality(), "Cardinality mismatch");
    bitmap.internal_validate().unwrap();
}

fn check_bitmap64(input: &[u8]) {
    let Ok(mut bitmap) = Bitmap64::try_deserialize::<Portable>(input) else {
        return;
    };
    bitmap.internal_validate().unwrap();

    let encoded = bitmap.serialize::<Portable>();
    assert_eq!(Bitmap64::try_deserialize::<Portable>(&encoded).unwrap(), bitmap);

    let start_cardinality = bitmap.cardinality();
    let mut new_cardinality = start_cardinality;
    for i in 100..1000 {
        if bitmap.add_checked(i) {
            new_cardinality += 1;
        }
    }
    assert_eq!(new_cardinality, bitmap.cardinality(), "Cardinality mismatch");
}

fn check_handle(width: Width, input: &[u8]) {
    let mut handle = AnyBitmap::new(width);
    handle.add(7).unwrap();
    match handle.deserialize_in_place(input) {
        Ok(()) => assert_eq!(handle.width(), width),
        Err(_) => assert_eq!(handle.to_vec(), [7]),
    }
}

#[derive(Arbitrary, Debug)]
enum BitmapType {
    Portable32,
    Portable64,
    Handle32,
    Handle64,
}

fuzz_target!(|input: (BitmapType, &[u8])| {
    let (ty, input) = input;
    match ty {
        BitmapType::Portable32 => check_bitmap(input),
        BitmapType::Portable64 => check_bitmap64(input),
        BitmapType::Handle32 => check_handle(Width::Bits32, input),
        BitmapType::Handle64 => check_handle(Width::Bits64, input),
    }
});
