use roaring::{RoaringBitmap, RoaringTreemap};
use roaring_native::{Bitmap, Bitmap64, Portable};

use criterion::measurement::Measurement;
use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkGroup, BenchmarkId, Criterion,
};

fn compare<Prep1, Prep2, Bench1, Bench2, In1, In2, Out1, Out2, M>(
    group: &mut BenchmarkGroup<'_, M>,
    mut prep1: Prep1,
    mut prep2: Prep2,
    mut bench1: Bench1,
    mut bench2: Bench2,
) where
    Prep1: FnMut() -> In1,
    Prep2: FnMut() -> In2,
    Bench1: FnMut(In1) -> Out1,
    Bench2: FnMut(In2) -> Out2,
    M: Measurement,
{
    group.bench_function("roaring-native", |b| {
        b.iter_batched(|| prep1(), |x| bench1(x), BatchSize::SmallInput);
    });
    group.bench_function("roaring-rs", |b| {
        b.iter_batched(|| prep2(), |x| bench2(x), BatchSize::SmallInput);
    });
}

fn roaring_bitmap_of(items: &[u32]) -> RoaringBitmap {
    items.iter().copied().collect()
}

/// Sparse values, a long run and a dense stretch.
fn mixed_items() -> Vec<u32> {
    (0..20_000)
        .map(|i| i * 47)
        .chain((1 << 20)..(1 << 20) + 50_000)
        .chain(((3 << 20)..(4 << 20)).step_by(3))
        .collect()
}

fn add_range(c: &mut Criterion) {
    compare(
        &mut c.benchmark_group("add_range"),
        || Bitmap::of(&[7, 70_000]),
        || roaring_bitmap_of(&[7, 70_000]),
        |mut bitmap: Bitmap| {
            bitmap.add_range(black_box(1_000..900_000));
            bitmap
        },
        |mut bitmap: RoaringBitmap| {
            bitmap.insert_range(black_box(1_000..900_000));
            bitmap
        },
    );
}

fn scattered_adds(c: &mut Criterion) {
    compare(
        &mut c.benchmark_group("scattered_adds"),
        || {
            let mut bitmap = Bitmap::new();
            bitmap.add_range(0..10);
            bitmap
        },
        || RoaringBitmap::from_iter(0..10),
        |mut bitmap: Bitmap| {
            for v in (100..65_000).step_by(2) {
                bitmap.add(v);
            }
            bitmap
        },
        |mut bitmap: RoaringBitmap| {
            for v in (100..65_000).step_by(2) {
                bitmap.insert(v);
            }
            bitmap
        },
    );
}

fn rank(c: &mut Criterion) {
    let items = mixed_items();
    let mut group = c.benchmark_group("rank");
    for &value in &[47 * 10_000, (1 << 20) + 25_000, (3 << 20) + 300_000] {
        group.bench_with_input(BenchmarkId::new("roaring-native", value), &value, |b, &x| {
            let bitmap = Bitmap::of(&items);
            b.iter(|| bitmap.rank(black_box(x)));
        });
        group.bench_with_input(BenchmarkId::new("roaring-rs", value), &value, |b, &x| {
            let bitmap = roaring_bitmap_of(&items);
            b.iter(|| bitmap.rank(black_box(x)));
        });
    }
}

fn binops(c: &mut Criterion) {
    let left = mixed_items();
    let right: Vec<u32> = left.iter().map(|v| v + 1_000).collect();

    let gen_ours = || (Bitmap::of(&left), Bitmap::of(&right));
    let gen_theirs = || (roaring_bitmap_of(&left), roaring_bitmap_of(&right));

    macro_rules! comp_op {
        ($new1:ident, $inplace1:ident, $new2:expr, $inplace2:expr $(,)?) => {{
            compare(
                &mut c.benchmark_group(concat!(stringify!($new1), "_new")),
                gen_ours,
                gen_theirs,
                |(bm1, bm2)| bm1.$new1(&bm2),
                |(bm1, bm2)| $new2(&bm1, &bm2),
            );
            compare(
                &mut c.benchmark_group(concat!(stringify!($new1), "_inplace")),
                gen_ours,
                gen_theirs,
                |(mut bm1, bm2)| bm1.$inplace1(&bm2),
                |(mut bm1, bm2)| $inplace2(&mut bm1, &bm2),
            );
        }};
    }

    comp_op!(
        and,
        and_inplace,
        std::ops::BitAnd::bitand,
        std::ops::BitAndAssign::bitand_assign,
    );
    comp_op!(
        or,
        or_inplace,
        std::ops::BitOr::bitor,
        std::ops::BitOrAssign::bitor_assign,
    );
    comp_op!(
        xor,
        xor_inplace,
        std::ops::BitXor::bitxor,
        std::ops::BitXorAssign::bitxor_assign,
    );
    comp_op!(
        andnot,
        andnot_inplace,
        std::ops::Sub::sub,
        std::ops::SubAssign::sub_assign,
    );
}

fn iter(c: &mut Criterion) {
    let items = mixed_items();
    let expected: u64 = items.iter().map(|&v| u64::from(v)).sum();
    compare(
        &mut c.benchmark_group("iter"),
        || {
            let mut bitmap = Bitmap::of(&items);
            bitmap.run_optimize();
            bitmap
        },
        || roaring_bitmap_of(&items),
        |bitmap: Bitmap| assert_eq!(bitmap.iter().map(u64::from).sum::<u64>(), expected),
        |bitmap: RoaringBitmap| assert_eq!(bitmap.iter().map(u64::from).sum::<u64>(), expected),
    );
}

fn serialize(c: &mut Criterion) {
    let items: Vec<u32> = (0..1_000_000).step_by(3).collect();
    compare(
        &mut c.benchmark_group("serialize"),
        || Bitmap::of(&items),
        || roaring_bitmap_of(&items),
        |bitmap: Bitmap| bitmap.serialize::<Portable>(),
        |bitmap: RoaringBitmap| {
            let mut buffer = Vec::with_capacity(bitmap.serialized_size());
            bitmap.serialize_into(&mut buffer).unwrap();
            buffer
        },
    );
}

fn deserialize(c: &mut Criterion) {
    let items: Vec<u32> = (0..1_000_000).step_by(3).collect();
    let buffer = Bitmap::of(&items).serialize::<Portable>();
    compare(
        &mut c.benchmark_group("deserialize"),
        || (),
        || (),
        |()| Bitmap::try_deserialize::<Portable>(black_box(&buffer)).unwrap(),
        |()| RoaringBitmap::deserialize_from(black_box(&buffer[..])).unwrap(),
    );
}

fn wide_or(c: &mut Criterion) {
    let gen_ours = || {
        (
            Bitmap64::from_iter((0..4u64).flat_map(|high| (high << 32)..(high << 32) + 5000)),
            Bitmap64::from_iter((2..6u64).flat_map(|high| (high << 32) + 2500..(high << 32) + 7500)),
        )
    };
    let gen_theirs = || {
        (
            RoaringTreemap::from_iter((0..4u64).flat_map(|high| (high << 32)..(high << 32) + 5000)),
            RoaringTreemap::from_iter(
                (2..6u64).flat_map(|high| (high << 32) + 2500..(high << 32) + 7500),
            ),
        )
    };
    compare(
        &mut c.benchmark_group("or_64"),
        gen_ours,
        gen_theirs,
        |(bm1, bm2)| bm1.or(&bm2),
        |(bm1, bm2)| bm1 | bm2,
    );
}

criterion_group!(
    benches,
    add_range,
    scattered_adds,
    rank,
    binops,
    iter,
    serialize,
    deserialize,
    wide_or
);
criterion_main!(benches);
