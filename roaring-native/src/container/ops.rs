//! Pairwise set algebra between containers of any representation.
//!
//! Allocating operations return a container in its efficient representation. The
//! in-place variants mutate the left operand where the representation allows it and
//! fall back to the allocating form otherwise. Results may be empty; the caller prunes.

use super::array;
use super::run::{count_in_runs, filter_by_runs, merge_intervals, overlap_len};
use super::{ArrayStore, BitmapStore, Container, Interval, RunStore};

fn array_result(values: Vec<u16>) -> Container {
    Container::from_sorted_vec(values)
}

fn bitmap_result(store: BitmapStore) -> Container {
    let mut container = Container::Bitmap(store);
    container.ensure_efficient();
    container
}

fn run_result(intervals: Vec<Interval>) -> Container {
    let mut container = Container::Run(RunStore::from_vec_unchecked(intervals));
    container.ensure_efficient();
    container
}

fn array_intervals(store: &ArrayStore) -> RunStore {
    RunStore::from_sorted_values(store.as_slice())
}

fn bitmap_with(store: &BitmapStore, f: impl FnOnce(&mut BitmapStore)) -> Container {
    let mut out = store.clone();
    f(&mut out);
    bitmap_result(out)
}

pub(crate) fn and(a: &Container, b: &Container) -> Container {
    use Container::*;
    match (a, b) {
        (Array(x), Array(y)) => array_result(array::intersect(x.as_slice(), y.as_slice())),
        (Array(x), Bitmap(y)) | (Bitmap(y), Array(x)) => {
            array_result(x.iter().copied().filter(|&v| y.contains(v)).collect())
        }
        (Array(x), Run(y)) | (Run(y), Array(x)) => {
            array_result(filter_by_runs(x.as_slice(), y.intervals(), true))
        }
        (Bitmap(x), Bitmap(y)) => bitmap_with(x, |out| out.combine(y, |l, r| l & r)),
        (Bitmap(x), Run(y)) | (Run(y), Bitmap(x)) => {
            let mask = BitmapStore::from_intervals(y.intervals());
            bitmap_with(x, |out| out.combine(&mask, |l, r| l & r))
        }
        (Run(x), Run(y)) => run_result(merge_intervals(x.intervals(), y.intervals(), |l, r| l && r)),
    }
}

pub(crate) fn or(a: &Container, b: &Container) -> Container {
    use Container::*;
    if a.is_full() || b.is_full() {
        return Container::full();
    }
    match (a, b) {
        (Array(x), Array(y)) => array_result(array::union(x.as_slice(), y.as_slice())),
        (Array(x), Bitmap(y)) | (Bitmap(y), Array(x)) => bitmap_with(y, |out| {
            for &v in x.iter() {
                out.insert(v);
            }
        }),
        (Array(x), Run(y)) | (Run(y), Array(x)) => run_result(merge_intervals(
            array_intervals(x).intervals(),
            y.intervals(),
            |l, r| l || r,
        )),
        (Bitmap(x), Bitmap(y)) => bitmap_with(x, |out| out.combine(y, |l, r| l | r)),
        (Bitmap(x), Run(y)) | (Run(y), Bitmap(x)) => bitmap_with(x, |out| {
            for iv in y.intervals() {
                out.insert_range(iv.start, iv.end);
            }
        }),
        (Run(x), Run(y)) => run_result(merge_intervals(x.intervals(), y.intervals(), |l, r| l || r)),
    }
}

pub(crate) fn xor(a: &Container, b: &Container) -> Container {
    use Container::*;
    match (a, b) {
        (Array(x), Array(y)) => array_result(array::symmetric_difference(x.as_slice(), y.as_slice())),
        (Array(x), Bitmap(y)) | (Bitmap(y), Array(x)) => bitmap_with(y, |out| {
            for &v in x.iter() {
                out.flip(v);
            }
        }),
        (Array(x), Run(y)) | (Run(y), Array(x)) => run_result(merge_intervals(
            array_intervals(x).intervals(),
            y.intervals(),
            |l, r| l != r,
        )),
        (Bitmap(x), Bitmap(y)) => bitmap_with(x, |out| out.combine(y, |l, r| l ^ r)),
        (Bitmap(x), Run(y)) | (Run(y), Bitmap(x)) => bitmap_with(x, |out| {
            for iv in y.intervals() {
                out.flip_range(iv.start, iv.end);
            }
        }),
        (Run(x), Run(y)) => run_result(merge_intervals(x.intervals(), y.intervals(), |l, r| l != r)),
    }
}

/// Values of `a` not in `b`.
pub(crate) fn andnot(a: &Container, b: &Container) -> Container {
    use Container::*;
    match (a, b) {
        (Array(x), Array(y)) => array_result(array::difference(x.as_slice(), y.as_slice())),
        (Array(x), Bitmap(y)) => array_result(x.iter().copied().filter(|&v| !y.contains(v)).collect()),
        (Array(x), Run(y)) => array_result(filter_by_runs(x.as_slice(), y.intervals(), false)),
        (Bitmap(x), Array(y)) => bitmap_with(x, |out| {
            for &v in y.iter() {
                out.remove(v);
            }
        }),
        (Bitmap(x), Bitmap(y)) => bitmap_with(x, |out| out.combine(y, |l, r| l & !r)),
        (Bitmap(x), Run(y)) => bitmap_with(x, |out| {
            for iv in y.intervals() {
                out.remove_range(iv.start, iv.end);
            }
        }),
        (Run(x), Array(y)) => run_result(merge_intervals(
            x.intervals(),
            array_intervals(y).intervals(),
            |l, r| l && !r,
        )),
        (Run(x), Bitmap(y)) => {
            let mut out = BitmapStore::from_intervals(x.intervals());
            out.combine(y, |l, r| l & !r);
            bitmap_result(out)
        }
        (Run(x), Run(y)) => run_result(merge_intervals(x.intervals(), y.intervals(), |l, r| l && !r)),
    }
}

/// Cardinality of the intersection, without materializing it.
pub(crate) fn and_len(a: &Container, b: &Container) -> u64 {
    use Container::*;
    match (a, b) {
        (Array(x), Array(y)) => array::intersection_len(x.as_slice(), y.as_slice()),
        (Array(x), Bitmap(y)) | (Bitmap(y), Array(x)) => {
            x.iter().filter(|&&v| y.contains(v)).count() as u64
        }
        (Array(x), Run(y)) | (Run(y), Array(x)) => count_in_runs(x.as_slice(), y.intervals()),
        (Bitmap(x), Bitmap(y)) => x.intersection_len(y),
        (Bitmap(x), Run(y)) | (Run(y), Bitmap(x)) => y
            .intervals()
            .iter()
            .map(|iv| x.range_len(iv.start, iv.end))
            .sum(),
        (Run(x), Run(y)) => overlap_len(x.intervals(), y.intervals()),
    }
}

pub(crate) fn intersects(a: &Container, b: &Container) -> bool {
    use Container::*;
    match (a, b) {
        (Array(x), Array(y)) => array::intersects(x.as_slice(), y.as_slice()),
        (Array(x), Bitmap(y)) | (Bitmap(y), Array(x)) => x.iter().any(|&v| y.contains(v)),
        (Array(x), Run(y)) | (Run(y), Array(x)) => x.iter().any(|&v| y.contains(v)),
        (Bitmap(x), Bitmap(y)) => x.intersects(y),
        (Bitmap(x), Run(y)) | (Run(y), Bitmap(x)) => y
            .intervals()
            .iter()
            .any(|iv| x.range_len(iv.start, iv.end) > 0),
        (Run(x), Run(y)) => overlap_len(x.intervals(), y.intervals()) > 0,
    }
}

pub(crate) fn and_inplace(a: &mut Container, b: &Container) {
    use Container::*;
    let handled = match (&mut *a, b) {
        (Array(x), Array(y)) => {
            x.retain_sorted(y.as_slice());
            true
        }
        (Array(x), Bitmap(y)) => {
            x.retain(|&v| y.contains(v));
            true
        }
        (Array(x), Run(y)) => {
            x.retain(|&v| y.contains(v));
            true
        }
        (Bitmap(x), Bitmap(y)) => {
            x.combine(y, |l, r| l & r);
            true
        }
        _ => false,
    };
    if handled {
        a.ensure_efficient();
    } else {
        *a = and(a, b);
    }
}

pub(crate) fn or_inplace(a: &mut Container, b: &Container) {
    use Container::*;
    let handled = match (&mut *a, b) {
        (Bitmap(x), Array(y)) => {
            for &v in y.iter() {
                x.insert(v);
            }
            true
        }
        (Bitmap(x), Bitmap(y)) => {
            x.combine(y, |l, r| l | r);
            true
        }
        (Bitmap(x), Run(y)) => {
            for iv in y.intervals() {
                x.insert_range(iv.start, iv.end);
            }
            true
        }
        _ => false,
    };
    if handled {
        a.ensure_efficient();
    } else {
        *a = or(a, b);
    }
}

pub(crate) fn xor_inplace(a: &mut Container, b: &Container) {
    use Container::*;
    let handled = match (&mut *a, b) {
        (Bitmap(x), Array(y)) => {
            for &v in y.iter() {
                x.flip(v);
            }
            true
        }
        (Bitmap(x), Bitmap(y)) => {
            x.combine(y, |l, r| l ^ r);
            true
        }
        (Bitmap(x), Run(y)) => {
            for iv in y.intervals() {
                x.flip_range(iv.start, iv.end);
            }
            true
        }
        _ => false,
    };
    if handled {
        a.ensure_efficient();
    } else {
        *a = xor(a, b);
    }
}

pub(crate) fn andnot_inplace(a: &mut Container, b: &Container) {
    use Container::*;
    let handled = match (&mut *a, b) {
        (Array(x), y) => {
            x.retain(|&v| !y.contains(v));
            true
        }
        (Bitmap(x), Array(y)) => {
            for &v in y.iter() {
                x.remove(v);
            }
            true
        }
        (Bitmap(x), Bitmap(y)) => {
            x.combine(y, |l, r| l & !r);
            true
        }
        (Bitmap(x), Run(y)) => {
            for iv in y.intervals() {
                x.remove_range(iv.start, iv.end);
            }
            true
        }
        _ => false,
    };
    if handled {
        a.ensure_efficient();
    } else {
        *a = andnot(a, b);
    }
}
