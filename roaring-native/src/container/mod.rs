//! Per-block containers: each holds the low 16 bits of the values sharing one high key.
//!
//! A container is an [`ArrayStore`] while it holds at most [`ARRAY_LIMIT`] values and a
//! [`BitmapStore`] above that. A [`RunStore`] only appears when it is the smallest
//! encoding: after [`Container::run_optimize`], for ranges, or as the output of an operation
//! on run containers.

mod array;
mod bitmap;
pub(crate) mod ops;
mod run;

pub(crate) use self::array::ArrayStore;
pub(crate) use self::bitmap::{BitmapIter, BitmapStore};
pub(crate) use self::run::{Interval, RunIter, RunStore};

use std::slice;

/// Largest cardinality stored as an array.
pub const ARRAY_LIMIT: u64 = 4096;

/// Number of 64-bit words in a bitmap container.
pub const BITMAP_WORDS: usize = 1024;

/// Serialized size of a bitmap container body.
pub(crate) const BITMAP_BYTES: usize = BITMAP_WORDS * 8;

#[derive(Clone)]
pub(crate) enum Container {
    Array(ArrayStore),
    Bitmap(BitmapStore),
    Run(RunStore),
}

#[derive(Clone)]
pub(crate) enum Iter<'a> {
    Array(slice::Iter<'a, u16>),
    Bitmap(BitmapIter<'a>),
    Run(RunIter<'a>),
}

impl Iterator for Iter<'_> {
    type Item = u16;

    #[inline]
    fn next(&mut self) -> Option<u16> {
        match self {
            Iter::Array(inner) => inner.next().copied(),
            Iter::Bitmap(inner) => inner.next(),
            Iter::Run(inner) => inner.next(),
        }
    }
}

fn run_bytes(num_runs: u64) -> u64 {
    2 + 4 * num_runs
}

fn non_run_bytes(cardinality: u64) -> u64 {
    if cardinality <= ARRAY_LIMIT {
        2 * cardinality
    } else {
        BITMAP_BYTES as u64
    }
}

impl Container {
    pub fn new() -> Self {
        Container::Array(ArrayStore::new())
    }

    pub fn full() -> Self {
        Container::Run(RunStore::full())
    }

    /// Container holding exactly `[start, end]`.
    pub fn from_range(start: u16, end: u16) -> Self {
        let mut container = Container::Run(RunStore::from_interval(Interval::new(start, end)));
        container.ensure_efficient();
        container
    }

    /// Picks the array or bitmap store for a sorted list of values.
    pub fn from_sorted_vec(values: Vec<u16>) -> Self {
        let array = ArrayStore::from_vec_unchecked(values);
        if array.len() > ARRAY_LIMIT {
            Container::Bitmap(BitmapStore::from_array(&array))
        } else {
            Container::Array(array)
        }
    }

    pub fn len(&self) -> u64 {
        match self {
            Container::Array(a) => a.len(),
            Container::Bitmap(b) => b.len(),
            Container::Run(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Container::Array(a) => a.is_empty(),
            Container::Bitmap(b) => b.len() == 0,
            Container::Run(r) => r.is_empty(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.len() == 1 << 16
    }

    pub fn is_run(&self) -> bool {
        matches!(self, Container::Run(_))
    }

    pub fn contains(&self, value: u16) -> bool {
        match self {
            Container::Array(a) => a.contains(value),
            Container::Bitmap(b) => b.contains(value),
            Container::Run(r) => r.contains(value),
        }
    }

    pub fn insert(&mut self, value: u16) -> bool {
        match self {
            Container::Array(a) => {
                if a.len() < ARRAY_LIMIT {
                    return a.insert(value);
                }
                if a.contains(value) {
                    return false;
                }
                let mut bitmap = BitmapStore::from_array(a);
                bitmap.insert(value);
                *self = Container::Bitmap(bitmap);
                true
            }
            Container::Bitmap(b) => b.insert(value),
            Container::Run(r) => {
                if !r.insert(value) {
                    return false;
                }
                self.ensure_efficient();
                true
            }
        }
    }

    pub fn remove(&mut self, value: u16) -> bool {
        match self {
            Container::Array(a) => a.remove(value),
            Container::Bitmap(b) => {
                if !b.remove(value) {
                    return false;
                }
                if b.len() <= ARRAY_LIMIT {
                    *self = Container::Array(b.to_array());
                }
                true
            }
            Container::Run(r) => {
                if !r.remove(value) {
                    return false;
                }
                self.ensure_efficient();
                true
            }
        }
    }

    /// Adds `[start, end]`, returning how many values were new.
    pub fn insert_range(&mut self, start: u16, end: u16) -> u64 {
        let before = self.len();
        if start == 0 && end == u16::MAX {
            *self = Container::full();
        } else if let Container::Bitmap(b) = self {
            b.insert_range(start, end);
        } else {
            *self = ops::or(self, &Container::Run(RunStore::from_interval(Interval::new(start, end))));
        }
        self.len() - before
    }

    /// Removes `[start, end]`, returning how many values were removed.
    pub fn remove_range(&mut self, start: u16, end: u16) -> u64 {
        let before = self.len();
        match self {
            Container::Array(a) => {
                a.remove_range(start, end);
            }
            Container::Bitmap(b) => {
                b.remove_range(start, end);
                self.ensure_efficient();
            }
            Container::Run(_) => {
                let range = Container::Run(RunStore::from_interval(Interval::new(start, end)));
                *self = ops::andnot(self, &range);
            }
        }
        before - self.len()
    }

    pub fn contains_range(&self, start: u16, end: u16) -> bool {
        match self {
            Container::Array(a) => a.range_len(start, end) == u64::from(end - start) + 1,
            Container::Bitmap(b) => b.is_range_full(start, end),
            Container::Run(r) => r.contains_range(start, end),
        }
    }

    pub fn range_len(&self, start: u16, end: u16) -> u64 {
        match self {
            Container::Array(a) => a.range_len(start, end),
            Container::Bitmap(b) => b.range_len(start, end),
            Container::Run(r) => r.range_len(start, end),
        }
    }

    /// Number of values `<= value`.
    pub fn rank(&self, value: u16) -> u64 {
        match self {
            Container::Array(a) => a.rank(value),
            Container::Bitmap(b) => b.rank(value),
            Container::Run(r) => r.rank(value),
        }
    }

    pub fn select(&self, n: u32) -> Option<u16> {
        match self {
            Container::Array(a) => a.select(n),
            Container::Bitmap(b) => b.select(n),
            Container::Run(r) => r.select(n),
        }
    }

    pub fn min(&self) -> Option<u16> {
        match self {
            Container::Array(a) => a.min(),
            Container::Bitmap(b) => b.min(),
            Container::Run(r) => r.min(),
        }
    }

    pub fn max(&self) -> Option<u16> {
        match self {
            Container::Array(a) => a.max(),
            Container::Bitmap(b) => b.max(),
            Container::Run(r) => r.max(),
        }
    }

    pub fn iter(&self) -> Iter<'_> {
        match self {
            Container::Array(a) => Iter::Array(a.iter()),
            Container::Bitmap(b) => Iter::Bitmap(b.iter()),
            Container::Run(r) => Iter::Run(r.iter()),
        }
    }

    pub fn num_runs(&self) -> u64 {
        match self {
            Container::Array(a) => a.num_runs(),
            Container::Bitmap(b) => b.num_runs(),
            Container::Run(r) => r.num_runs(),
        }
    }

    /// Size of this container's body in the portable format.
    pub fn serialized_size(&self) -> usize {
        match self {
            Container::Array(a) => 2 * a.len() as usize,
            Container::Bitmap(_) => BITMAP_BYTES,
            Container::Run(r) => run_bytes(r.num_runs()) as usize,
        }
    }

    pub fn to_intervals(&self) -> Vec<Interval> {
        match self {
            Container::Array(a) => RunStore::from_sorted_values(a.as_slice()).intervals().to_vec(),
            Container::Bitmap(b) => b.to_intervals(),
            Container::Run(r) => r.intervals().to_vec(),
        }
    }

    /// Array or bitmap container holding the same values as `runs`.
    fn from_runs_non_run(runs: &RunStore) -> Self {
        if runs.len() <= ARRAY_LIMIT {
            let mut array = ArrayStore::with_capacity(runs.len() as usize);
            for value in runs.iter() {
                array.push_unchecked(value);
            }
            Container::Array(array)
        } else {
            Container::Bitmap(BitmapStore::from_intervals(runs.intervals()))
        }
    }

    /// Restores the representation invariants after a bulk change: arrays never exceed
    /// [`ARRAY_LIMIT`], bitmaps never fall to it, and runs survive only while they are the
    /// smallest encoding.
    pub fn ensure_efficient(&mut self) {
        let replacement = match &*self {
            Container::Array(a) if a.len() > ARRAY_LIMIT => {
                Some(Container::Bitmap(BitmapStore::from_array(a)))
            }
            Container::Bitmap(b) if b.len() <= ARRAY_LIMIT => Some(Container::Array(b.to_array())),
            Container::Run(r) if run_bytes(r.num_runs()) > non_run_bytes(r.len()) => {
                Some(Container::from_runs_non_run(r))
            }
            _ => None,
        };
        if let Some(container) = replacement {
            *self = container;
        }
    }

    /// Converts to a run container when that encoding is strictly smaller, or away from
    /// one when it is not the smallest. Returns whether the representation changed.
    pub fn run_optimize(&mut self) -> bool {
        let run_size = run_bytes(self.num_runs());
        let current = self.serialized_size() as u64;
        let replacement = match &*self {
            Container::Run(r) if run_size > non_run_bytes(r.len()) => {
                Some(Container::from_runs_non_run(r))
            }
            Container::Run(_) => None,
            _ if run_size < current => {
                Some(Container::Run(RunStore::from_vec_unchecked(self.to_intervals())))
            }
            _ => None,
        };
        match replacement {
            Some(container) => {
                *self = container;
                true
            }
            None => false,
        }
    }

    /// Converts a run container to an array or bitmap. Returns whether it was a run.
    pub fn remove_run_compression(&mut self) -> bool {
        let replacement = match &*self {
            Container::Run(r) => Container::from_runs_non_run(r),
            _ => return false,
        };
        *self = replacement;
        true
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        match self {
            Container::Array(a) => {
                if a.len() > ARRAY_LIMIT {
                    return Err("array container exceeds the array limit");
                }
                if !a.as_slice().windows(2).all(|w| w[0] < w[1]) {
                    return Err("array container is not strictly increasing");
                }
            }
            Container::Bitmap(b) => {
                let counted: u64 = b.words().iter().map(|w| u64::from(w.count_ones())).sum();
                if counted != b.len() {
                    return Err("bitmap container cardinality is stale");
                }
                if b.len() <= ARRAY_LIMIT {
                    return Err("bitmap container at or below the array limit");
                }
            }
            Container::Run(r) => {
                let ordered = r
                    .intervals()
                    .windows(2)
                    .all(|w| u32::from(w[0].end) + 1 < u32::from(w[1].start));
                if !ordered || r.intervals().iter().any(|iv| iv.start > iv.end) {
                    return Err("run container intervals overlap or touch");
                }
                if r.intervals().iter().map(Interval::len).sum::<u64>() != r.len() {
                    return Err("run container cardinality is stale");
                }
                if run_bytes(r.num_runs()) > non_run_bytes(r.len()) {
                    return Err("run container is larger than its array or bitmap encoding");
                }
            }
        }
        if self.is_empty() {
            return Err("empty container in directory");
        }
        Ok(())
    }
}

impl PartialEq for Container {
    fn eq(&self, other: &Container) -> bool {
        match (self, other) {
            (Container::Array(a), Container::Array(b)) => a == b,
            (Container::Bitmap(a), Container::Bitmap(b)) => a == b,
            (Container::Run(a), Container::Run(b)) => a == b,
            _ => self.len() == other.len() && self.iter().eq(other.iter()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_promotes_and_demotes() {
        let mut container = Container::new();
        for v in 0..ARRAY_LIMIT as u16 {
            assert!(container.insert(v * 2));
        }
        assert!(matches!(container, Container::Array(_)));
        assert!(!container.insert(0));
        assert!(matches!(container, Container::Array(_)));
        assert!(container.insert(1));
        assert!(matches!(container, Container::Bitmap(_)));
        assert_eq!(container.len(), ARRAY_LIMIT + 1);
        assert!(container.remove(1));
        assert!(matches!(container, Container::Array(_)));
        assert_eq!(container.validate(), Ok(()));
    }

    #[test]
    fn full_range_is_a_single_run() {
        let mut container = Container::from_sorted_vec(vec![1, 5, 9]);
        assert_eq!(container.insert_range(0, u16::MAX), 65533);
        assert!(container.is_full());
        assert!(container.is_run());
        assert_eq!(container.serialized_size(), 6);
    }

    #[test]
    fn small_ranges_stay_arrays() {
        let container = Container::from_range(7, 7);
        assert!(matches!(container, Container::Array(_)));
        let container = Container::from_range(1, 4);
        assert!(container.is_run());
        assert_eq!(container.iter().collect::<Vec<_>>(), [1, 2, 3, 4]);
    }

    #[test]
    fn run_optimize_picks_smallest_encoding() {
        let mut container = Container::from_sorted_vec((100..1100).collect());
        assert!(container.run_optimize());
        assert!(container.is_run());
        assert!(!container.run_optimize());
        assert!(container.remove_run_compression());
        assert!(matches!(container, Container::Array(_)));

        let mut sparse = Container::from_sorted_vec(vec![1, 3, 5]);
        assert!(!sparse.run_optimize());
    }

    #[test]
    fn remove_range_across_representations() {
        let mut run = Container::from_range(0, 9999);
        assert_eq!(run.remove_range(10, 9989), 9980);
        assert_eq!(run.len(), 20);
        assert_eq!(run.num_runs(), 2);
        assert!(run.is_run());

        let mut bitmap = Container::Bitmap(BitmapStore::from_intervals(&[Interval::new(0, 4999)]));
        assert_eq!(bitmap.remove_range(0, 999), 1000);
        assert!(matches!(bitmap, Container::Array(_)));
        assert_eq!(bitmap.min(), Some(1000));
    }

    #[test]
    fn scattered_inserts_leave_run_form() {
        let mut container = Container::from_range(0, 9);
        assert!(container.is_run());
        for v in (100..65_000u16).step_by(2) {
            assert!(container.insert(v));
            assert!(container.validate().is_ok(), "invalid after inserting {v}");
        }
        assert!(matches!(container, Container::Bitmap(_)));
        assert_eq!(container.len(), 32_460);

        let mut run = Container::from_range(0, 99);
        for v in (1..99u16).step_by(2) {
            assert!(run.remove(v));
        }
        assert!(!run.is_run());
        assert_eq!(run.len(), 51);
        assert!(run.validate().is_ok());
    }

    #[test]
    fn equality_ignores_representation() {
        let array = Container::from_sorted_vec(vec![4, 5, 6]);
        let run = Container::Run(RunStore::from_interval(Interval::new(4, 6)));
        assert!(array == run);
        assert!(array != Container::from_sorted_vec(vec![4, 5]));
    }
}
