use std::slice;

/// Sorted, duplicate-free list of low bits.
#[derive(Clone, Default, PartialEq, Eq)]
pub(crate) struct ArrayStore {
    vec: Vec<u16>,
}

impl ArrayStore {
    pub fn new() -> Self {
        Self { vec: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vec: Vec::with_capacity(capacity),
        }
    }

    /// The caller guarantees `vec` is strictly increasing.
    pub fn from_vec_unchecked(vec: Vec<u16>) -> Self {
        debug_assert!(vec.windows(2).all(|w| w[0] < w[1]));
        Self { vec }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.vec.len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u16] {
        &self.vec
    }

    pub fn iter(&self) -> slice::Iter<'_, u16> {
        self.vec.iter()
    }

    pub fn insert(&mut self, value: u16) -> bool {
        match self.vec.binary_search(&value) {
            Ok(_) => false,
            Err(loc) => {
                self.vec.insert(loc, value);
                true
            }
        }
    }

    /// Appends a value known to be greater than every stored value.
    pub fn push_unchecked(&mut self, value: u16) {
        debug_assert!(self.vec.last().map_or(true, |&last| last < value));
        self.vec.push(value);
    }

    pub fn remove(&mut self, value: u16) -> bool {
        match self.vec.binary_search(&value) {
            Ok(loc) => {
                self.vec.remove(loc);
                true
            }
            Err(_) => false,
        }
    }

    #[inline]
    pub fn contains(&self, value: u16) -> bool {
        self.vec.binary_search(&value).is_ok()
    }

    /// Removes every value in `[start, end]`, returning how many were removed.
    pub fn remove_range(&mut self, start: u16, end: u16) -> u64 {
        let lo = self.vec.partition_point(|&v| v < start);
        let hi = self.vec.partition_point(|&v| v <= end);
        self.vec.drain(lo..hi);
        (hi - lo) as u64
    }

    pub fn range_len(&self, start: u16, end: u16) -> u64 {
        let lo = self.vec.partition_point(|&v| v < start);
        let hi = self.vec.partition_point(|&v| v <= end);
        (hi - lo) as u64
    }

    /// Number of stored values `<= value`.
    pub fn rank(&self, value: u16) -> u64 {
        self.vec.partition_point(|&v| v <= value) as u64
    }

    pub fn select(&self, n: u32) -> Option<u16> {
        self.vec.get(n as usize).copied()
    }

    pub fn min(&self) -> Option<u16> {
        self.vec.first().copied()
    }

    pub fn max(&self) -> Option<u16> {
        self.vec.last().copied()
    }

    pub fn retain(&mut self, f: impl FnMut(&u16) -> bool) {
        self.vec.retain(f);
    }

    /// Keeps only the values that also appear in the sorted slice `other`.
    pub fn retain_sorted(&mut self, other: &[u16]) {
        let mut j = 0;
        self.vec.retain(|&v| {
            j += other[j..].partition_point(|&o| o < v);
            j < other.len() && other[j] == v
        });
    }

    /// Number of maximal runs of consecutive values.
    pub fn num_runs(&self) -> u64 {
        let mut runs = 0;
        let mut prev: Option<u16> = None;
        for &v in &self.vec {
            if prev.map_or(true, |p| u32::from(p) + 1 != u32::from(v)) {
                runs += 1;
            }
            prev = Some(v);
        }
        runs
    }
}

/// Index of the first element of `slice` that is `>= target`, probing exponentially
/// from the front.
fn gallop(slice: &[u16], target: u16) -> usize {
    let mut hi = 1;
    while hi < slice.len() && slice[hi] < target {
        hi *= 2;
    }
    let lo = hi / 2;
    let hi = (hi + 1).min(slice.len());
    lo + slice[lo..hi].partition_point(|&v| v < target)
}

/// Below this size ratio a linear merge beats galloping.
const GALLOP_RATIO: usize = 64;

pub(crate) fn intersect(a: &[u16], b: &[u16]) -> Vec<u16> {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut out = Vec::with_capacity(small.len());
    if small.len() * GALLOP_RATIO < large.len() {
        let mut rest = large;
        for &v in small {
            let at = gallop(rest, v);
            rest = &rest[at..];
            match rest.first() {
                None => break,
                Some(&w) if w == v => out.push(v),
                Some(_) => {}
            }
        }
    } else {
        let (mut i, mut j) = (0, 0);
        while i < small.len() && j < large.len() {
            match small[i].cmp(&large[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    out.push(small[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
    }
    out
}

pub(crate) fn intersection_len(a: &[u16], b: &[u16]) -> u64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut count = 0;
    let mut rest = large;
    for &v in small {
        let at = gallop(rest, v);
        rest = &rest[at..];
        match rest.first() {
            None => break,
            Some(&w) if w == v => count += 1,
            Some(_) => {}
        }
    }
    count
}

pub(crate) fn intersects(a: &[u16], b: &[u16]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => return true,
        }
    }
    false
}

/// Sorted merge of `a` and `b` keeping values selected by `keep(in_a, in_b)`.
fn merge(a: &[u16], b: &[u16], keep: impl Fn(bool, bool) -> bool) -> Vec<u16> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        let (value, in_a, in_b) = match (a.get(i), b.get(j)) {
            (Some(&x), Some(&y)) if x == y => (x, true, true),
            (Some(&x), Some(&y)) if x < y => (x, true, false),
            (Some(_), Some(&y)) => (y, false, true),
            (Some(&x), None) => (x, true, false),
            (None, Some(&y)) => (y, false, true),
            (None, None) => break,
        };
        if in_a {
            i += 1;
        }
        if in_b {
            j += 1;
        }
        if keep(in_a, in_b) {
            out.push(value);
        }
    }
    out
}

pub(crate) fn union(a: &[u16], b: &[u16]) -> Vec<u16> {
    merge(a, b, |_, _| true)
}

pub(crate) fn symmetric_difference(a: &[u16], b: &[u16]) -> Vec<u16> {
    merge(a, b, |in_a, in_b| in_a != in_b)
}

pub(crate) fn difference(a: &[u16], b: &[u16]) -> Vec<u16> {
    merge(a, b, |in_a, in_b| in_a && !in_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gallop_finds_lower_bound() {
        let values = [1, 3, 5, 7, 9, 11, 13];
        assert_eq!(gallop(&values, 0), 0);
        assert_eq!(gallop(&values, 1), 0);
        assert_eq!(gallop(&values, 6), 3);
        assert_eq!(gallop(&values, 13), 6);
        assert_eq!(gallop(&values, 14), 7);
        assert_eq!(gallop(&[], 4), 0);
    }

    #[test]
    fn skewed_intersection_gallops() {
        let large: Vec<u16> = (0..10_000).map(|v| v * 2).collect();
        let small = [3, 4, 500, 19_998, 19_999];
        assert_eq!(intersect(&small, &large), [4, 500, 19_998]);
        assert_eq!(intersect(&large, &small), [4, 500, 19_998]);
        assert_eq!(intersection_len(&small, &large), 3);
    }

    #[test]
    fn merges() {
        let a = [1, 2, 3];
        let b = [2, 3, 4];
        assert_eq!(intersect(&a, &b), [2, 3]);
        assert_eq!(union(&a, &b), [1, 2, 3, 4]);
        assert_eq!(symmetric_difference(&a, &b), [1, 4]);
        assert_eq!(difference(&a, &b), [1]);
        assert!(intersects(&a, &b));
        assert!(!intersects(&a, &[4, 5]));
    }

    #[test]
    fn rank_and_runs() {
        let store = ArrayStore::from_vec_unchecked(vec![1, 2, 3, 7, 8, 65535]);
        assert_eq!(store.rank(0), 0);
        assert_eq!(store.rank(3), 3);
        assert_eq!(store.rank(6), 3);
        assert_eq!(store.rank(65535), 6);
        assert_eq!(store.select(3), Some(7));
        assert_eq!(store.select(6), None);
        assert_eq!(store.num_runs(), 3);
        assert_eq!(store.range_len(2, 7), 3);
    }

    #[test]
    fn retain_sorted_keeps_common_values() {
        let mut store = ArrayStore::from_vec_unchecked(vec![1, 4, 6, 9, 12]);
        store.retain_sorted(&[0, 4, 5, 9, 13]);
        assert_eq!(store.as_slice(), [4, 9]);
    }
}
