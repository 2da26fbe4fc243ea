use std::slice;

/// Closed interval `[start, end]` of low bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Interval {
    pub start: u16,
    pub end: u16,
}

impl Interval {
    #[inline]
    pub fn new(start: u16, end: u16) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        u64::from(self.end - self.start) + 1
    }
}

/// Sorted, disjoint, non-adjacent intervals.
#[derive(Clone, Default, PartialEq, Eq)]
pub(crate) struct RunStore {
    runs: Vec<Interval>,
    /// Number of values covered by `runs`.
    len: u64,
}

impl RunStore {
    pub fn full() -> Self {
        Self::from_interval(Interval::new(0, u16::MAX))
    }

    pub fn from_interval(interval: Interval) -> Self {
        Self {
            runs: vec![interval],
            len: interval.len(),
        }
    }

    /// The caller guarantees the intervals are sorted, disjoint and non-adjacent.
    pub fn from_vec_unchecked(runs: Vec<Interval>) -> Self {
        debug_assert!(runs
            .windows(2)
            .all(|w| u32::from(w[0].end) + 1 < u32::from(w[1].start)));
        let len = runs.iter().map(Interval::len).sum();
        Self { runs, len }
    }

    pub fn from_sorted_values(values: &[u16]) -> Self {
        let mut runs: Vec<Interval> = Vec::new();
        for &value in values {
            match runs.last_mut() {
                Some(last) if u32::from(last.end) + 1 == u32::from(value) => last.end = value,
                _ => runs.push(Interval::new(value, value)),
            }
        }
        Self {
            runs,
            len: values.len() as u64,
        }
    }

    #[inline]
    pub fn intervals(&self) -> &[Interval] {
        &self.runs
    }

    #[inline]
    pub fn num_runs(&self) -> u64 {
        self.runs.len() as u64
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Index of the first run whose end is `>= value`.
    #[inline]
    fn locate(&self, value: u16) -> usize {
        self.runs.partition_point(|iv| iv.end < value)
    }

    pub fn contains(&self, value: u16) -> bool {
        let idx = self.locate(value);
        idx < self.runs.len() && self.runs[idx].start <= value
    }

    pub fn insert(&mut self, value: u16) -> bool {
        let idx = self.locate(value);
        if idx < self.runs.len() && self.runs[idx].start <= value {
            return false;
        }
        let joins_prev = idx > 0 && u32::from(self.runs[idx - 1].end) + 1 == u32::from(value);
        let joins_next =
            idx < self.runs.len() && u32::from(value) + 1 == u32::from(self.runs[idx].start);
        match (joins_prev, joins_next) {
            (true, true) => {
                self.runs[idx - 1].end = self.runs[idx].end;
                self.runs.remove(idx);
            }
            (true, false) => self.runs[idx - 1].end = value,
            (false, true) => self.runs[idx].start = value,
            (false, false) => self.runs.insert(idx, Interval::new(value, value)),
        }
        self.len += 1;
        true
    }

    pub fn remove(&mut self, value: u16) -> bool {
        let idx = self.locate(value);
        if idx == self.runs.len() || self.runs[idx].start > value {
            return false;
        }
        let run = self.runs[idx];
        if run.start == run.end {
            self.runs.remove(idx);
        } else if value == run.start {
            self.runs[idx].start = value + 1;
        } else if value == run.end {
            self.runs[idx].end = value - 1;
        } else {
            self.runs[idx].end = value - 1;
            self.runs.insert(idx + 1, Interval::new(value + 1, run.end));
        }
        self.len -= 1;
        true
    }

    pub fn contains_range(&self, start: u16, end: u16) -> bool {
        let idx = self.locate(start);
        idx < self.runs.len() && self.runs[idx].start <= start && self.runs[idx].end >= end
    }

    pub fn range_len(&self, start: u16, end: u16) -> u64 {
        self.runs[self.locate(start)..]
            .iter()
            .take_while(|iv| iv.start <= end)
            .map(|iv| u64::from(iv.end.min(end) - iv.start.max(start)) + 1)
            .sum()
    }

    /// Number of values `<= value`.
    pub fn rank(&self, value: u16) -> u64 {
        let idx = self.locate(value);
        let before: u64 = self.runs[..idx].iter().map(Interval::len).sum();
        match self.runs.get(idx) {
            Some(iv) if iv.start <= value => before + u64::from(value - iv.start) + 1,
            _ => before,
        }
    }

    pub fn select(&self, n: u32) -> Option<u16> {
        let mut remaining = u64::from(n);
        for iv in &self.runs {
            if remaining < iv.len() {
                return Some(iv.start + remaining as u16);
            }
            remaining -= iv.len();
        }
        None
    }

    pub fn min(&self) -> Option<u16> {
        self.runs.first().map(|iv| iv.start)
    }

    pub fn max(&self) -> Option<u16> {
        self.runs.last().map(|iv| iv.end)
    }

    pub fn iter(&self) -> RunIter<'_> {
        RunIter {
            runs: self.runs.iter(),
            next: 1,
            end: 0,
        }
    }
}

#[derive(Clone)]
pub(crate) struct RunIter<'a> {
    runs: slice::Iter<'a, Interval>,
    next: u32,
    end: u32,
}

impl Iterator for RunIter<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        if self.next > self.end {
            let iv = self.runs.next()?;
            self.next = u32::from(iv.start);
            self.end = u32::from(iv.end);
        }
        let value = self.next as u16;
        self.next += 1;
        Some(value)
    }
}

/// Combines two interval lists with a boolean membership function, sweeping over
/// the half-open boundaries of both.
pub(crate) fn merge_intervals(
    a: &[Interval],
    b: &[Interval],
    op: impl Fn(bool, bool) -> bool,
) -> Vec<Interval> {
    fn boundary(runs: &[Interval], i: usize) -> Option<u32> {
        runs.get(i / 2).map(|iv| {
            if i % 2 == 0 {
                u32::from(iv.start)
            } else {
                u32::from(iv.end) + 1
            }
        })
    }

    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    let (mut in_a, mut in_b) = (false, false);
    let mut open: Option<u32> = None;
    loop {
        let (next_a, next_b) = (boundary(a, i), boundary(b, j));
        let pos = match (next_a, next_b) {
            (Some(x), Some(y)) => x.min(y),
            (Some(x), None) => x,
            (None, Some(y)) => y,
            (None, None) => break,
        };
        if next_a == Some(pos) {
            in_a = !in_a;
            i += 1;
        }
        if next_b == Some(pos) {
            in_b = !in_b;
            j += 1;
        }
        match (open, op(in_a, in_b)) {
            (None, true) => open = Some(pos),
            (Some(start), false) => {
                out.push(Interval::new(start as u16, (pos - 1) as u16));
                open = None;
            }
            _ => {}
        }
    }
    out
}

/// Keeps the values of `values` whose membership in `runs` equals `inside`.
pub(crate) fn filter_by_runs(values: &[u16], runs: &[Interval], inside: bool) -> Vec<u16> {
    let mut out = Vec::with_capacity(values.len());
    let mut r = 0;
    for &v in values {
        while r < runs.len() && runs[r].end < v {
            r += 1;
        }
        let contained = r < runs.len() && runs[r].start <= v;
        if contained == inside {
            out.push(v);
        }
    }
    out
}

pub(crate) fn count_in_runs(values: &[u16], runs: &[Interval]) -> u64 {
    let mut count = 0;
    let mut r = 0;
    for &v in values {
        while r < runs.len() && runs[r].end < v {
            r += 1;
        }
        if r == runs.len() {
            break;
        }
        if runs[r].start <= v {
            count += 1;
        }
    }
    count
}

pub(crate) fn overlap_len(a: &[Interval], b: &[Interval]) -> u64 {
    let (mut i, mut j) = (0, 0);
    let mut total = 0;
    while i < a.len() && j < b.len() {
        let start = a[i].start.max(b[j].start);
        let end = a[i].end.min(b[j].end);
        if start <= end {
            total += u64::from(end - start) + 1;
        }
        if a[i].end < b[j].end {
            i += 1;
        } else {
            j += 1;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs(pairs: &[(u16, u16)]) -> Vec<Interval> {
        pairs.iter().map(|&(s, e)| Interval::new(s, e)).collect()
    }

    #[test]
    fn insert_coalesces_neighbours() {
        let mut store = RunStore::from_vec_unchecked(runs(&[(1, 3), (5, 7)]));
        assert!(store.insert(4));
        assert_eq!(store.intervals(), runs(&[(1, 7)]).as_slice());
        assert!(!store.insert(4));
        assert!(store.insert(0));
        assert!(store.insert(9));
        assert!(store.insert(65535));
        assert_eq!(
            store.intervals(),
            runs(&[(0, 7), (9, 9), (65535, 65535)]).as_slice()
        );
        assert_eq!(store.len(), 10);
    }

    #[test]
    fn remove_splits_runs() {
        let mut store = RunStore::from_interval(Interval::new(10, 20));
        assert!(store.remove(15));
        assert!(store.remove(10));
        assert!(store.remove(20));
        assert!(!store.remove(15));
        assert_eq!(store.intervals(), runs(&[(11, 14), (16, 19)]).as_slice());
        assert_eq!(store.len(), 8);
    }

    #[test]
    fn rank_select_ranges() {
        let store = RunStore::from_vec_unchecked(runs(&[(1, 4), (10, 19)]));
        assert_eq!(store.rank(0), 0);
        assert_eq!(store.rank(3), 3);
        assert_eq!(store.rank(9), 4);
        assert_eq!(store.rank(12), 7);
        assert_eq!(store.select(4), Some(10));
        assert_eq!(store.select(14), None);
        assert_eq!(store.range_len(3, 11), 4);
        assert!(store.contains_range(11, 19));
        assert!(!store.contains_range(4, 10));
        assert_eq!(store.iter().take(6).collect::<Vec<_>>(), [1, 2, 3, 4, 10, 11]);
    }

    #[test]
    fn interval_algebra() {
        let a = runs(&[(0, 9), (20, 29)]);
        let b = runs(&[(5, 24), (65530, 65535)]);
        assert_eq!(merge_intervals(&a, &b, |x, y| x && y), runs(&[(5, 9), (20, 24)]));
        assert_eq!(
            merge_intervals(&a, &b, |x, y| x || y),
            runs(&[(0, 29), (65530, 65535)])
        );
        assert_eq!(
            merge_intervals(&a, &b, |x, y| x != y),
            runs(&[(0, 4), (10, 19), (25, 29), (65530, 65535)])
        );
        assert_eq!(
            merge_intervals(&a, &b, |x, y| x && !y),
            runs(&[(0, 4), (25, 29)])
        );
        assert_eq!(overlap_len(&a, &b), 10);
    }

    #[test]
    fn values_against_runs() {
        let r = runs(&[(2, 4), (8, 8)]);
        let values = [1, 2, 4, 5, 8, 9];
        assert_eq!(filter_by_runs(&values, &r, true), [2, 4, 8]);
        assert_eq!(filter_by_runs(&values, &r, false), [1, 5, 9]);
        assert_eq!(count_in_runs(&values, &r), 3);
        assert_eq!(
            RunStore::from_sorted_values(&values).intervals(),
            runs(&[(1, 2), (4, 5), (8, 9)]).as_slice()
        );
    }
}
