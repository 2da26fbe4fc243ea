use super::{ArrayStore, Interval, BITMAP_WORDS};

/// Fixed 65536-bit set with a cached cardinality.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct BitmapStore {
    len: u64,
    bits: Box<[u64; BITMAP_WORDS]>,
}

#[inline]
fn word(index: u16) -> usize {
    usize::from(index) / 64
}

#[inline]
fn bit(index: u16) -> u32 {
    u32::from(index) % 64
}

/// Mask with bits `start..=end` set, both in `0..64`.
#[inline]
fn mask(start: u32, end: u32) -> u64 {
    (u64::MAX << start) & (u64::MAX >> (63 - end))
}

impl BitmapStore {
    pub fn new() -> Self {
        Self {
            len: 0,
            bits: Box::new([0; BITMAP_WORDS]),
        }
    }

    pub fn from_words(bits: Box<[u64; BITMAP_WORDS]>) -> Self {
        let len = bits.iter().map(|w| u64::from(w.count_ones())).sum();
        Self { len, bits }
    }

    pub fn from_array(array: &ArrayStore) -> Self {
        let mut store = Self::new();
        for &value in array.iter() {
            store.bits[word(value)] |= 1 << bit(value);
        }
        store.len = array.len();
        store
    }

    pub fn from_intervals(intervals: &[Interval]) -> Self {
        let mut store = Self::new();
        for iv in intervals {
            store.insert_range(iv.start, iv.end);
        }
        store
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[inline]
    pub fn words(&self) -> &[u64; BITMAP_WORDS] {
        &self.bits
    }

    #[inline]
    pub fn contains(&self, index: u16) -> bool {
        self.bits[word(index)] & (1 << bit(index)) != 0
    }

    pub fn insert(&mut self, index: u16) -> bool {
        let (w, b) = (word(index), bit(index));
        let old = self.bits[w];
        let new = old | (1 << b);
        self.bits[w] = new;
        let inserted = old != new;
        self.len += u64::from(inserted);
        inserted
    }

    pub fn remove(&mut self, index: u16) -> bool {
        let (w, b) = (word(index), bit(index));
        let old = self.bits[w];
        let new = old & !(1 << b);
        self.bits[w] = new;
        let removed = old != new;
        self.len -= u64::from(removed);
        removed
    }

    pub fn flip(&mut self, index: u16) {
        let (w, b) = (word(index), bit(index));
        if self.bits[w] & (1 << b) == 0 {
            self.len += 1;
        } else {
            self.len -= 1;
        }
        self.bits[w] ^= 1 << b;
    }

    /// Applies `f` to every word overlapping `[start, end]` with the mask of bits in range.
    fn for_each_word_in(&mut self, start: u16, end: u16, mut f: impl FnMut(&mut u64, u64)) {
        let (sw, ew) = (word(start), word(end));
        if sw == ew {
            f(&mut self.bits[sw], mask(bit(start), bit(end)));
            return;
        }
        f(&mut self.bits[sw], mask(bit(start), 63));
        for w in &mut self.bits[sw + 1..ew] {
            f(w, u64::MAX);
        }
        f(&mut self.bits[ew], mask(0, bit(end)));
    }

    /// Sets `[start, end]`, returning how many bits were newly set.
    pub fn insert_range(&mut self, start: u16, end: u16) -> u64 {
        let mut added = 0;
        self.for_each_word_in(start, end, |w, m| {
            added += u64::from((!*w & m).count_ones());
            *w |= m;
        });
        self.len += added;
        added
    }

    /// Clears `[start, end]`, returning how many bits were cleared.
    pub fn remove_range(&mut self, start: u16, end: u16) -> u64 {
        let mut removed = 0;
        self.for_each_word_in(start, end, |w, m| {
            removed += u64::from((*w & m).count_ones());
            *w &= !m;
        });
        self.len -= removed;
        removed
    }

    pub fn flip_range(&mut self, start: u16, end: u16) {
        let mut len = self.len;
        self.for_each_word_in(start, end, |w, m| {
            len -= u64::from((*w & m).count_ones());
            *w ^= m;
            len += u64::from((*w & m).count_ones());
        });
        self.len = len;
    }

    pub fn range_len(&self, start: u16, end: u16) -> u64 {
        let (sw, ew) = (word(start), word(end));
        if sw == ew {
            return u64::from((self.bits[sw] & mask(bit(start), bit(end))).count_ones());
        }
        let mut count = u64::from((self.bits[sw] & mask(bit(start), 63)).count_ones());
        count += self.bits[sw + 1..ew]
            .iter()
            .map(|w| u64::from(w.count_ones()))
            .sum::<u64>();
        count + u64::from((self.bits[ew] & mask(0, bit(end))).count_ones())
    }

    pub fn is_range_full(&self, start: u16, end: u16) -> bool {
        self.range_len(start, end) == u64::from(end - start) + 1
    }

    /// Number of set bits `<= index`.
    pub fn rank(&self, index: u16) -> u64 {
        let (w, b) = (word(index), bit(index));
        let before: u64 = self.bits[..w].iter().map(|w| u64::from(w.count_ones())).sum();
        before + u64::from((self.bits[w] << (63 - b)).count_ones())
    }

    pub fn select(&self, n: u32) -> Option<u16> {
        let mut remaining = u64::from(n);
        for (index, &w) in self.bits.iter().enumerate() {
            let ones = u64::from(w.count_ones());
            if remaining < ones {
                let mut w = w;
                for _ in 0..remaining {
                    w &= w - 1;
                }
                return Some((index * 64) as u16 + w.trailing_zeros() as u16);
            }
            remaining -= ones;
        }
        None
    }

    pub fn min(&self) -> Option<u16> {
        self.bits
            .iter()
            .enumerate()
            .find(|&(_, &w)| w != 0)
            .map(|(index, w)| (index * 64) as u16 + w.trailing_zeros() as u16)
    }

    pub fn max(&self) -> Option<u16> {
        self.bits
            .iter()
            .enumerate()
            .rev()
            .find(|&(_, &w)| w != 0)
            .map(|(index, w)| (index * 64) as u16 + (63 - w.leading_zeros()) as u16)
    }

    /// Number of maximal runs of set bits.
    pub fn num_runs(&self) -> u64 {
        let mut runs = 0;
        let mut carry = 0;
        for &w in self.bits.iter() {
            let starts = w & !((w << 1) | carry);
            runs += u64::from(starts.count_ones());
            carry = w >> 63;
        }
        runs
    }

    pub fn to_array(&self) -> ArrayStore {
        let mut array = ArrayStore::with_capacity(self.len as usize);
        for value in self.iter() {
            array.push_unchecked(value);
        }
        array
    }

    pub fn to_intervals(&self) -> Vec<Interval> {
        let mut intervals: Vec<Interval> = Vec::new();
        for value in self.iter() {
            match intervals.last_mut() {
                Some(last) if u32::from(last.end) + 1 == u32::from(value) => last.end = value,
                _ => intervals.push(Interval::new(value, value)),
            }
        }
        intervals
    }

    /// Replaces every word with `f(self_word, other_word)` and recounts.
    pub fn combine(&mut self, other: &BitmapStore, f: impl Fn(u64, u64) -> u64) {
        let mut len = 0;
        for (a, &b) in self.bits.iter_mut().zip(other.bits.iter()) {
            *a = f(*a, b);
            len += u64::from(a.count_ones());
        }
        self.len = len;
    }

    pub fn intersection_len(&self, other: &BitmapStore) -> u64 {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .map(|(a, b)| u64::from((a & b).count_ones()))
            .sum()
    }

    pub fn intersects(&self, other: &BitmapStore) -> bool {
        self.bits.iter().zip(other.bits.iter()).any(|(a, b)| a & b != 0)
    }

    pub fn iter(&self) -> BitmapIter<'_> {
        BitmapIter {
            words: &self.bits,
            key: 0,
            value: self.bits[0],
        }
    }
}

#[derive(Clone)]
pub(crate) struct BitmapIter<'a> {
    words: &'a [u64; BITMAP_WORDS],
    key: usize,
    value: u64,
}

impl Iterator for BitmapIter<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        while self.value == 0 {
            self.key += 1;
            if self.key >= BITMAP_WORDS {
                return None;
            }
            self.value = self.words[self.key];
        }
        let bit = self.value.trailing_zeros();
        self.value &= self.value - 1;
        Some((self.key * 64) as u16 + bit as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_span_words() {
        let mut store = BitmapStore::new();
        assert_eq!(store.insert_range(60, 200), 141);
        assert_eq!(store.len(), 141);
        assert_eq!(store.insert_range(100, 210), 10);
        assert_eq!(store.range_len(0, 65535), 151);
        assert_eq!(store.range_len(64, 127), 64);
        assert!(store.is_range_full(60, 210));
        assert!(!store.is_range_full(59, 210));
        assert_eq!(store.remove_range(61, 209), 149);
        assert_eq!(store.iter().collect::<Vec<_>>(), [60, 210]);
    }

    #[test]
    fn rank_select_min_max() {
        let mut store = BitmapStore::new();
        for v in [3, 64, 65, 1000, 65535] {
            store.insert(v);
        }
        assert_eq!(store.rank(2), 0);
        assert_eq!(store.rank(3), 1);
        assert_eq!(store.rank(65), 3);
        assert_eq!(store.rank(65535), 5);
        assert_eq!(store.select(0), Some(3));
        assert_eq!(store.select(3), Some(1000));
        assert_eq!(store.select(4), Some(65535));
        assert_eq!(store.select(5), None);
        assert_eq!(store.min(), Some(3));
        assert_eq!(store.max(), Some(65535));
    }

    #[test]
    fn counts_runs_across_word_boundaries() {
        let mut store = BitmapStore::new();
        store.insert_range(60, 70);
        store.insert_range(128, 128);
        store.insert_range(130, 65535);
        assert_eq!(store.num_runs(), 3);
        assert_eq!(
            store.to_intervals(),
            [
                Interval::new(60, 70),
                Interval::new(128, 128),
                Interval::new(130, 65535)
            ]
        );
    }

    #[test]
    fn flip_tracks_cardinality() {
        let mut store = BitmapStore::new();
        store.insert_range(0, 9);
        store.flip_range(5, 14);
        assert_eq!(store.len(), 10);
        assert_eq!(store.iter().collect::<Vec<_>>(), [0, 1, 2, 3, 4, 10, 11, 12, 13, 14]);
        store.flip(0);
        store.flip(20);
        assert_eq!(store.len(), 10);
        assert!(!store.contains(0));
        assert!(store.contains(20));
    }
}
