use std::ops::{Bound, RangeBounds};

use tracing::trace;

use super::Bitmap;
use crate::container::Container;
use crate::util;
use crate::Result;

impl Bitmap {
    /// Creates a new bitmap (initially empty)
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap = Bitmap::new();
    ///
    /// assert!(bitmap.is_empty());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::with_container_capacity(0)
    }

    /// Creates a new bitmap (initially empty) with room for `capacity` containers
    /// in its directory (it is a performance hint).
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap = Bitmap::with_container_capacity(16);
    ///
    /// assert!(bitmap.is_empty());
    /// ```
    #[inline]
    pub fn with_container_capacity(capacity: usize) -> Self {
        Bitmap {
            keys: Vec::with_capacity(capacity),
            containers: Vec::with_capacity(capacity),
        }
    }

    /// Creates a new bitmap from a slice of u32 integers
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let elements = vec![1, 2];
    ///
    /// let bitmap = Bitmap::of(&elements);
    ///
    /// let mut bitmap2 = Bitmap::new();
    ///
    /// for element in &elements {
    ///     bitmap2.add(*element);
    /// }
    ///
    /// assert!(bitmap.contains(1));
    /// assert!(bitmap.contains(2));
    /// assert!(!bitmap.contains(3));
    /// assert_eq!(bitmap, bitmap2);
    /// ```
    #[inline]
    pub fn of(elements: &[u32]) -> Self {
        let mut bitmap = Self::new();
        bitmap.add_many(elements);
        bitmap
    }

    pub(crate) fn push_unchecked(&mut self, key: u16, container: Container) {
        debug_assert!(self.keys.last().map_or(true, |&last| last < key));
        debug_assert!(!container.is_empty());
        self.keys.push(key);
        self.containers.push(container);
    }

    /// Index of the container for `key`, inserting an empty one if absent.
    fn index_or_insert(&mut self, key: u16) -> usize {
        match self.keys.binary_search(&key) {
            Ok(index) => index,
            Err(index) => {
                self.keys.insert(index, key);
                self.containers.insert(index, Container::new());
                index
            }
        }
    }

    /// Drops every empty container, keeping the directory order.
    pub(crate) fn prune_empty(&mut self) {
        let mut write = 0;
        for read in 0..self.containers.len() {
            if !self.containers[read].is_empty() {
                self.keys.swap(write, read);
                self.containers.swap(write, read);
                write += 1;
            }
        }
        self.keys.truncate(write);
        self.containers.truncate(write);
    }

    /// Add the integer element to the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    /// assert!(bitmap.is_empty());
    /// bitmap.add(1);
    /// assert!(!bitmap.is_empty());
    /// ```
    #[inline]
    pub fn add(&mut self, element: u32) {
        self.add_checked(element);
    }

    /// Add the integer element to the bitmap. Returns true if the value was
    /// added, false if the value was already in the bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    /// assert!(bitmap.add_checked(1));
    /// assert!(!bitmap.add_checked(1));
    /// ```
    pub fn add_checked(&mut self, element: u32) -> bool {
        let (key, low) = util::split(element);
        let index = self.index_or_insert(key);
        self.containers[index].insert(low)
    }

    /// Add every element of the slice to the bitmap. The slice may be unsorted and
    /// hold duplicates; runs of elements sharing a container are inserted without
    /// searching the directory again.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    /// bitmap.add_many(&[3, 1, 2, 3]);
    ///
    /// assert_eq!(bitmap.to_vec(), [1, 2, 3]);
    /// ```
    pub fn add_many(&mut self, elements: &[u32]) {
        let mut cached: Option<(u16, usize)> = None;
        for &element in elements {
            let (key, low) = util::split(element);
            let index = match cached {
                Some((cached_key, index)) if cached_key == key => index,
                _ => {
                    let index = self.index_or_insert(key);
                    cached = Some((key, index));
                    index
                }
            };
            self.containers[index].insert(low);
        }
    }

    /// Add all values in range
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::new();
    /// bitmap1.add_range((1..3));
    ///
    /// assert!(!bitmap1.is_empty());
    /// assert!(bitmap1.contains(1));
    /// assert!(bitmap1.contains(2));
    /// assert!(!bitmap1.contains(3));
    ///
    /// let mut bitmap2 = Bitmap::new();
    /// bitmap2.add_range((3..1));
    /// assert!(bitmap2.is_empty());
    ///
    /// let mut bitmap3 = Bitmap::new();
    /// bitmap3.add_range((3..3));
    /// assert!(bitmap3.is_empty());
    ///
    /// let mut bitmap4 = Bitmap::new();
    /// bitmap4.add_range(..=2);
    /// bitmap4.add_range(u32::MAX..=u32::MAX);
    /// assert!(bitmap4.contains(0));
    /// assert!(bitmap4.contains(1));
    /// assert!(bitmap4.contains(2));
    /// assert!(bitmap4.contains(u32::MAX));
    /// assert_eq!(bitmap4.cardinality(), 4);
    /// ```
    pub fn add_range<R: RangeBounds<u32>>(&mut self, range: R) {
        let Some((start, end)) = range_to_inclusive(range) else {
            return;
        };
        let (start_key, start_low) = util::split(start);
        let (end_key, end_low) = util::split(end);
        for key in start_key..=end_key {
            let low = if key == start_key { start_low } else { 0 };
            let high = if key == end_key { end_low } else { u16::MAX };
            let index = self.index_or_insert(key);
            self.containers[index].insert_range(low, high);
        }
    }

    /// Clear the integer element from the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    /// bitmap.add(1);
    /// bitmap.remove(1);
    ///
    /// assert!(bitmap.is_empty());
    /// ```
    #[inline]
    pub fn remove(&mut self, element: u32) {
        self.remove_checked(element);
    }

    /// Remove the integer element from the bitmap. Returns true if the value
    /// was removed, false if the value was not present in the bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    /// bitmap.add(1);
    /// assert!(bitmap.remove_checked(1));
    /// assert!(!bitmap.remove_checked(1));
    /// ```
    pub fn remove_checked(&mut self, element: u32) -> bool {
        let (key, low) = util::split(element);
        let Ok(index) = self.keys.binary_search(&key) else {
            return false;
        };
        let removed = self.containers[index].remove(low);
        if self.containers[index].is_empty() {
            self.keys.remove(index);
            self.containers.remove(index);
        }
        removed
    }

    /// Remove every element of the slice from the bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap = Bitmap::of(&[1, 2, 3, 100_000]);
    /// bitmap.remove_many(&[100_000, 2, 7, 2]);
    ///
    /// assert_eq!(bitmap.to_vec(), [1, 3]);
    /// ```
    pub fn remove_many(&mut self, elements: &[u32]) {
        let mut cached: Option<(u16, Option<usize>)> = None;
        for &element in elements {
            let (key, low) = util::split(element);
            let index = match cached {
                Some((cached_key, index)) if cached_key == key => index,
                _ => {
                    let index = self.keys.binary_search(&key).ok();
                    cached = Some((key, index));
                    index
                }
            };
            if let Some(index) = index {
                self.containers[index].remove(low);
            }
        }
        self.prune_empty();
    }

    /// Remove all values in range
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    /// bitmap.add_range((1..4));
    /// assert!(!bitmap.is_empty());
    ///
    /// bitmap.remove_range((1..3));
    ///
    /// assert!(!bitmap.contains(1));
    /// assert!(!bitmap.contains(2));
    /// assert!(bitmap.contains(3));
    ///
    /// bitmap.add_range(u32::MAX..=u32::MAX);
    /// assert!(bitmap.contains(u32::MAX));
    /// ```
    pub fn remove_range<R: RangeBounds<u32>>(&mut self, range: R) {
        let Some((start, end)) = range_to_inclusive(range) else {
            return;
        };
        let (start_key, start_low) = util::split(start);
        let (end_key, end_low) = util::split(end);
        let first = self.keys.partition_point(|&k| k < start_key);
        let last = self.keys.partition_point(|&k| k <= end_key);
        for index in first..last {
            let key = self.keys[index];
            let low = if key == start_key { start_low } else { 0 };
            let high = if key == end_key { end_low } else { u16::MAX };
            if low == 0 && high == u16::MAX {
                self.containers[index] = Container::new();
            } else {
                self.containers[index].remove_range(low, high);
            }
        }
        self.prune_empty();
    }

    /// Empties the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    /// bitmap.add(1);
    /// bitmap.add(2);
    /// bitmap.clear();
    ///
    /// assert!(bitmap.is_empty());
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.keys.clear();
        self.containers.clear();
    }

    /// Contains returns true if the integer element is contained in the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap = Bitmap::of(&[1]);
    ///
    /// assert!(bitmap.contains(1));
    /// assert!(!bitmap.contains(2));
    /// ```
    #[inline]
    pub fn contains(&self, element: u32) -> bool {
        let (key, low) = util::split(element);
        match self.keys.binary_search(&key) {
            Ok(index) => self.containers[index].contains(low),
            Err(_) => false,
        }
    }

    /// Check whether a range of values of range are present
    ///
    /// An empty range is always contained.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap = Bitmap::of(&[1, 2]);
    /// assert!(bitmap.contains_range((1..3)));
    /// assert!(!bitmap.contains_range((1..4)));
    ///
    /// let mut bitmap = bitmap.clone();
    /// bitmap.add(u32::MAX - 1);
    /// bitmap.add(u32::MAX);
    /// assert!(bitmap.contains_range((u32::MAX - 1)..=u32::MAX))
    /// ```
    pub fn contains_range<R: RangeBounds<u32>>(&self, range: R) -> bool {
        let Some((start, end)) = range_to_inclusive(range) else {
            return true;
        };
        let (start_key, start_low) = util::split(start);
        let (end_key, end_low) = util::split(end);
        (start_key..=end_key).all(|key| {
            let low = if key == start_key { start_low } else { 0 };
            let high = if key == end_key { end_low } else { u16::MAX };
            match self.keys.binary_search(&key) {
                Ok(index) => self.containers[index].contains_range(low, high),
                Err(_) => false,
            }
        })
    }

    /// Returns number of elements in range
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap = Bitmap::of(&[1, 3, 4]);
    ///
    /// assert_eq!(bitmap.range_cardinality((..1)), 0);
    /// assert_eq!(bitmap.range_cardinality((..2)), 1);
    /// assert_eq!(bitmap.range_cardinality((2..5)), 2);
    /// assert_eq!(bitmap.range_cardinality((..5)), 3);
    /// assert_eq!(bitmap.range_cardinality((1..=4)), 3);
    /// ```
    pub fn range_cardinality<R: RangeBounds<u32>>(&self, range: R) -> u64 {
        let Some((start, end)) = range_to_inclusive(range) else {
            return 0;
        };
        let (start_key, start_low) = util::split(start);
        let (end_key, end_low) = util::split(end);
        let first = self.keys.partition_point(|&k| k < start_key);
        let last = self.keys.partition_point(|&k| k <= end_key);
        (first..last)
            .map(|index| {
                let key = self.keys[index];
                let low = if key == start_key { start_low } else { 0 };
                let high = if key == end_key { end_low } else { u16::MAX };
                self.containers[index].range_len(low, high)
            })
            .sum()
    }

    /// Returns the number of integers contained in the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap = Bitmap::of(&[1]);
    ///
    /// assert_eq!(bitmap.cardinality(), 1);
    ///
    /// let mut bitmap = bitmap.clone();
    ///
    /// bitmap.add(2);
    ///
    /// assert_eq!(bitmap.cardinality(), 2);
    /// ```
    #[inline]
    pub fn cardinality(&self) -> u64 {
        self.containers.iter().map(Container::len).sum()
    }

    /// Returns true if the Bitmap is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    ///
    /// assert!(bitmap.is_empty());
    ///
    /// bitmap.add(1);
    ///
    /// assert!(!bitmap.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns a vector containing all of the integers stored in the Bitmap
    /// in sorted order.
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    /// bitmap.add_range(1..3);
    ///
    /// assert_eq!(bitmap.to_vec(), [1, 2]);
    /// ```
    #[inline]
    pub fn to_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }

    /// Like [`Bitmap::to_vec`], but reports allocation failure instead of aborting.
    pub fn try_to_vec(&self) -> Result<Vec<u32>> {
        let mut out = Vec::new();
        out.try_reserve_exact(usize::try_from(self.cardinality()).unwrap_or(usize::MAX))?;
        out.extend(self.iter());
        Ok(out)
    }

    /// Convert array and bitmap containers to run containers when it is more
    /// efficient; also convert from run containers when more space efficient.
    ///
    /// Returns true if any container changed representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    /// bitmap.add_many(&[1, 2, 3, 4]);
    /// assert!(bitmap.run_optimize());
    /// assert!(!bitmap.run_optimize());
    ///
    /// let mut sparse = Bitmap::of(&[1, 3, 5]);
    /// assert!(!sparse.run_optimize());
    /// ```
    pub fn run_optimize(&mut self) -> bool {
        let converted = self
            .containers
            .iter_mut()
            .map(Container::run_optimize)
            .filter(|&changed| changed)
            .count();
        trace!(converted, containers = self.containers.len(), "run_optimize");
        converted > 0
    }

    /// Removes run-length encoding even when it is more space efficient.
    ///
    /// Returns true if a change was applied.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap: Bitmap = (10..5000).collect();
    /// bitmap.run_optimize();
    ///
    /// assert!(bitmap.remove_run_compression());
    /// assert!(!bitmap.remove_run_compression());
    /// assert_eq!(bitmap.cardinality(), 4990);
    /// ```
    pub fn remove_run_compression(&mut self) -> bool {
        let converted = self
            .containers
            .iter_mut()
            .map(Container::remove_run_compression)
            .filter(|&changed| changed)
            .count();
        trace!(converted, "remove_run_compression");
        converted > 0
    }

    /// Returns the smallest value in the set.
    ///
    /// Returns `None` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap: Bitmap = (5..10).collect();
    /// let empty_bitmap: Bitmap = Bitmap::new();
    ///
    /// assert_eq!(bitmap.minimum(), Some(5));
    /// assert_eq!(empty_bitmap.minimum(), None);
    ///
    /// bitmap.add(3);
    ///
    /// assert_eq!(bitmap.minimum(), Some(3));
    /// ```
    #[inline]
    pub fn minimum(&self) -> Option<u32> {
        let (&key, container) = self.keys.first().zip(self.containers.first())?;
        container.min().map(|low| util::join(key, low))
    }

    /// Returns the greatest value in the set.
    ///
    /// Returns `None` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap: Bitmap = (5..10).collect();
    /// let empty_bitmap: Bitmap = Bitmap::new();
    ///
    /// assert_eq!(bitmap.maximum(), Some(9));
    /// assert_eq!(empty_bitmap.maximum(), None);
    ///
    /// bitmap.add(15);
    ///
    /// assert_eq!(bitmap.maximum(), Some(15));
    /// ```
    #[inline]
    pub fn maximum(&self) -> Option<u32> {
        let (&key, container) = self.keys.last().zip(self.containers.last())?;
        container.max().map(|low| util::join(key, low))
    }

    /// Rank returns the number of values smaller or equal to x.
    ///
    /// For repeated queries, [`Bitmap::rank_index`] avoids rescanning the directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap: Bitmap = (5..10).collect();
    ///
    /// assert_eq!(bitmap.rank(8), 4);
    ///
    /// bitmap.add(15);
    ///
    /// assert_eq!(bitmap.rank(11), 5);
    /// assert_eq!(bitmap.rank(15), 6);
    /// ```
    pub fn rank(&self, x: u32) -> u64 {
        let (key, low) = util::split(x);
        let index = self.keys.partition_point(|&k| k < key);
        let before: u64 = self.containers[..index].iter().map(Container::len).sum();
        match self.keys.get(index) {
            Some(&k) if k == key => before + self.containers[index].rank(low),
            _ => before,
        }
    }

    /// Returns the 0-based index of `x` in the sorted set, if present.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap = Bitmap::of(&[10, 20, 30]);
    ///
    /// assert_eq!(bitmap.position(20), Some(1));
    /// assert_eq!(bitmap.position(25), None);
    /// ```
    pub fn position(&self, x: u32) -> Option<u64> {
        if self.contains(x) {
            Some(self.rank(x) - 1)
        } else {
            None
        }
    }

    /// Select returns the element having the designated rank, if it exists
    /// If the size of the roaring bitmap is strictly greater than rank,
    /// then this function returns element of given rank wrapped in Some.
    /// Otherwise, it returns None.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap: Bitmap = (5..10).collect();
    ///
    /// assert_eq!(bitmap.select(0), Some(5));
    /// assert_eq!(bitmap.select(1), Some(6));
    /// assert_eq!(bitmap.select(2), Some(7));
    /// assert_eq!(bitmap.select(3), Some(8));
    /// assert_eq!(bitmap.select(4), Some(9));
    /// assert_eq!(bitmap.select(5), None);
    /// ```
    pub fn select(&self, rank: u32) -> Option<u32> {
        let mut remaining = u64::from(rank);
        for (&key, container) in self.keys.iter().zip(&self.containers) {
            let len = container.len();
            if remaining < len {
                return container
                    .select(remaining as u32)
                    .map(|low| util::join(key, low));
            }
            remaining -= len;
        }
        None
    }

    /// Checks every structural invariant of the directory and its containers.
    ///
    /// Intended for tests; a bitmap built through the public API always passes.
    pub fn internal_validate(&self) -> std::result::Result<(), &'static str> {
        if self.keys.len() != self.containers.len() {
            return Err("directory keys and containers differ in length");
        }
        if !self.keys.windows(2).all(|w| w[0] < w[1]) {
            return Err("directory keys are not strictly increasing");
        }
        self.containers.iter().try_for_each(Container::validate)
    }

    pub(crate) fn keys(&self) -> &[u16] {
        &self.keys
    }

    pub(crate) fn containers(&self) -> &[Container] {
        &self.containers
    }
}

/// Closed bounds of `range`, or `None` when it is empty.
pub(crate) fn range_to_inclusive<R: RangeBounds<u32>>(range: R) -> Option<(u32, u32)> {
    let start = match range.start_bound() {
        Bound::Included(&i) => i,
        Bound::Excluded(&i) => i.checked_add(1)?,
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&i) => i,
        Bound::Excluded(&i) => i.checked_sub(1)?,
        Bound::Unbounded => u32::MAX,
    };
    (start <= end).then_some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_blocks_become_single_runs() {
        let mut bitmap = Bitmap::new();
        bitmap.add_range(65_536..(3 * 65_536));
        assert_eq!(bitmap.containers.len(), 2);
        assert!(bitmap.containers.iter().all(Container::is_run));
        assert_eq!(bitmap.cardinality(), 2 * 65_536);

        bitmap.remove_range(65_536..(2 * 65_536));
        assert_eq!(bitmap.keys, [2]);
        assert_eq!(bitmap.internal_validate(), Ok(()));
    }

    #[test]
    fn removal_prunes_empty_containers() {
        let mut bitmap = Bitmap::of(&[1, 70_000, 140_000]);
        bitmap.remove(70_000);
        assert_eq!(bitmap.keys, [0, 2]);
        bitmap.remove_many(&[1, 140_000]);
        assert!(bitmap.keys.is_empty());
        assert!(bitmap.containers.is_empty());
    }

    #[test]
    fn inclusive_ranges() {
        assert_eq!(range_to_inclusive(1..5), Some((1, 4)));
        assert_eq!(range_to_inclusive(..), Some((0, u32::MAX)));
        assert_eq!(range_to_inclusive(5..5), None);
        assert_eq!(range_to_inclusive(0..0), None);
        assert_eq!(
            range_to_inclusive((Bound::Excluded(u32::MAX), Bound::Unbounded)),
            None
        );
    }
}
