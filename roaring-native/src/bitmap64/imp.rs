use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::ops::{Bound, RangeBounds};

use super::Bitmap64;
use crate::util;
use crate::{Bitmap, Result};

impl Bitmap64 {
    /// Creates an empty `Bitmap64`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roaring_native::Bitmap64;
    /// let bitmap = Bitmap64::new();
    /// assert!(bitmap.is_empty());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Bitmap64 {
            map: BTreeMap::new(),
        }
    }

    /// Creates a `Bitmap64` holding the values of a 32-bit `Bitmap`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roaring_native::{Bitmap, Bitmap64};
    ///
    /// let bitmap = Bitmap::of(&[1, 2, 3]);
    /// let bitmap64 = Bitmap64::from_bitmap(bitmap);
    /// assert_eq!(bitmap64.cardinality(), 3);
    /// ```
    pub fn from_bitmap(bitmap: Bitmap) -> Self {
        let mut map = BTreeMap::new();
        if !bitmap.is_empty() {
            map.insert(0, bitmap);
        }
        Bitmap64 { map }
    }

    /// Creates a new bitmap from a slice of u64 integers
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let elements = vec![1, 2, u64::MAX];
    ///
    /// let bitmap = Bitmap64::of(&elements);
    ///
    /// let mut bitmap2 = Bitmap64::new();
    ///
    /// for element in &elements {
    ///     bitmap2.add(*element);
    /// }
    ///
    /// assert!(bitmap.contains(1));
    /// assert!(bitmap.contains(2));
    /// assert!(bitmap.contains(u64::MAX));
    /// assert!(!bitmap.contains(3));
    /// assert_eq!(bitmap, bitmap2);
    /// ```
    pub fn of(elements: &[u64]) -> Self {
        let mut bitmap = Bitmap64::new();
        bitmap.add_many(elements);
        bitmap
    }

    fn get_or_create(&mut self, high: u32) -> &mut Bitmap {
        self.map.entry(high).or_default()
    }

    /// Add the integer element to the bitmap
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::new();
    /// bitmap.add(3);
    /// assert!(bitmap.contains(3));
    /// bitmap.add(u64::from(u32::MAX) + 1);
    /// assert!(bitmap.contains(u64::from(u32::MAX) + 1));
    /// ```
    #[inline]
    pub fn add(&mut self, value: u64) {
        let (high, low) = util::split64(value);
        self.get_or_create(high).add(low);
    }

    /// Add the integer element to the bitmap. Returns true if the value was
    /// added, false if the value was already in the bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::new();
    /// assert!(bitmap.add_checked(1));
    /// assert!(!bitmap.add_checked(1));
    /// ```
    pub fn add_checked(&mut self, value: u64) -> bool {
        let (high, low) = util::split64(value);
        self.get_or_create(high).add_checked(low)
    }

    /// Add every element of the slice. Consecutive values sharing their high 32 bits
    /// are handed to the inner bitmap in one batch.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::new();
    /// bitmap.add_many(&[u64::MAX, 1, 1, 2]);
    ///
    /// assert_eq!(bitmap.to_vec(), [1, 2, u64::MAX]);
    /// ```
    pub fn add_many(&mut self, values: &[u64]) {
        let mut lows: Vec<u32> = Vec::new();
        let mut current: Option<u32> = None;
        for &value in values {
            let (high, low) = util::split64(value);
            if current != Some(high) {
                if let Some(key) = current {
                    self.get_or_create(key).add_many(&lows);
                }
                lows.clear();
                current = Some(high);
            }
            lows.push(low);
        }
        if let Some(key) = current {
            self.get_or_create(key).add_many(&lows);
        }
    }

    /// Add all values in range
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap1 = Bitmap64::new();
    /// bitmap1.add_range((1..3));
    ///
    /// assert!(!bitmap1.is_empty());
    /// assert!(bitmap1.contains(1));
    /// assert!(bitmap1.contains(2));
    /// assert!(!bitmap1.contains(3));
    ///
    /// let mut bitmap2 = Bitmap64::new();
    /// bitmap2.add_range((3..1));
    /// assert!(bitmap2.is_empty());
    ///
    /// let mut bitmap3 = Bitmap64::new();
    /// bitmap3.add_range(..=2);
    /// bitmap3.add_range(u64::MAX..=u64::MAX);
    /// assert!(bitmap3.contains(0));
    /// assert!(bitmap3.contains(u64::MAX));
    /// assert_eq!(bitmap3.cardinality(), 4);
    ///
    /// let mut bitmap4 = Bitmap64::new();
    /// bitmap4.add_range((u64::from(u32::MAX) - 1)..(u64::from(u32::MAX) + 3));
    /// assert_eq!(bitmap4.cardinality(), 4);
    /// ```
    pub fn add_range<R: RangeBounds<u64>>(&mut self, range: R) {
        let Some((start, end)) = range_to_inclusive(range) else {
            return;
        };
        let (start_high, start_low) = util::split64(start);
        let (end_high, end_low) = util::split64(end);
        for high in start_high..=end_high {
            let low = if high == start_high { start_low } else { 0 };
            let last = if high == end_high { end_low } else { u32::MAX };
            self.get_or_create(high).add_range(low..=last);
        }
    }

    /// Remove the integer element from the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::of(&[u64::MAX]);
    /// bitmap.remove(u64::MAX);
    ///
    /// assert!(bitmap.is_empty());
    /// ```
    #[inline]
    pub fn remove(&mut self, value: u64) {
        self.remove_checked(value);
    }

    /// Remove the integer element from the bitmap. Returns true if the value
    /// was removed, false if the value was not present in the bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::of(&[1]);
    /// assert!(bitmap.remove_checked(1));
    /// assert!(!bitmap.remove_checked(1));
    /// ```
    pub fn remove_checked(&mut self, value: u64) -> bool {
        let (high, low) = util::split64(value);
        match self.map.entry(high) {
            Entry::Vacant(_) => false,
            Entry::Occupied(mut bitmap) => {
                let removed = bitmap.get_mut().remove_checked(low);
                if bitmap.get().is_empty() {
                    bitmap.remove();
                }
                removed
            }
        }
    }

    /// Remove every element of the slice from the bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::of(&[1, 2, u64::MAX]);
    /// bitmap.remove_many(&[u64::MAX, 2, 7]);
    ///
    /// assert_eq!(bitmap.to_vec(), [1]);
    /// ```
    pub fn remove_many(&mut self, values: &[u64]) {
        let mut lows: Vec<u32> = Vec::new();
        let mut current: Option<u32> = None;
        for &value in values {
            let (high, low) = util::split64(value);
            if current != Some(high) {
                if let Some(key) = current {
                    self.remove_many_from(key, &lows);
                }
                lows.clear();
                current = Some(high);
            }
            lows.push(low);
        }
        if let Some(key) = current {
            self.remove_many_from(key, &lows);
        }
    }

    fn remove_many_from(&mut self, high: u32, lows: &[u32]) {
        if let Entry::Occupied(mut bitmap) = self.map.entry(high) {
            bitmap.get_mut().remove_many(lows);
            if bitmap.get().is_empty() {
                bitmap.remove();
            }
        }
    }

    /// Remove all values in range
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::new();
    /// bitmap.add_range((1..4));
    /// bitmap.add(u64::MAX);
    ///
    /// bitmap.remove_range((1..3));
    /// assert_eq!(bitmap.to_vec(), [3, u64::MAX]);
    ///
    /// bitmap.remove_range(..);
    /// assert!(bitmap.is_empty());
    /// ```
    pub fn remove_range<R: RangeBounds<u64>>(&mut self, range: R) {
        let Some((start, end)) = range_to_inclusive(range) else {
            return;
        };
        let (start_high, start_low) = util::split64(start);
        let (end_high, end_low) = util::split64(end);
        for (&high, bitmap) in self.map.range_mut(start_high..=end_high) {
            let low = if high == start_high { start_low } else { 0 };
            let last = if high == end_high { end_low } else { u32::MAX };
            bitmap.remove_range(low..=last);
        }
        self.map.retain(|_, bitmap| !bitmap.is_empty());
    }

    /// Empties the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::of(&[1, u64::MAX]);
    /// bitmap.clear();
    ///
    /// assert!(bitmap.is_empty());
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns true if the integer element is contained in the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let bitmap = Bitmap64::of(&[u64::MAX]);
    ///
    /// assert!(bitmap.contains(u64::MAX));
    /// assert!(!bitmap.contains(u64::from(u32::MAX)));
    /// ```
    #[inline]
    pub fn contains(&self, value: u64) -> bool {
        let (high, low) = util::split64(value);
        self.map
            .get(&high)
            .map_or(false, |bitmap| bitmap.contains(low))
    }

    /// Check whether every value of the range is present. An empty range is
    /// always contained.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::new();
    /// let edge = u64::from(u32::MAX);
    /// bitmap.add_range((edge - 1)..=(edge + 1));
    ///
    /// assert!(bitmap.contains_range((edge - 1)..=(edge + 1)));
    /// assert!(!bitmap.contains_range(edge..(edge + 3)));
    /// assert!(bitmap.contains_range(5..5));
    /// ```
    pub fn contains_range<R: RangeBounds<u64>>(&self, range: R) -> bool {
        let Some((start, end)) = range_to_inclusive(range) else {
            return true;
        };
        let (start_high, start_low) = util::split64(start);
        let (end_high, end_low) = util::split64(end);
        (start_high..=end_high).all(|high| {
            let low = if high == start_high { start_low } else { 0 };
            let last = if high == end_high { end_low } else { u32::MAX };
            self.map
                .get(&high)
                .map_or(false, |bitmap| bitmap.contains_range(low..=last))
        })
    }

    /// Returns number of elements in range
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let bitmap = Bitmap64::of(&[1, 3, 4, u64::MAX]);
    ///
    /// assert_eq!(bitmap.range_cardinality((..1)), 0);
    /// assert_eq!(bitmap.range_cardinality((2..5)), 2);
    /// assert_eq!(bitmap.range_cardinality(..), 4);
    /// ```
    pub fn range_cardinality<R: RangeBounds<u64>>(&self, range: R) -> u64 {
        let Some((start, end)) = range_to_inclusive(range) else {
            return 0;
        };
        let (start_high, start_low) = util::split64(start);
        let (end_high, end_low) = util::split64(end);
        self.map
            .range(start_high..=end_high)
            .map(|(&high, bitmap)| {
                let low = if high == start_high { start_low } else { 0 };
                let last = if high == end_high { end_low } else { u32::MAX };
                bitmap.range_cardinality(low..=last)
            })
            .sum()
    }

    /// Returns the number of integers contained in the bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::of(&[1]);
    /// assert_eq!(bitmap.cardinality(), 1);
    ///
    /// bitmap.add(u64::MAX);
    /// assert_eq!(bitmap.cardinality(), 2);
    /// ```
    pub fn cardinality(&self) -> u64 {
        self.map.values().map(Bitmap::cardinality).sum()
    }

    /// Returns true if the bitmap is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::new();
    /// assert!(bitmap.is_empty());
    ///
    /// bitmap.add(u64::MAX);
    /// assert!(!bitmap.is_empty());
    /// ```
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the smallest value in the set, or `None` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let bitmap = Bitmap64::of(&[u64::MAX, 120, 1 << 40]);
    ///
    /// assert_eq!(bitmap.minimum(), Some(120));
    /// assert_eq!(Bitmap64::new().minimum(), None);
    /// ```
    pub fn minimum(&self) -> Option<u64> {
        let (&high, bitmap) = self.map.first_key_value()?;
        bitmap.minimum().map(|low| util::join64(high, low))
    }

    /// Returns the greatest value in the set, or `None` if the set is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let bitmap = Bitmap64::of(&[120, 1 << 40]);
    ///
    /// assert_eq!(bitmap.maximum(), Some(1 << 40));
    /// assert_eq!(Bitmap64::new().maximum(), None);
    /// ```
    pub fn maximum(&self) -> Option<u64> {
        let (&high, bitmap) = self.map.last_key_value()?;
        bitmap.maximum().map(|low| util::join64(high, low))
    }

    /// Returns the number of integers that are smaller or equal to `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let bitmap = Bitmap64::of(&[5, 6, 7, u64::MAX]);
    ///
    /// assert_eq!(bitmap.rank(6), 2);
    /// assert_eq!(bitmap.rank(1 << 40), 3);
    /// assert_eq!(bitmap.rank(u64::MAX), 4);
    /// ```
    pub fn rank(&self, value: u64) -> u64 {
        let (high, low) = util::split64(value);
        let before: u64 = self
            .map
            .range(..high)
            .map(|(_, bitmap)| bitmap.cardinality())
            .sum();
        before + self.map.get(&high).map_or(0, |bitmap| bitmap.rank(low))
    }

    /// Returns the 0-based index of `value` in the sorted set, if present.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let bitmap = Bitmap64::of(&[10, u64::MAX]);
    ///
    /// assert_eq!(bitmap.position(u64::MAX), Some(1));
    /// assert_eq!(bitmap.position(11), None);
    /// ```
    pub fn position(&self, value: u64) -> Option<u64> {
        if self.contains(value) {
            Some(self.rank(value) - 1)
        } else {
            None
        }
    }

    /// Returns the element of the given 0-based rank, or `None` when the bitmap
    /// holds `rank` values or fewer.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let bitmap = Bitmap64::of(&[5, 6, u64::MAX]);
    ///
    /// assert_eq!(bitmap.select(0), Some(5));
    /// assert_eq!(bitmap.select(2), Some(u64::MAX));
    /// assert_eq!(bitmap.select(3), None);
    /// ```
    pub fn select(&self, rank: u64) -> Option<u64> {
        let mut remaining = rank;
        for (&high, bitmap) in &self.map {
            let len = bitmap.cardinality();
            if remaining < len {
                // below the inner cardinality, which never exceeds 2^32
                return bitmap
                    .select(remaining as u32)
                    .map(|low| util::join64(high, low));
            }
            remaining -= len;
        }
        None
    }

    /// Returns a vector containing all of the integers stored in the bitmap
    /// in sorted order.
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let bitmap = Bitmap64::of(&[25, 15, u64::MAX]);
    ///
    /// assert_eq!(bitmap.to_vec(), [15, 25, u64::MAX]);
    /// ```
    pub fn to_vec(&self) -> Vec<u64> {
        self.iter().collect()
    }

    /// Like [`Bitmap64::to_vec`], but reports allocation failure instead of aborting.
    pub fn try_to_vec(&self) -> Result<Vec<u64>> {
        let mut out = Vec::new();
        out.try_reserve_exact(usize::try_from(self.cardinality()).unwrap_or(usize::MAX))?;
        out.extend(self.iter());
        Ok(out)
    }

    /// Run-compresses every inner bitmap. Returns true if any container changed
    /// representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap: Bitmap64 = (100..1000).collect();
    ///
    /// assert_eq!(bitmap.cardinality(), 900);
    /// assert!(bitmap.run_optimize());
    /// ```
    pub fn run_optimize(&mut self) -> bool {
        self.map
            .values_mut()
            .fold(false, |result, bitmap| bitmap.run_optimize() || result)
    }

    /// Removes run-length encoding from every inner bitmap. Returns true if any
    /// container changed representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap: Bitmap64 = (100..1000).collect();
    ///
    /// assert!(bitmap.run_optimize());
    /// assert!(bitmap.remove_run_compression());
    /// ```
    pub fn remove_run_compression(&mut self) -> bool {
        self.map.values_mut().fold(false, |result, bitmap| {
            bitmap.remove_run_compression() || result
        })
    }

    /// Checks the invariants of the directory and of every inner bitmap.
    pub fn internal_validate(&self) -> std::result::Result<(), &'static str> {
        for bitmap in self.map.values() {
            if bitmap.is_empty() {
                return Err("empty inner bitmap");
            }
            bitmap.internal_validate()?;
        }
        Ok(())
    }

    /// And computes the intersection between two bitmaps and returns the result
    /// as a new bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let bitmap1 = Bitmap64::of(&[u64::MAX]);
    /// let bitmap2 = Bitmap64::of(&[25, u64::MAX]);
    ///
    /// let bitmap3 = bitmap1.and(&bitmap2);
    ///
    /// assert_eq!(bitmap3.to_vec(), [u64::MAX]);
    /// ```
    pub fn and(&self, other: &Self) -> Self {
        let mut result = Bitmap64::new();
        for (&high, bitmap) in &self.map {
            if let Some(other_bitmap) = other.map.get(&high) {
                let inner = bitmap.and(other_bitmap);
                if !inner.is_empty() {
                    result.map.insert(high, inner);
                }
            }
        }
        result
    }

    /// Computes the intersection between two bitmaps and stores the result
    /// in the current bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap1 = Bitmap64::of(&[u64::MAX]);
    /// bitmap1.and_inplace(&Bitmap64::of(&[25]));
    /// assert!(bitmap1.is_empty());
    ///
    /// let mut bitmap2 = Bitmap64::of(&[25, u64::MAX]);
    /// bitmap2.and_inplace(&Bitmap64::of(&[u64::MAX]));
    /// assert_eq!(bitmap2.to_vec(), [u64::MAX]);
    /// ```
    pub fn and_inplace(&mut self, other: &Self) {
        self.map.retain(|high, bitmap| match other.map.get(high) {
            Some(other_bitmap) => {
                bitmap.and_inplace(other_bitmap);
                !bitmap.is_empty()
            }
            None => false,
        });
    }

    /// Or computes the union between two bitmaps and returns the result
    /// as a new bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let bitmap1 = Bitmap64::of(&[u64::MAX]);
    /// let bitmap2 = Bitmap64::of(&[25]);
    ///
    /// let bitmap3 = bitmap1.or(&bitmap2);
    ///
    /// assert_eq!(bitmap3.to_vec(), [25, u64::MAX]);
    /// ```
    pub fn or(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.or_inplace(other);
        result
    }

    /// Computes the union between two bitmaps and stores the result in the
    /// current bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap1 = Bitmap64::of(&[15]);
    /// bitmap1.or_inplace(&Bitmap64::of(&[25, u64::MAX]));
    ///
    /// assert_eq!(bitmap1.cardinality(), 3);
    /// ```
    pub fn or_inplace(&mut self, other: &Self) {
        for (&high, other_bitmap) in &other.map {
            match self.map.entry(high) {
                Entry::Vacant(bitmap) => {
                    bitmap.insert(other_bitmap.clone());
                }
                Entry::Occupied(mut bitmap) => {
                    bitmap.get_mut().or_inplace(other_bitmap);
                }
            }
        }
    }

    /// Computes the symmetric difference (xor) between two bitmaps
    /// and returns a new bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let bitmap1 = Bitmap64::of(&[15, u64::MAX]);
    /// let bitmap2 = Bitmap64::of(&[u64::MAX, 35]);
    ///
    /// let bitmap3 = bitmap1.xor(&bitmap2);
    ///
    /// assert_eq!(bitmap3.to_vec(), [15, 35]);
    /// ```
    pub fn xor(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.xor_inplace(other);
        result
    }

    /// Inplace version of xor, stores result in the current bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap1 = Bitmap64::of(&[u64::MAX]);
    /// bitmap1.xor_inplace(&Bitmap64::of(&[u64::MAX]));
    ///
    /// assert!(bitmap1.is_empty());
    /// ```
    pub fn xor_inplace(&mut self, other: &Self) {
        for (&high, other_bitmap) in &other.map {
            match self.map.entry(high) {
                Entry::Vacant(bitmap) => {
                    bitmap.insert(other_bitmap.clone());
                }
                Entry::Occupied(mut bitmap) => {
                    bitmap.get_mut().xor_inplace(other_bitmap);
                    if bitmap.get().is_empty() {
                        bitmap.remove();
                    }
                }
            }
        }
    }

    /// Computes the difference between two bitmaps and returns the result.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let bitmap1 = Bitmap64::of(&[15, 1 << 40, u64::MAX]);
    /// let bitmap2 = Bitmap64::of(&[u64::MAX, 35]);
    ///
    /// let bitmap3 = bitmap1.andnot(&bitmap2);
    ///
    /// assert_eq!(bitmap3.to_vec(), [15, 1 << 40]);
    /// ```
    pub fn andnot(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.andnot_inplace(other);
        result
    }

    /// Computes the difference between two bitmaps and stores the result
    /// in the current bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap1 = Bitmap64::of(&[15, 25, u64::MAX - 10]);
    /// bitmap1.andnot_inplace(&Bitmap64::of(&[25, 35]));
    ///
    /// assert_eq!(bitmap1.to_vec(), [15, u64::MAX - 10]);
    /// ```
    pub fn andnot_inplace(&mut self, other: &Self) {
        self.map.retain(|high, bitmap| {
            if let Some(other_bitmap) = other.map.get(high) {
                bitmap.andnot_inplace(other_bitmap);
            }
            !bitmap.is_empty()
        });
    }

    /// Returns true if both bitmaps share at least one value.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let bitmap1 = Bitmap64::of(&[1, u64::MAX]);
    ///
    /// assert!(bitmap1.intersect(&Bitmap64::of(&[u64::MAX])));
    /// assert!(!bitmap1.intersect(&Bitmap64::of(&[2])));
    /// ```
    pub fn intersect(&self, other: &Self) -> bool {
        self.map.iter().any(|(high, bitmap)| {
            other
                .map
                .get(high)
                .map_or(false, |other_bitmap| bitmap.intersect(other_bitmap))
        })
    }

    /// Computes the intersection between two bitmaps and returns its cardinality.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let bitmap1 = Bitmap64::of(&[1, 2, u64::MAX]);
    /// let bitmap2 = Bitmap64::of(&[2, u64::MAX, 7]);
    ///
    /// assert_eq!(bitmap1.and_cardinality(&bitmap2), 2);
    /// assert_eq!(bitmap1.or_cardinality(&bitmap2), 4);
    /// assert_eq!(bitmap1.xor_cardinality(&bitmap2), 2);
    /// assert_eq!(bitmap1.andnot_cardinality(&bitmap2), 1);
    /// ```
    pub fn and_cardinality(&self, other: &Self) -> u64 {
        self.map
            .iter()
            .filter_map(|(high, bitmap)| {
                other
                    .map
                    .get(high)
                    .map(|other_bitmap| bitmap.and_cardinality(other_bitmap))
            })
            .sum()
    }

    /// Computes the union between two bitmaps and returns its cardinality.
    pub fn or_cardinality(&self, other: &Self) -> u64 {
        self.cardinality() + other.cardinality() - self.and_cardinality(other)
    }

    /// Computes the symmetric difference between two bitmaps and returns its
    /// cardinality.
    pub fn xor_cardinality(&self, other: &Self) -> u64 {
        self.cardinality() + other.cardinality() - 2 * self.and_cardinality(other)
    }

    /// Computes the difference between two bitmaps and returns its cardinality.
    pub fn andnot_cardinality(&self, other: &Self) -> u64 {
        self.cardinality() - self.and_cardinality(other)
    }

    /// Returns true if every value of this bitmap is also in `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let bitmap1 = Bitmap64::of(&[1, u64::MAX]);
    /// let bitmap2 = Bitmap64::of(&[1, 2, u64::MAX]);
    ///
    /// assert!(bitmap1.is_subset(&bitmap2));
    /// assert!(!bitmap2.is_subset(&bitmap1));
    /// assert!(bitmap1.is_subset(&bitmap1));
    /// ```
    pub fn is_subset(&self, other: &Self) -> bool {
        self.map.iter().all(|(high, bitmap)| {
            other
                .map
                .get(high)
                .map_or(false, |other_bitmap| bitmap.is_subset(other_bitmap))
        })
    }

    /// Returns true if this bitmap is a subset of `other` and they are not equal.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let bitmap1 = Bitmap64::of(&[1, u64::MAX]);
    /// let bitmap2 = Bitmap64::of(&[1, 2, u64::MAX]);
    ///
    /// assert!(bitmap1.is_strict_subset(&bitmap2));
    /// assert!(!bitmap1.is_strict_subset(&bitmap1));
    /// ```
    pub fn is_strict_subset(&self, other: &Self) -> bool {
        self.is_subset(other) && self.cardinality() < other.cardinality()
    }

    pub(crate) fn inner(&self) -> &BTreeMap<u32, Bitmap> {
        &self.map
    }

    /// Appends an inner bitmap whose key is above every present key.
    pub(crate) fn push_unchecked(&mut self, high: u32, bitmap: Bitmap) {
        debug_assert!(self.map.last_key_value().map_or(true, |(&k, _)| k < high));
        debug_assert!(!bitmap.is_empty());
        self.map.insert(high, bitmap);
    }
}

/// Closed bounds of `range`, or `None` when it is empty.
pub(crate) fn range_to_inclusive<R: RangeBounds<u64>>(range: R) -> Option<(u64, u64)> {
    let start = match range.start_bound() {
        Bound::Included(&i) => i,
        Bound::Excluded(&i) => i.checked_add(1)?,
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&i) => i,
        Bound::Excluded(&i) => i.checked_sub(1)?,
        Bound::Unbounded => u64::MAX,
    };
    (start <= end).then_some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emptied_inner_bitmaps_are_dropped() {
        let mut bitmap = Bitmap64::of(&[1, 1 << 33, u64::MAX]);
        bitmap.remove(1 << 33);
        assert_eq!(bitmap.map.len(), 2);

        bitmap.remove_range(0..(1 << 40));
        assert_eq!(bitmap.map.len(), 1);

        bitmap.xor_inplace(&Bitmap64::of(&[u64::MAX]));
        assert!(bitmap.map.is_empty());
        bitmap.internal_validate().unwrap();
    }

    #[test]
    fn andnot_keeps_keys_missing_from_the_right() {
        let left = Bitmap64::of(&[1, 1 << 40, u64::MAX]);
        let right = Bitmap64::of(&[u64::MAX]);
        assert_eq!(left.andnot(&right).to_vec(), [1, 1 << 40]);
        assert_eq!(left.andnot_cardinality(&right), 2);
    }

    #[test]
    fn ranges_cross_inner_bitmaps() {
        let start = (3u64 << 32) - 5;
        let end = (3u64 << 32) + 5;
        let mut bitmap = Bitmap64::new();
        bitmap.add_range(start..end);
        assert_eq!(bitmap.map.len(), 2);
        assert_eq!(bitmap.cardinality(), 10);
        assert_eq!(bitmap.range_cardinality(start..=(start + 6)), 7);
        assert!(bitmap.contains_range(start..end));
        assert!(!bitmap.contains_range(start..=end));

        assert_eq!(bitmap.rank(3u64 << 32), 6);
        assert_eq!(bitmap.select(5), Some(3u64 << 32));
        assert_eq!(bitmap.minimum(), Some(start));
        assert_eq!(bitmap.maximum(), Some(end - 1));
        bitmap.internal_validate().unwrap();
    }
}
