//! Set algebra over two directories, walked in ascending key order.

use std::cmp::Ordering;
use std::mem;

use super::Bitmap;
use crate::container::{ops, Container};

impl Bitmap {
    /// Builds a new bitmap from both directories. Keys present on one side only are
    /// cloned when `keep_left`/`keep_right` say so; shared keys go through `both`.
    fn merge_with(
        &self,
        other: &Self,
        keep_left: bool,
        keep_right: bool,
        both: impl Fn(&Container, &Container) -> Container,
    ) -> Bitmap {
        let mut result = Bitmap::new();
        let (mut i, mut j) = (0, 0);
        loop {
            let order = match (self.keys.get(i), other.keys.get(j)) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) if keep_left => Ordering::Less,
                (None, Some(_)) if keep_right => Ordering::Greater,
                _ => break,
            };
            match order {
                Ordering::Less => {
                    if keep_left {
                        result.push_unchecked(self.keys[i], self.containers[i].clone());
                    }
                    i += 1;
                }
                Ordering::Greater => {
                    if keep_right {
                        result.push_unchecked(other.keys[j], other.containers[j].clone());
                    }
                    j += 1;
                }
                Ordering::Equal => {
                    let container = both(&self.containers[i], &other.containers[j]);
                    if !container.is_empty() {
                        result.push_unchecked(self.keys[i], container);
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        result
    }

    /// Rebuilds this directory merged with `other`, moving owned containers instead
    /// of cloning them. Keys only in `other` are cloned in.
    fn merge_inplace(&mut self, other: &Self, op: fn(&mut Container, &Container)) {
        let keys = mem::take(&mut self.keys);
        let containers = mem::take(&mut self.containers);
        self.keys.reserve(keys.len().max(other.keys.len()));
        self.containers.reserve(keys.len().max(other.keys.len()));

        let mut left = keys.into_iter().zip(containers).peekable();
        let mut right = other.keys.iter().copied().zip(&other.containers).peekable();
        loop {
            let order = match (left.peek(), right.peek()) {
                (Some(&(a, _)), Some(&(b, _))) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => break,
            };
            match order {
                Ordering::Less => {
                    if let Some((key, container)) = left.next() {
                        self.push_unchecked(key, container);
                    }
                }
                Ordering::Greater => {
                    if let Some((key, container)) = right.next() {
                        self.push_unchecked(key, container.clone());
                    }
                }
                Ordering::Equal => {
                    if let (Some((key, mut container)), Some((_, theirs))) =
                        (left.next(), right.next())
                    {
                        op(&mut container, theirs);
                        if !container.is_empty() {
                            self.push_unchecked(key, container);
                        }
                    }
                }
            }
        }
    }

    /// Calls `f` with every pair of containers sharing a key, stopping at the first
    /// `Some` it returns.
    fn find_shared<T>(
        &self,
        other: &Self,
        mut f: impl FnMut(&Container, &Container) -> Option<T>,
    ) -> Option<T> {
        let (mut i, mut j) = (0, 0);
        while i < self.keys.len() && j < other.keys.len() {
            match self.keys[i].cmp(&other.keys[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    if let Some(found) = f(&self.containers[i], &other.containers[j]) {
                        return Some(found);
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        None
    }

    /// And computes the intersection between two bitmaps and returns the result
    /// as a new bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[1]);
    /// let bitmap2 = Bitmap::of(&[1, 2]);
    ///
    /// let bitmap3 = bitmap1.and(&bitmap2);
    ///
    /// assert!(bitmap3.contains(1));
    /// assert!(!bitmap3.contains(2));
    /// ```
    pub fn and(&self, other: &Self) -> Self {
        self.merge_with(other, false, false, ops::and)
    }

    /// Computes the intersection between two bitmaps and stores the result
    /// in the current bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::of(&[15]);
    /// let bitmap2 = Bitmap::of(&[25]);
    /// let mut bitmap3 = Bitmap::of(&[15]);
    /// let bitmap4 = Bitmap::of(&[15, 25]);
    ///
    /// bitmap1.and_inplace(&bitmap2);
    ///
    /// assert_eq!(bitmap1.cardinality(), 0);
    /// assert!(!bitmap1.contains(15));
    /// assert!(!bitmap1.contains(25));
    ///
    /// bitmap3.and_inplace(&bitmap4);
    ///
    /// assert_eq!(bitmap3.cardinality(), 1);
    /// assert!(bitmap3.contains(15));
    /// assert!(!bitmap3.contains(25));
    /// ```
    pub fn and_inplace(&mut self, other: &Self) {
        let mut j = 0;
        for i in 0..self.keys.len() {
            let key = self.keys[i];
            j += other.keys[j..].partition_point(|&k| k < key);
            match other.keys.get(j) {
                Some(&k) if k == key => {
                    ops::and_inplace(&mut self.containers[i], &other.containers[j])
                }
                _ => self.containers[i] = Container::new(),
            }
        }
        self.prune_empty();
    }

    /// Or computes the union between two bitmaps and returns the result
    /// as a new bitmap
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15]);
    /// let bitmap2 = Bitmap::of(&[25]);
    ///
    /// let bitmap3 = bitmap1.or(&bitmap2);
    ///
    /// assert_eq!(bitmap3.cardinality(), 2);
    /// assert!(bitmap3.contains(15));
    /// assert!(bitmap3.contains(25));
    /// ```
    pub fn or(&self, other: &Self) -> Self {
        self.merge_with(other, true, true, ops::or)
    }

    /// Computes the union between two bitmaps and stores the result in
    /// the current bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::of(&[15]);
    /// let bitmap2 = Bitmap::of(&[25]);
    ///
    /// bitmap1.or_inplace(&bitmap2);
    ///
    /// assert_eq!(bitmap1.cardinality(), 2);
    /// assert!(bitmap1.contains(15));
    /// assert!(bitmap1.contains(25));
    /// ```
    pub fn or_inplace(&mut self, other: &Self) {
        self.merge_inplace(other, ops::or_inplace);
    }

    /// Computes the symmetric difference (xor) between two bitmaps
    /// and returns new bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
    ///
    /// let bitmap3 = bitmap1.xor(&bitmap2);
    ///
    /// assert_eq!(bitmap3.cardinality(), 2);
    /// assert!(bitmap3.contains(15));
    /// assert!(!bitmap3.contains(25));
    /// assert!(bitmap3.contains(35));
    /// ```
    pub fn xor(&self, other: &Self) -> Self {
        self.merge_with(other, true, true, ops::xor)
    }

    /// Inplace version of xor, stores result in the current bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
    ///
    /// bitmap1.xor_inplace(&bitmap2);
    ///
    /// assert_eq!(bitmap1.cardinality(), 2);
    /// assert!(bitmap1.contains(15));
    /// assert!(bitmap1.contains(35));
    ///
    /// let mut bitmap3 = Bitmap::of(&[15]);
    /// bitmap3.xor_inplace(&Bitmap::of(&[15]));
    /// assert!(bitmap3.is_empty());
    /// ```
    pub fn xor_inplace(&mut self, other: &Self) {
        self.merge_inplace(other, ops::xor_inplace);
    }

    /// Computes the difference between two bitmaps and returns the result.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
    ///
    /// let bitmap3 = bitmap1.andnot(&bitmap2);
    ///
    /// assert_eq!(bitmap3.cardinality(), 1);
    /// assert!(bitmap3.contains(15));
    /// assert!(!bitmap3.contains(25));
    /// assert!(!bitmap3.contains(35));
    /// ```
    pub fn andnot(&self, other: &Self) -> Self {
        self.merge_with(other, true, false, ops::andnot)
    }

    /// Computes the difference between two bitmaps and stores the result
    /// in the current bitmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap1 = Bitmap::of(&[15, 25]);
    /// let bitmap2 = Bitmap::of(&[25, 35]);
    ///
    /// bitmap1.andnot_inplace(&bitmap2);
    ///
    /// assert_eq!(bitmap1.cardinality(), 1);
    /// assert!(bitmap1.contains(15));
    /// assert!(!bitmap1.contains(25));
    /// ```
    pub fn andnot_inplace(&mut self, other: &Self) {
        let mut j = 0;
        for i in 0..self.keys.len() {
            let key = self.keys[i];
            j += other.keys[j..].partition_point(|&k| k < key);
            if let Some(&k) = other.keys.get(j) {
                if k == key {
                    ops::andnot_inplace(&mut self.containers[i], &other.containers[j]);
                }
            }
        }
        self.prune_empty();
    }

    /// Return true if the two bitmaps intersect.
    ///
    /// Stops at the first shared key whose containers overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[1, 100_000]);
    /// let bitmap2 = Bitmap::of(&[2, 100_000]);
    /// let bitmap3 = Bitmap::of(&[3]);
    ///
    /// assert!(bitmap1.intersect(&bitmap2));
    /// assert!(!bitmap1.intersect(&bitmap3));
    /// ```
    pub fn intersect(&self, other: &Self) -> bool {
        self.find_shared(other, |a, b| ops::intersects(a, b).then_some(()))
            .is_some()
    }

    /// Returns the cardinality of the intersection of two bitmaps, without
    /// building it.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[1, 2, 3]);
    /// let bitmap2 = Bitmap::of(&[2, 3, 4]);
    ///
    /// assert_eq!(bitmap1.and_cardinality(&bitmap2), 2);
    /// ```
    pub fn and_cardinality(&self, other: &Self) -> u64 {
        let mut total = 0;
        self.find_shared(other, |a, b| {
            total += ops::and_len(a, b);
            None::<()>
        });
        total
    }

    /// Returns the cardinality of the union of two bitmaps
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[1, 2, 3]);
    /// let bitmap2 = Bitmap::of(&[2, 3, 4]);
    ///
    /// assert_eq!(bitmap1.or_cardinality(&bitmap2), 4);
    /// ```
    pub fn or_cardinality(&self, other: &Self) -> u64 {
        self.cardinality() + other.cardinality() - self.and_cardinality(other)
    }

    /// Returns the cardinality of the symmetric difference (xor) of two bitmaps
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[1, 2, 3]);
    /// let bitmap2 = Bitmap::of(&[2, 3, 4]);
    ///
    /// assert_eq!(bitmap1.xor_cardinality(&bitmap2), 2);
    /// ```
    pub fn xor_cardinality(&self, other: &Self) -> u64 {
        self.cardinality() + other.cardinality() - 2 * self.and_cardinality(other)
    }

    /// Returns the cardinality of the difference of two bitmaps
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap1 = Bitmap::of(&[1, 2, 3]);
    /// let bitmap2 = Bitmap::of(&[2, 3, 4]);
    ///
    /// assert_eq!(bitmap1.andnot_cardinality(&bitmap2), 1);
    /// ```
    pub fn andnot_cardinality(&self, other: &Self) -> u64 {
        self.cardinality() - self.and_cardinality(other)
    }

    /// Return true if all the elements of Self are in &other.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap1: Bitmap = (5..10).collect();
    /// let bitmap2: Bitmap = (5..8).collect();
    /// let bitmap3: Bitmap = (5..10).collect();
    /// let bitmap4: Bitmap = (9..11).collect();
    ///
    /// assert!(bitmap2.is_subset(&bitmap1));
    /// assert!(bitmap3.is_subset(&bitmap1));
    /// assert!(!bitmap4.is_subset(&bitmap1));
    /// ```
    pub fn is_subset(&self, other: &Self) -> bool {
        let mut j = 0;
        self.keys.iter().zip(&self.containers).all(|(&key, container)| {
            j += other.keys[j..].partition_point(|&k| k < key);
            match other.keys.get(j) {
                Some(&k) if k == key => {
                    ops::and_len(container, &other.containers[j]) == container.len()
                }
                _ => false,
            }
        })
    }

    /// Return true if all the elements of Self are in &other and &other is strictly greater
    /// than Self.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap1: Bitmap = (5..9).collect();
    /// let bitmap2: Bitmap = (5..8).collect();
    /// let bitmap3: Bitmap = (5..10).collect();
    ///
    /// assert!(bitmap2.is_strict_subset(&bitmap1));
    /// assert!(!bitmap3.is_strict_subset(&bitmap1));
    /// assert!(!bitmap1.is_strict_subset(&bitmap1));
    /// ```
    pub fn is_strict_subset(&self, other: &Self) -> bool {
        self.is_subset(other) && self.cardinality() < other.cardinality()
    }
}
