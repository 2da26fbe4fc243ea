use std::collections::btree_map;
use std::iter::FromIterator;

use super::Bitmap64;
use crate::util;
use crate::{Bitmap, BitmapIterator};

/// Ascending cursor over a [`Bitmap64`].
///
/// Walks the inner bitmaps in key order, joining each inner value with its high
/// 32 bits. Create a new cursor with [`Bitmap64::iter`] to start over.
#[derive(Clone)]
pub struct Bitmap64Iterator<'a> {
    outer: btree_map::Iter<'a, u32, Bitmap>,
    current: Option<(u32, BitmapIterator<'a>)>,
}

impl<'a> Bitmap64Iterator<'a> {
    fn new(bitmap: &'a Bitmap64) -> Self {
        Bitmap64Iterator {
            outer: bitmap.inner().iter(),
            current: None,
        }
    }

    /// Attempt to read many values from the iterator into `dst`
    ///
    /// Returns the number of items read from the iterator, may be `< dst.len()` iff
    /// the iterator is exhausted.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let bitmap = Bitmap64::of(&[1, 2, 1 << 40, u64::MAX]);
    ///
    /// let mut buf = [0; 3];
    /// let mut iter = bitmap.iter();
    /// assert_eq!(iter.next_many(&mut buf), 3);
    /// assert_eq!(buf, [1, 2, 1 << 40]);
    /// assert_eq!(iter.next_many(&mut buf), 1);
    /// assert_eq!(buf[0], u64::MAX);
    /// assert_eq!(iter.next_many(&mut buf), 0);
    /// ```
    pub fn next_many(&mut self, dst: &mut [u64]) -> usize {
        let mut count = 0;
        for slot in dst.iter_mut() {
            match self.next() {
                Some(value) => *slot = value,
                None => break,
            }
            count += 1;
        }
        count
    }
}

impl Iterator for Bitmap64Iterator<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        loop {
            if let Some((high, values)) = &mut self.current {
                if let Some(low) = values.next() {
                    return Some(util::join64(*high, low));
                }
            }
            let (&high, bitmap) = self.outer.next()?;
            self.current = Some((high, bitmap.iter()));
        }
    }
}

impl Bitmap64 {
    /// Returns an iterator over each value stored in the bitmap.
    /// Returned values are ordered in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap = Bitmap64::new();
    /// bitmap.add(4);
    /// bitmap.add(3);
    /// bitmap.add(2);
    /// bitmap.add(2);
    /// bitmap.add(u64::MAX);
    /// let mut iterator = bitmap.iter();
    ///
    /// assert_eq!(iterator.next(), Some(2));
    /// assert_eq!(iterator.next(), Some(3));
    /// assert_eq!(iterator.next(), Some(4));
    /// assert_eq!(iterator.next(), Some(u64::MAX));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> Bitmap64Iterator<'_> {
        Bitmap64Iterator::new(self)
    }
}

impl<'a> IntoIterator for &'a Bitmap64 {
    type Item = u64;
    type IntoIter = Bitmap64Iterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<u64> for Bitmap64 {
    /// Convenience method for creating a bitmap from an iterator.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let bitmap: Bitmap64 = (1..3).chain(u64::from(u32::MAX) + 1..u64::from(u32::MAX) + 10).collect();
    ///
    /// assert!(bitmap.contains(1));
    /// assert!(bitmap.contains(2));
    /// assert!(bitmap.contains(u64::from(u32::MAX) + 5));
    /// assert_eq!(bitmap.cardinality(), 11);
    /// ```
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut bitmap = Bitmap64::new();
        bitmap.extend(iter);
        bitmap
    }
}

impl Extend<u64> for Bitmap64 {
    fn extend<T: IntoIterator<Item = u64>>(&mut self, iter: T) {
        let mut buffer = [0u64; 256];
        let mut iter = iter.into_iter();
        loop {
            let mut filled = 0;
            for (slot, value) in buffer.iter_mut().zip(iter.by_ref()) {
                *slot = value;
                filled += 1;
            }
            if filled == 0 {
                break;
            }
            self.add_many(&buffer[..filled]);
        }
    }
}
