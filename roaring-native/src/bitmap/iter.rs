use std::iter::{FromIterator, IntoIterator};

use super::Bitmap;
use crate::container;
use crate::util;

/// Ascending cursor over a [`Bitmap`].
///
/// The cursor only moves forward; create a new one with [`Bitmap::iter`] to start over.
#[derive(Clone)]
pub struct BitmapIterator<'a> {
    bitmap: &'a Bitmap,
    next_container: usize,
    current: Option<(u16, container::Iter<'a>)>,
}

impl<'a> BitmapIterator<'a> {
    fn new(bitmap: &'a Bitmap) -> Self {
        BitmapIterator {
            bitmap,
            next_container: 0,
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
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap: Bitmap = Bitmap::new();
    /// bitmap.add_range(0..100);
    /// bitmap.add(222);
    /// bitmap.add(555);
    ///
    /// let mut buf = [0; 100];
    /// let mut iter = bitmap.iter();
    /// assert_eq!(iter.next_many(&mut buf), 100);
    /// // Get the first 100 items, from the original range added
    /// for (i, item) in buf.iter().enumerate() {
    ///     assert_eq!(*item, i as u32);
    /// }
    /// // Calls to next_many() can be interleaved with calls to next()
    /// assert_eq!(iter.next(), Some(222));
    /// assert_eq!(iter.next_many(&mut buf), 1);
    /// assert_eq!(buf[0], 555);
    ///
    /// assert_eq!(iter.next(), None);
    /// assert_eq!(iter.next_many(&mut buf), 0);
    /// ```
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// fn print_by_chunks(bitmap: &Bitmap) {
    ///     let mut buf = [0; 1024];
    ///     let mut iter = bitmap.iter();
    ///     loop {
    ///         let n = iter.next_many(&mut buf);
    ///         if n == 0 {
    ///             break;
    ///         }
    ///         println!("{:?}", &buf[..n]);
    ///     }
    /// }
    ///
    /// # print_by_chunks(&Bitmap::of(&[1, 2, 8, 20, 1000]));
    /// ```
    pub fn next_many(&mut self, dst: &mut [u32]) -> usize {
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

impl Iterator for BitmapIterator<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, values)) = &mut self.current {
                if let Some(low) = values.next() {
                    return Some(util::join(*key, low));
                }
            }
            let index = self.next_container;
            let container = self.bitmap.containers().get(index)?;
            self.current = Some((self.bitmap.keys()[index], container.iter()));
            self.next_container += 1;
        }
    }
}

impl Bitmap {
    /// Returns an iterator over each value stored in the bitmap.
    /// Returned values are ordered in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut bitmap = Bitmap::new();
    /// bitmap.add(4);
    /// bitmap.add(3);
    /// bitmap.add(2);
    /// let mut iterator = bitmap.iter();
    ///
    /// assert_eq!(iterator.next(), Some(2));
    /// assert_eq!(iterator.next(), Some(3));
    /// assert_eq!(iterator.next(), Some(4));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> BitmapIterator<'_> {
        BitmapIterator::new(self)
    }
}

impl<'a> IntoIterator for &'a Bitmap {
    type Item = u32;
    type IntoIter = BitmapIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<u32> for Bitmap {
    /// Convenience method for creating bitmap from iterator.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let bitmap: Bitmap = (1..3).collect();
    ///
    /// assert!(!bitmap.is_empty());
    /// assert!(bitmap.contains(1));
    /// assert!(bitmap.contains(2));
    /// assert_eq!(bitmap.cardinality(), 2);
    /// ```
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut bitmap = Bitmap::new();
        bitmap.extend(iter);
        bitmap
    }
}

impl Extend<u32> for Bitmap {
    fn extend<T: IntoIterator<Item = u32>>(&mut self, iter: T) {
        let mut buffer = [0u32; 256];
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
