//! Width-tagged handles.
//!
//! [`AnyBitmap`] carries either a [`Bitmap`] or a [`Bitmap64`] and exposes one flat
//! operation set over `u64` scalars. Every operation taking two handles checks that
//! both have the same [`Width`] and fails with [`Error::TypeMismatch`] before touching
//! either operand otherwise.
//!
//! # Example
//!
//! ```rust
//! use roaring_native::{AnyBitmap, Error, Width};
//!
//! let mut a = AnyBitmap::new(Width::Bits32);
//! a.add_range(1, 5);
//! assert_eq!(a.to_vec(), [1, 2, 3, 4]);
//! assert_eq!(a.select(2), Some(3));
//!
//! let b = AnyBitmap::new(Width::Bits64);
//! assert!(matches!(a.or(&b), Err(Error::TypeMismatch { .. })));
//! ```

use std::fmt;

use tracing::debug;

use crate::{Bitmap, Bitmap64, Bitmap64Iterator, BitmapIterator, Error, Portable, Result};

/// The integer width of a bitmap handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    /// Values are `u32`.
    Bits32,
    /// Values are `u64`.
    Bits64,
}

impl Width {
    /// Number of bits in a value.
    pub fn bits(self) -> u32 {
        match self {
            Width::Bits32 => 32,
            Width::Bits64 => 64,
        }
    }

    /// The largest value a bitmap of this width can hold.
    pub fn max_value(self) -> u64 {
        match self {
            Width::Bits32 => u64::from(u32::MAX),
            Width::Bits64 => u64::MAX,
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

#[derive(Clone)]
enum Inner {
    Bits32(Bitmap),
    Bits64(Bitmap64),
}

/// An owned bitmap of either width.
///
/// Single-value operations are total: a value outside a 32-bit handle's domain is
/// never contained, and removing it is a no-op. Only insertion reports it, with
/// [`Error::OutOfRange`].
#[derive(Clone)]
pub struct AnyBitmap {
    inner: Inner,
}

fn mismatch(expected: Width, found: Width) -> Error {
    debug!(%expected, %found, "refused operation on bitmaps of different widths");
    Error::TypeMismatch { expected, found }
}

/// Closes `end` to the domain of a 32-bit handle. `None` if the range is empty.
fn range32(start: u64, end: u64) -> Option<(u32, u32)> {
    let end = end.min(1 << 32);
    if start >= end {
        return None;
    }
    // start < end <= 2^32, so both closed bounds fit
    Some((start as u32, (end - 1) as u32))
}

impl AnyBitmap {
    /// Creates an empty handle of the given width.
    pub fn new(width: Width) -> Self {
        let inner = match width {
            Width::Bits32 => Inner::Bits32(Bitmap::new()),
            Width::Bits64 => Inner::Bits64(Bitmap64::new()),
        };
        AnyBitmap { inner }
    }

    /// The width chosen at creation.
    pub fn width(&self) -> Width {
        match self.inner {
            Inner::Bits32(_) => Width::Bits32,
            Inner::Bits64(_) => Width::Bits64,
        }
    }

    /// The 32-bit bitmap behind this handle, if it is one.
    pub fn as_bitmap(&self) -> Option<&Bitmap> {
        match &self.inner {
            Inner::Bits32(bitmap) => Some(bitmap),
            Inner::Bits64(_) => None,
        }
    }

    /// The 64-bit bitmap behind this handle, if it is one.
    pub fn as_bitmap64(&self) -> Option<&Bitmap64> {
        match &self.inner {
            Inner::Bits32(_) => None,
            Inner::Bits64(bitmap) => Some(bitmap),
        }
    }

    /// Applies `bits32` or `bits64` to both operands, refusing mismatched widths.
    fn binary<T>(
        &self,
        other: &Self,
        bits32: impl FnOnce(&Bitmap, &Bitmap) -> T,
        bits64: impl FnOnce(&Bitmap64, &Bitmap64) -> T,
    ) -> Result<T> {
        match (&self.inner, &other.inner) {
            (Inner::Bits32(a), Inner::Bits32(b)) => Ok(bits32(a, b)),
            (Inner::Bits64(a), Inner::Bits64(b)) => Ok(bits64(a, b)),
            _ => Err(mismatch(self.width(), other.width())),
        }
    }

    fn binary_inplace(
        &mut self,
        other: &Self,
        bits32: impl FnOnce(&mut Bitmap, &Bitmap),
        bits64: impl FnOnce(&mut Bitmap64, &Bitmap64),
    ) -> Result<()> {
        let (expected, found) = (self.width(), other.width());
        match (&mut self.inner, &other.inner) {
            (Inner::Bits32(a), Inner::Bits32(b)) => bits32(a, b),
            (Inner::Bits64(a), Inner::Bits64(b)) => bits64(a, b),
            _ => return Err(mismatch(expected, found)),
        }
        Ok(())
    }

    /// Adds `value`, failing if it does not fit the handle's width.
    pub fn add(&mut self, value: u64) -> Result<()> {
        self.add_checked(value).map(|_| ())
    }

    /// Adds `value`, returning whether it was absent before.
    ///
    /// ```
    /// use roaring_native::{AnyBitmap, Error, Width};
    ///
    /// let mut bitmap = AnyBitmap::new(Width::Bits32);
    /// assert!(bitmap.add_checked(7).unwrap());
    /// assert!(!bitmap.add_checked(7).unwrap());
    /// assert!(matches!(bitmap.add_checked(1 << 32), Err(Error::OutOfRange { .. })));
    /// ```
    pub fn add_checked(&mut self, value: u64) -> Result<bool> {
        match &mut self.inner {
            Inner::Bits32(bitmap) => match u32::try_from(value) {
                Ok(value) => Ok(bitmap.add_checked(value)),
                Err(_) => Err(Error::OutOfRange {
                    value,
                    width: Width::Bits32,
                }),
            },
            Inner::Bits64(bitmap) => Ok(bitmap.add_checked(value)),
        }
    }

    /// Bulk insert into a 32-bit handle. Unsorted and duplicate input is fine.
    pub fn add_many32(&mut self, values: &[u32]) -> Result<()> {
        match &mut self.inner {
            Inner::Bits32(bitmap) => {
                bitmap.add_many(values);
                Ok(())
            }
            Inner::Bits64(_) => Err(mismatch(Width::Bits64, Width::Bits32)),
        }
    }

    /// Bulk insert into a 64-bit handle. Unsorted and duplicate input is fine.
    pub fn add_many64(&mut self, values: &[u64]) -> Result<()> {
        match &mut self.inner {
            Inner::Bits32(_) => Err(mismatch(Width::Bits32, Width::Bits64)),
            Inner::Bits64(bitmap) => {
                bitmap.add_many(values);
                Ok(())
            }
        }
    }

    /// Adds every value of `[start, end)`. A 32-bit handle ignores the part of the
    /// range above `u32::MAX`.
    pub fn add_range(&mut self, start: u64, end: u64) {
        match &mut self.inner {
            Inner::Bits32(bitmap) => {
                if let Some((start, last)) = range32(start, end) {
                    bitmap.add_range(start..=last);
                }
            }
            Inner::Bits64(bitmap) => bitmap.add_range(start..end),
        }
    }

    /// Removes `value` if present.
    pub fn remove(&mut self, value: u64) {
        self.remove_checked(value);
    }

    /// Removes `value`, returning whether it was present.
    pub fn remove_checked(&mut self, value: u64) -> bool {
        match &mut self.inner {
            Inner::Bits32(bitmap) => {
                u32::try_from(value).map_or(false, |value| bitmap.remove_checked(value))
            }
            Inner::Bits64(bitmap) => bitmap.remove_checked(value),
        }
    }

    /// Bulk removal from a 32-bit handle.
    pub fn remove_many32(&mut self, values: &[u32]) -> Result<()> {
        match &mut self.inner {
            Inner::Bits32(bitmap) => {
                bitmap.remove_many(values);
                Ok(())
            }
            Inner::Bits64(_) => Err(mismatch(Width::Bits64, Width::Bits32)),
        }
    }

    /// Bulk removal from a 64-bit handle.
    pub fn remove_many64(&mut self, values: &[u64]) -> Result<()> {
        match &mut self.inner {
            Inner::Bits32(_) => Err(mismatch(Width::Bits32, Width::Bits64)),
            Inner::Bits64(bitmap) => {
                bitmap.remove_many(values);
                Ok(())
            }
        }
    }

    /// Removes every value of `[start, end)`.
    pub fn remove_range(&mut self, start: u64, end: u64) {
        match &mut self.inner {
            Inner::Bits32(bitmap) => {
                if let Some((start, last)) = range32(start, end) {
                    bitmap.remove_range(start..=last);
                }
            }
            Inner::Bits64(bitmap) => bitmap.remove_range(start..end),
        }
    }

    /// Removes every value.
    pub fn clear(&mut self) {
        match &mut self.inner {
            Inner::Bits32(bitmap) => bitmap.clear(),
            Inner::Bits64(bitmap) => bitmap.clear(),
        }
    }

    /// Run-compresses containers where smaller; returns whether any converted.
    pub fn run_optimize(&mut self) -> bool {
        match &mut self.inner {
            Inner::Bits32(bitmap) => bitmap.run_optimize(),
            Inner::Bits64(bitmap) => bitmap.run_optimize(),
        }
    }

    /// Converts every run container back; returns whether any converted.
    pub fn remove_run_compression(&mut self) -> bool {
        match &mut self.inner {
            Inner::Bits32(bitmap) => bitmap.remove_run_compression(),
            Inner::Bits64(bitmap) => bitmap.remove_run_compression(),
        }
    }

    pub fn contains(&self, value: u64) -> bool {
        match &self.inner {
            Inner::Bits32(bitmap) => u32::try_from(value).map_or(false, |v| bitmap.contains(v)),
            Inner::Bits64(bitmap) => bitmap.contains(value),
        }
    }

    /// Whether every value of `[start, end)` is present. Empty ranges are contained;
    /// a 32-bit handle contains no value above `u32::MAX`.
    pub fn contains_range(&self, start: u64, end: u64) -> bool {
        match &self.inner {
            Inner::Bits32(bitmap) => {
                if start >= end {
                    return true;
                }
                if end > 1 << 32 {
                    return false;
                }
                range32(start, end)
                    .map_or(true, |(start, last)| bitmap.contains_range(start..=last))
            }
            Inner::Bits64(bitmap) => bitmap.contains_range(start..end),
        }
    }

    pub fn cardinality(&self) -> u64 {
        match &self.inner {
            Inner::Bits32(bitmap) => bitmap.cardinality(),
            Inner::Bits64(bitmap) => bitmap.cardinality(),
        }
    }

    /// Number of values in `[start, end)`.
    pub fn range_cardinality(&self, start: u64, end: u64) -> u64 {
        match &self.inner {
            Inner::Bits32(bitmap) => range32(start, end)
                .map_or(0, |(start, last)| bitmap.range_cardinality(start..=last)),
            Inner::Bits64(bitmap) => bitmap.range_cardinality(start..end),
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.inner {
            Inner::Bits32(bitmap) => bitmap.is_empty(),
            Inner::Bits64(bitmap) => bitmap.is_empty(),
        }
    }

    /// Smallest value, or the width's largest value when empty.
    ///
    /// ```
    /// use roaring_native::{AnyBitmap, Width};
    ///
    /// assert_eq!(AnyBitmap::new(Width::Bits32).minimum(), u64::from(u32::MAX));
    /// assert_eq!(AnyBitmap::new(Width::Bits64).minimum(), u64::MAX);
    /// assert_eq!(AnyBitmap::new(Width::Bits32).maximum(), 0);
    /// ```
    pub fn minimum(&self) -> u64 {
        let minimum = match &self.inner {
            Inner::Bits32(bitmap) => bitmap.minimum().map(u64::from),
            Inner::Bits64(bitmap) => bitmap.minimum(),
        };
        minimum.unwrap_or_else(|| self.width().max_value())
    }

    /// Largest value, or 0 when empty.
    pub fn maximum(&self) -> u64 {
        let maximum = match &self.inner {
            Inner::Bits32(bitmap) => bitmap.maximum().map(u64::from),
            Inner::Bits64(bitmap) => bitmap.maximum(),
        };
        maximum.unwrap_or(0)
    }

    /// Number of values smaller or equal to `value`.
    pub fn rank(&self, value: u64) -> u64 {
        match &self.inner {
            Inner::Bits32(bitmap) => match u32::try_from(value) {
                Ok(value) => bitmap.rank(value),
                Err(_) => bitmap.cardinality(),
            },
            Inner::Bits64(bitmap) => bitmap.rank(value),
        }
    }

    /// The value at 0-based position `rank`, or `None` past the end.
    pub fn select(&self, rank: u64) -> Option<u64> {
        match &self.inner {
            Inner::Bits32(bitmap) => {
                let rank = u32::try_from(rank).ok()?;
                bitmap.select(rank).map(u64::from)
            }
            Inner::Bits64(bitmap) => bitmap.select(rank),
        }
    }

    /// 0-based index of `value`, if present.
    pub fn position(&self, value: u64) -> Option<u64> {
        match &self.inner {
            Inner::Bits32(bitmap) => bitmap.position(u32::try_from(value).ok()?),
            Inner::Bits64(bitmap) => bitmap.position(value),
        }
    }

    /// Logical equality of two handles of the same width.
    pub fn equals(&self, other: &Self) -> Result<bool> {
        self.binary(other, |a, b| a == b, |a, b| a == b)
    }

    /// Whether the handles share at least one value.
    pub fn intersect(&self, other: &Self) -> Result<bool> {
        self.binary(other, Bitmap::intersect, Bitmap64::intersect)
    }

    pub fn is_subset(&self, other: &Self) -> Result<bool> {
        self.binary(other, Bitmap::is_subset, Bitmap64::is_subset)
    }

    pub fn is_strict_subset(&self, other: &Self) -> Result<bool> {
        self.binary(other, Bitmap::is_strict_subset, Bitmap64::is_strict_subset)
    }

    /// Union as a new handle.
    pub fn or(&self, other: &Self) -> Result<Self> {
        self.binary(
            other,
            |a, b| Inner::Bits32(a.or(b)),
            |a, b| Inner::Bits64(a.or(b)),
        )
        .map(|inner| AnyBitmap { inner })
    }

    pub fn or_inplace(&mut self, other: &Self) -> Result<()> {
        self.binary_inplace(other, Bitmap::or_inplace, Bitmap64::or_inplace)
    }

    pub fn or_cardinality(&self, other: &Self) -> Result<u64> {
        self.binary(other, Bitmap::or_cardinality, Bitmap64::or_cardinality)
    }

    /// Intersection as a new handle.
    pub fn and(&self, other: &Self) -> Result<Self> {
        self.binary(
            other,
            |a, b| Inner::Bits32(a.and(b)),
            |a, b| Inner::Bits64(a.and(b)),
        )
        .map(|inner| AnyBitmap { inner })
    }

    pub fn and_inplace(&mut self, other: &Self) -> Result<()> {
        self.binary_inplace(other, Bitmap::and_inplace, Bitmap64::and_inplace)
    }

    pub fn and_cardinality(&self, other: &Self) -> Result<u64> {
        self.binary(other, Bitmap::and_cardinality, Bitmap64::and_cardinality)
    }

    /// Symmetric difference as a new handle.
    pub fn xor(&self, other: &Self) -> Result<Self> {
        self.binary(
            other,
            |a, b| Inner::Bits32(a.xor(b)),
            |a, b| Inner::Bits64(a.xor(b)),
        )
        .map(|inner| AnyBitmap { inner })
    }

    pub fn xor_inplace(&mut self, other: &Self) -> Result<()> {
        self.binary_inplace(other, Bitmap::xor_inplace, Bitmap64::xor_inplace)
    }

    pub fn xor_cardinality(&self, other: &Self) -> Result<u64> {
        self.binary(other, Bitmap::xor_cardinality, Bitmap64::xor_cardinality)
    }

    /// Difference as a new handle.
    pub fn andnot(&self, other: &Self) -> Result<Self> {
        self.binary(
            other,
            |a, b| Inner::Bits32(a.andnot(b)),
            |a, b| Inner::Bits64(a.andnot(b)),
        )
        .map(|inner| AnyBitmap { inner })
    }

    pub fn andnot_inplace(&mut self, other: &Self) -> Result<()> {
        self.binary_inplace(other, Bitmap::andnot_inplace, Bitmap64::andnot_inplace)
    }

    pub fn andnot_cardinality(&self, other: &Self) -> Result<u64> {
        self.binary(other, Bitmap::andnot_cardinality, Bitmap64::andnot_cardinality)
    }

    /// Every value in ascending order, widened to `u64`.
    pub fn to_vec(&self) -> Vec<u64> {
        self.iter().collect()
    }

    /// Every value of a 32-bit handle in ascending order.
    pub fn to_vec32(&self) -> Result<Vec<u32>> {
        match &self.inner {
            Inner::Bits32(bitmap) => bitmap.try_to_vec(),
            Inner::Bits64(_) => Err(mismatch(Width::Bits64, Width::Bits32)),
        }
    }

    /// Every value of a 64-bit handle in ascending order.
    pub fn to_vec64(&self) -> Result<Vec<u64>> {
        match &self.inner {
            Inner::Bits32(_) => Err(mismatch(Width::Bits32, Width::Bits64)),
            Inner::Bits64(bitmap) => bitmap.try_to_vec(),
        }
    }

    /// Opens an ascending cursor over the handle.
    ///
    /// ```
    /// use roaring_native::{AnyBitmap, Width};
    ///
    /// let mut bitmap = AnyBitmap::new(Width::Bits64);
    /// bitmap.add_range(10, 15);
    ///
    /// let mut iter = bitmap.iter();
    /// let mut buf = [0; 3];
    /// assert_eq!(iter.next_many(&mut buf), 3);
    /// assert_eq!(buf, [10, 11, 12]);
    /// assert_eq!(iter.next_many(&mut buf), 2);
    /// assert_eq!(&buf[..2], [13, 14]);
    /// assert_eq!(iter.next_many(&mut buf), 0);
    /// ```
    pub fn iter(&self) -> AnyIterator<'_> {
        let inner = match &self.inner {
            Inner::Bits32(bitmap) => IterInner::Bits32(bitmap.iter()),
            Inner::Bits64(bitmap) => IterInner::Bits64(bitmap.iter()),
        };
        AnyIterator { inner }
    }

    /// Exact size of [`AnyBitmap::serialize`]'s output.
    pub fn get_serialized_size_in_bytes(&self) -> usize {
        match &self.inner {
            Inner::Bits32(bitmap) => bitmap.get_serialized_size_in_bytes::<Portable>(),
            Inner::Bits64(bitmap) => bitmap.get_serialized_size_in_bytes::<Portable>(),
        }
    }

    /// Serializes the handle in the portable format of its width.
    pub fn serialize(&self) -> Vec<u8> {
        match &self.inner {
            Inner::Bits32(bitmap) => bitmap.serialize::<Portable>(),
            Inner::Bits64(bitmap) => bitmap.serialize::<Portable>(),
        }
    }

    /// Decodes a portable payload of the given width.
    ///
    /// ```
    /// use roaring_native::{AnyBitmap, Width};
    ///
    /// let mut bitmap = AnyBitmap::new(Width::Bits64);
    /// bitmap.add(u64::MAX).unwrap();
    /// let bytes = bitmap.serialize();
    ///
    /// let decoded = AnyBitmap::deserialize(Width::Bits64, &bytes).unwrap();
    /// assert!(decoded.equals(&bitmap).unwrap());
    /// ```
    pub fn deserialize(width: Width, buffer: &[u8]) -> Result<Self> {
        let inner = match width {
            Width::Bits32 => Inner::Bits32(Bitmap::try_deserialize::<Portable>(buffer)?),
            Width::Bits64 => Inner::Bits64(Bitmap64::try_deserialize::<Portable>(buffer)?),
        };
        Ok(AnyBitmap { inner })
    }

    /// Replaces the contents with a decoded payload of the same width. On error the
    /// handle is left unchanged.
    ///
    /// ```
    /// use roaring_native::{AnyBitmap, Width};
    ///
    /// let mut bitmap = AnyBitmap::new(Width::Bits32);
    /// bitmap.add(5).unwrap();
    ///
    /// assert!(bitmap.deserialize_in_place(&[1, 2, 3]).is_err());
    /// assert_eq!(bitmap.to_vec(), [5]);
    /// ```
    pub fn deserialize_in_place(&mut self, buffer: &[u8]) -> Result<()> {
        *self = Self::deserialize(self.width(), buffer)?;
        Ok(())
    }
}

impl fmt::Debug for AnyBitmap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.inner {
            Inner::Bits32(bitmap) => fmt::Debug::fmt(bitmap, f),
            Inner::Bits64(bitmap) => fmt::Debug::fmt(bitmap, f),
        }
    }
}

impl From<Bitmap> for AnyBitmap {
    fn from(bitmap: Bitmap) -> Self {
        AnyBitmap {
            inner: Inner::Bits32(bitmap),
        }
    }
}

impl From<Bitmap64> for AnyBitmap {
    fn from(bitmap: Bitmap64) -> Self {
        AnyBitmap {
            inner: Inner::Bits64(bitmap),
        }
    }
}

#[derive(Clone)]
enum IterInner<'a> {
    Bits32(BitmapIterator<'a>),
    Bits64(Bitmap64Iterator<'a>),
}

/// Ascending cursor over an [`AnyBitmap`], yielding values widened to `u64`.
#[derive(Clone)]
pub struct AnyIterator<'a> {
    inner: IterInner<'a>,
}

impl AnyIterator<'_> {
    /// Reads up to `dst.len()` values, returning how many were read. Zero means
    /// the cursor is exhausted.
    pub fn next_many(&mut self, dst: &mut [u64]) -> usize {
        match &mut self.inner {
            IterInner::Bits32(iter) => {
                let mut count = 0;
                for (slot, value) in dst.iter_mut().zip(iter) {
                    *slot = u64::from(value);
                    count += 1;
                }
                count
            }
            IterInner::Bits64(iter) => iter.next_many(dst),
        }
    }
}

impl Iterator for AnyIterator<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        match &mut self.inner {
            IterInner::Bits32(iter) => iter.next().map(u64::from),
            IterInner::Bits64(iter) => iter.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_clamp_to_32_bits() {
        let mut bitmap = AnyBitmap::new(Width::Bits32);
        bitmap.add_range(u64::from(u32::MAX) - 1, u64::MAX);
        assert_eq!(bitmap.cardinality(), 2);
        assert_eq!(bitmap.range_cardinality(0, u64::MAX), 2);
        assert!(bitmap.contains_range(u64::from(u32::MAX) - 1, 1 << 32));
        assert!(!bitmap.contains_range(u64::from(u32::MAX) - 1, (1 << 32) + 1));

        bitmap.remove_range(0, u64::MAX);
        assert!(bitmap.is_empty());
    }

    #[test]
    fn out_of_domain_values_are_total() {
        let mut bitmap = AnyBitmap::new(Width::Bits32);
        assert!(!bitmap.contains(1 << 40));
        assert!(!bitmap.remove_checked(1 << 40));
        assert_eq!(bitmap.select(1 << 40), None);
        assert!(matches!(
            bitmap.add(1 << 40),
            Err(Error::OutOfRange {
                value,
                width: Width::Bits32
            }) if value == 1 << 40
        ));
    }

    #[test]
    fn mismatched_widths_leave_operands_alone() {
        let mut a = AnyBitmap::from(Bitmap::of(&[1, 2]));
        let b = AnyBitmap::from(Bitmap64::of(&[2]));
        assert!(matches!(
            a.and_inplace(&b),
            Err(Error::TypeMismatch {
                expected: Width::Bits32,
                found: Width::Bits64
            })
        ));
        assert_eq!(a.to_vec(), [1, 2]);
        assert!(a.add_many64(&[3]).is_err());
        assert!(b.to_vec32().is_err());
    }
}
