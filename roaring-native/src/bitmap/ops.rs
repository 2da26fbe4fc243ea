//! Formatting, equality, conversions and operator sugar.
//!
//! ```
//! use roaring_native::Bitmap;
//!
//! let mut bitmap1 = Bitmap::of(&[15, 25, 35]);
//! let bitmap2 = Bitmap::of(&[25, 45]);
//!
//! assert_eq!((&bitmap1 & &bitmap2).to_vec(), [25]);
//! assert_eq!((&bitmap1 | &bitmap2).to_vec(), [15, 25, 35, 45]);
//! assert_eq!((&bitmap1 ^ &bitmap2).to_vec(), [15, 35, 45]);
//! assert_eq!((&bitmap1 - &bitmap2).to_vec(), [15, 35]);
//!
//! bitmap1 -= &bitmap2;
//! bitmap1 |= Bitmap::of(&[1]);
//! assert_eq!(bitmap1.to_vec(), [1, 15, 35]);
//! ```

use std::fmt;

use super::Bitmap;

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let cardinality = self.cardinality();
        match (self.minimum(), self.maximum()) {
            (Some(min), Some(max)) if cardinality >= 32 => write!(
                f,
                "Bitmap<{:?} values between {:?} and {:?}>",
                cardinality, min, max
            ),
            _ => write!(f, "Bitmap<{:?}>", self.to_vec()),
        }
    }
}

impl PartialEq for Bitmap {
    /// Logical equality: two bitmaps holding the same values are equal whatever their
    /// container representations.
    ///
    /// ```
    /// use roaring_native::Bitmap;
    ///
    /// let mut dense: Bitmap = (0..1000).collect();
    /// let plain = dense.clone();
    /// dense.run_optimize();
    ///
    /// assert_eq!(dense, plain);
    /// assert_ne!(dense, Bitmap::from([1, 2]));
    /// ```
    #[inline]
    fn eq(&self, other: &Bitmap) -> bool {
        self.keys() == other.keys()
            && self
                .containers()
                .iter()
                .zip(other.containers())
                .all(|(a, b)| a == b)
    }
}

impl Eq for Bitmap {}

impl From<&'_ [u32]> for Bitmap {
    #[inline]
    fn from(values: &[u32]) -> Self {
        Self::of(values)
    }
}

impl<const N: usize> From<[u32; N]> for Bitmap {
    #[inline]
    fn from(values: [u32; N]) -> Self {
        Self::of(&values)
    }
}

impl_set_operators!(Bitmap);
