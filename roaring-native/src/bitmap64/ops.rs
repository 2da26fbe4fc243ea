//! ```
//! use roaring_native::Bitmap64;
//!
//! let mut bitmap1 = Bitmap64::of(&[15, 25, u64::MAX]);
//! let bitmap2 = Bitmap64::of(&[25, 35]);
//!
//! assert_eq!((&bitmap1 & &bitmap2).to_vec(), [25]);
//! assert_eq!((&bitmap1 ^ &bitmap2).to_vec(), [15, 35, u64::MAX]);
//! assert_eq!((bitmap1.clone() - bitmap2.clone()).to_vec(), [15, u64::MAX]);
//!
//! bitmap1 &= bitmap2;
//! assert_eq!(bitmap1.to_vec(), [25]);
//! ```

use std::fmt;

use crate::Bitmap64;

impl fmt::Debug for Bitmap64 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let cardinality = self.cardinality();
        match (self.minimum(), self.maximum()) {
            (Some(min), Some(max)) if cardinality >= 32 => write!(
                f,
                "Bitmap64<{:?} values between {:?} and {:?}>",
                cardinality, min, max
            ),
            _ => {
                write!(f, "Bitmap64<[")?;
                let mut first = true;
                for value in self.iter() {
                    let prefix = if first {
                        first = false;
                        ""
                    } else {
                        ", "
                    };
                    write!(f, "{prefix}{value}")?;
                }
                write!(f, "]>")
            }
        }
    }
}

impl From<&'_ [u64]> for Bitmap64 {
    #[inline]
    fn from(slice: &[u64]) -> Self {
        Self::of(slice)
    }
}

impl<const N: usize> From<[u64; N]> for Bitmap64 {
    #[inline]
    fn from(slice: [u64; N]) -> Self {
        Self::of(&slice)
    }
}

impl PartialEq for Bitmap64 {
    /// Logical equality, independent of container representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::Bitmap64;
    ///
    /// let mut bitmap1: Bitmap64 = (0..1000).chain([u64::MAX]).collect();
    /// let bitmap2 = bitmap1.clone();
    /// bitmap1.run_optimize();
    ///
    /// assert_eq!(bitmap1, bitmap2);
    /// assert_ne!(bitmap1, Bitmap64::from([1, 2]));
    /// ```
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.inner() == other.inner()
    }
}

impl Eq for Bitmap64 {}

impl_set_operators!(Bitmap64);
