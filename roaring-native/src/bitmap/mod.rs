//! Compressed bitmap of `u32` values.
//!
//! Values are split into a 16-bit high key and 16-bit low bits. The high keys form a
//! sorted directory; each key owns a container holding the low bits of every value that
//! shares it. See the [RoaringFormatSpec](https://github.com/RoaringBitmap/RoaringFormatSpec)
//! for the serialized layout.
//!
//! # Example
//!
//! ```rust
//! use roaring_native::Bitmap;
//!
//! let mut rb1 = Bitmap::new();
//! rb1.add(1);
//! rb1.add(2);
//! rb1.add(3);
//! rb1.add(4);
//! rb1.add(5);
//! rb1.add(100);
//! rb1.add(1000);
//! rb1.run_optimize();
//!
//! let mut rb2 = Bitmap::new();
//! rb2.add(3);
//! rb2.add(4);
//! rb2.add(1000);
//! rb2.run_optimize();
//!
//! assert_eq!(rb1.cardinality(), 7);
//! assert!(rb1.contains(3));
//!
//! rb1.and_inplace(&rb2);
//! assert_eq!(rb1.to_vec(), [3, 4, 1000]);
//!
//! let mut rb3 = Bitmap::of(&[5]);
//! rb3.or_inplace(&rb1);
//! println!("{:?}", rb3);
//! ```

use crate::container::Container;

/// A compressed bitmap
#[derive(Clone, Default)]
pub struct Bitmap {
    keys: Vec<u16>,
    containers: Vec<Container>,
}

mod algebra;
mod imp;
mod iter;
mod ops;
mod rank;
mod serialization;

pub use self::iter::BitmapIterator;
pub use self::rank::RankIndex;
pub use self::serialization::{Deserializer, Serializer};
