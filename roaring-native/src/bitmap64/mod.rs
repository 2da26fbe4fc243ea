//! A compressed bitmap which can hold 64-bit integers
//!
//! The high 32 bits of each value select an independent 32-bit [`Bitmap`]; the
//! low 32 bits are stored inside it. Only non-empty inner bitmaps are kept.
//!
//! # Example
//!
//! ```rust
//! use roaring_native::Bitmap64;
//!
//! let mut bitmap = Bitmap64::new();
//! bitmap.add(3);
//! assert!(bitmap.contains(3));
//! bitmap.add(u64::from(u32::MAX));
//! assert!(bitmap.contains(u64::from(u32::MAX)));
//! bitmap.add(u64::from(u32::MAX) + 1);
//! assert!(bitmap.contains(u64::from(u32::MAX) + 1));
//! assert_eq!(bitmap.cardinality(), 3);
//! ```

use std::collections::BTreeMap;

use crate::Bitmap;

mod imp;
mod iter;
mod ops;
mod serialization;

pub use self::iter::Bitmap64Iterator;
pub use self::serialization::{Deserializer, Serializer};

/// A Bitmap which can hold 64-bit integers
#[derive(Clone, Default)]
pub struct Bitmap64 {
    map: BTreeMap<u32, Bitmap>,
}
