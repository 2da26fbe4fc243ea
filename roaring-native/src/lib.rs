//! Compressed bitmaps of `u32` and `u64` values.
//!
//! [`Bitmap`] stores `u32` values in per-64K-block containers whose representation
//! (sorted array, fixed bitset or run list) follows the data. [`Bitmap64`] maps the
//! high 32 bits of `u64` values to inner [`Bitmap`]s. Both read and write the
//! [`Portable`] format shared with other roaring implementations.
//!
//! [`AnyBitmap`] wraps either width behind one handle type whose binary operations
//! refuse operands of a different [`Width`].

#[macro_use]
mod macros;

pub mod bitmap;
pub mod bitmap64;
mod container;
mod error;
mod handle;
mod serialization;
mod util;

pub use bitmap::{Bitmap, BitmapIterator, RankIndex};
pub use bitmap64::{Bitmap64, Bitmap64Iterator};
pub use container::{ARRAY_LIMIT, BITMAP_WORDS};
pub use error::{Error, FormatError, Result};
pub use handle::{AnyBitmap, AnyIterator, Width};
pub use serialization::Portable;

mod sealed {
    pub trait Sealed {}
}
