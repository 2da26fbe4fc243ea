use tracing::debug;

use crate::bitmap;
use crate::error::FormatError;
use crate::serialization::{append_with, ByteReader, ByteWriter};
use crate::{Bitmap, Bitmap64, Portable, Result};

/// A format a [`Bitmap64`] can be written in.
pub trait Serializer: crate::sealed::Sealed {
    /// Appends the serialized bitmap to `dst`, returning the newly written bytes.
    fn serialize_into<'a>(bitmap: &Bitmap64, dst: &'a mut Vec<u8>) -> &'a [u8];
    /// Exact number of bytes [`Serializer::serialize_into`] writes.
    fn get_serialized_size_in_bytes(bitmap: &Bitmap64) -> usize;
}

/// A format a [`Bitmap64`] can be read from.
pub trait Deserializer: crate::sealed::Sealed {
    /// Decodes a bitmap from the front of `buffer`, returning it with the number of
    /// bytes consumed.
    fn try_deserialize(buffer: &[u8]) -> Result<(Bitmap64, usize)>;
}

fn write_portable(bitmap: &Bitmap64, w: &mut ByteWriter<'_>, scratch: &mut Vec<u8>) {
    w.put_u64(bitmap.inner().len() as u64);
    for (&high, inner) in bitmap.inner() {
        w.put_u32(high);
        scratch.clear();
        w.put_bytes(inner.serialize_into::<Portable>(scratch));
    }
}

fn read_portable(buffer: &[u8]) -> Result<(Bitmap64, usize)> {
    let mut reader = ByteReader::new(buffer);
    let count = reader.read_u64()?;
    let mut result = Bitmap64::new();
    let mut previous: Option<u32> = None;
    for index in 0..count {
        let high = reader.read_u32()?;
        if previous.map_or(false, |prev| high <= prev) {
            // the index only names the offending entry in the error
            let index = usize::try_from(index).unwrap_or(usize::MAX);
            return Err(FormatError::UnsortedKeys { index }.into());
        }
        previous = Some(high);

        let (inner, used) =
            <Portable as bitmap::Deserializer>::try_deserialize(reader.rest())?;
        reader.take(used)?;
        if inner.is_empty() {
            return Err(FormatError::EmptyBitmap { key: high }.into());
        }
        result.push_unchecked(high, inner);
    }
    Ok((result, reader.position()))
}

impl Serializer for Portable {
    /// Writes a `u64` entry count, then for every inner bitmap its `u32` high key
    /// followed by its 32-bit portable payload.
    fn serialize_into<'a>(bitmap: &Bitmap64, dst: &'a mut Vec<u8>) -> &'a [u8] {
        let len = <Self as Serializer>::get_serialized_size_in_bytes(bitmap);
        let mut scratch = Vec::new();
        append_with(dst, len, |w| write_portable(bitmap, w, &mut scratch))
    }

    fn get_serialized_size_in_bytes(bitmap: &Bitmap64) -> usize {
        bitmap.inner().values().fold(8, |sum, inner| {
            sum + 4 + inner.get_serialized_size_in_bytes::<Portable>()
        })
    }
}

impl Deserializer for Portable {
    fn try_deserialize(buffer: &[u8]) -> Result<(Bitmap64, usize)> {
        read_portable(buffer).map_err(|err| {
            debug!(%err, len = buffer.len(), "rejected portable bitmap64 payload");
            err
        })
    }
}

impl Bitmap64 {
    /// Serializes a bitmap to a vector of bytes in the format `S`.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::{Bitmap64, Portable};
    ///
    /// let bitmap = Bitmap64::of(&[1, 2, 3, u64::MAX]);
    /// let bytes = bitmap.serialize::<Portable>();
    ///
    /// assert_eq!(bytes.len(), bitmap.get_serialized_size_in_bytes::<Portable>());
    /// assert_eq!(Bitmap64::try_deserialize::<Portable>(&bytes).unwrap(), bitmap);
    /// ```
    pub fn serialize<S: Serializer>(&self) -> Vec<u8> {
        let mut dst = Vec::new();
        self.serialize_into::<S>(&mut dst);
        dst
    }

    /// Serializes a bitmap to the end of `dst` in the format `S`, returning the
    /// bytes written.
    pub fn serialize_into<'a, S: Serializer>(&self, dst: &'a mut Vec<u8>) -> &'a [u8] {
        S::serialize_into(self, dst)
    }

    /// Computes the serialized size in bytes of the bitmap in format `S`.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::{Bitmap64, Portable};
    ///
    /// assert_eq!(Bitmap64::new().get_serialized_size_in_bytes::<Portable>(), 8);
    ///
    /// // count, key, then the 22 byte payload of {1, 2, 3}
    /// let bitmap = Bitmap64::of(&[1, 2, 3]);
    /// assert_eq!(bitmap.get_serialized_size_in_bytes::<Portable>(), 8 + 4 + 22);
    /// ```
    pub fn get_serialized_size_in_bytes<S: Serializer>(&self) -> usize {
        S::get_serialized_size_in_bytes(self)
    }

    /// Given a serialized bitmap as slice of bytes in format `D`, returns a
    /// `Bitmap64` instance. Trailing bytes are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::{Bitmap64, Portable};
    ///
    /// let original: Bitmap64 = (1..5).chain([1 << 40]).collect();
    /// let bytes = original.serialize::<Portable>();
    ///
    /// assert_eq!(Bitmap64::try_deserialize::<Portable>(&bytes).unwrap(), original);
    /// assert!(Bitmap64::try_deserialize::<Portable>(&bytes[..bytes.len() - 1]).is_err());
    /// ```
    pub fn try_deserialize<D: Deserializer>(buffer: &[u8]) -> Result<Self> {
        D::try_deserialize(buffer).map(|(bitmap, _)| bitmap)
    }

    /// Like [`Bitmap64::try_deserialize`], also returning how many bytes of
    /// `buffer` the payload occupied.
    pub fn try_deserialize_prefix<D: Deserializer>(buffer: &[u8]) -> Result<(Self, usize)> {
        D::try_deserialize(buffer)
    }
}

impl From<Bitmap> for Bitmap64 {
    #[inline]
    fn from(bitmap: Bitmap) -> Self {
        Bitmap64::from_bitmap(bitmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn entry(high: u32, inner: &Bitmap) -> Vec<u8> {
        let mut out = high.to_le_bytes().to_vec();
        out.extend(inner.serialize::<Portable>());
        out
    }

    #[test]
    fn nested_layout() {
        let bitmap = Bitmap64::of(&[7, (1 << 32) | 9]);
        let bytes = bitmap.serialize::<Portable>();

        let mut expected = 2u64.to_le_bytes().to_vec();
        expected.extend(entry(0, &Bitmap::of(&[7])));
        expected.extend(entry(1, &Bitmap::of(&[9])));
        assert_eq!(bytes, expected);
    }

    #[test]
    fn rejects_unsorted_and_empty_entries() {
        let mut unsorted = 2u64.to_le_bytes().to_vec();
        unsorted.extend(entry(5, &Bitmap::of(&[1])));
        unsorted.extend(entry(5, &Bitmap::of(&[2])));
        assert!(matches!(
            Bitmap64::try_deserialize::<Portable>(&unsorted),
            Err(Error::Format(FormatError::UnsortedKeys { index: 1 }))
        ));

        let mut empty = 1u64.to_le_bytes().to_vec();
        empty.extend(entry(3, &Bitmap::new()));
        assert!(matches!(
            Bitmap64::try_deserialize::<Portable>(&empty),
            Err(Error::Format(FormatError::EmptyBitmap { key: 3 }))
        ));
    }

    #[test]
    fn huge_count_fails_without_allocating() {
        let bytes = u64::MAX.to_le_bytes();
        assert!(matches!(
            Bitmap64::try_deserialize::<Portable>(&bytes),
            Err(Error::Format(FormatError::Truncated { .. }))
        ));
    }
}
