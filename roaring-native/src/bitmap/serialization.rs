use byteorder::{ByteOrder, LittleEndian};
use tracing::debug;

use super::Bitmap;
use crate::container::{
    ArrayStore, BitmapStore, Container, Interval, RunStore, ARRAY_LIMIT, BITMAP_BYTES,
    BITMAP_WORDS,
};
use crate::error::FormatError;
use crate::serialization::{
    append_with, ByteReader, ByteWriter, NO_OFFSET_THRESHOLD, SERIAL_COOKIE,
    SERIAL_COOKIE_NO_RUNCONTAINER,
};
use crate::{Portable, Result};

/// Largest number of containers a 32-bit bitmap can hold.
const MAX_CONTAINERS: u64 = 1 << 16;

/// A format a [`Bitmap`] can be written in.
pub trait Serializer: crate::sealed::Sealed {
    /// Appends the serialized bitmap to `dst`, returning the newly written bytes.
    fn serialize_into<'a>(bitmap: &Bitmap, dst: &'a mut Vec<u8>) -> &'a [u8];
    /// Exact number of bytes [`Serializer::serialize_into`] writes.
    fn get_serialized_size_in_bytes(bitmap: &Bitmap) -> usize;
}

/// A format a [`Bitmap`] can be read from.
pub trait Deserializer: crate::sealed::Sealed {
    /// Decodes a bitmap from the front of `buffer`, returning it with the number of
    /// bytes consumed. Bytes after the payload are left alone.
    fn try_deserialize(buffer: &[u8]) -> Result<(Bitmap, usize)>;
}

fn has_runs(bitmap: &Bitmap) -> bool {
    bitmap.containers().iter().any(Container::is_run)
}

fn header_len(count: usize, has_runs: bool) -> usize {
    if has_runs {
        let offsets = if count >= NO_OFFSET_THRESHOLD { 4 * count } else { 0 };
        4 + (count + 7) / 8 + 4 * count + offsets
    } else {
        8 + 8 * count
    }
}

fn write_portable(bitmap: &Bitmap, w: &mut ByteWriter<'_>) {
    let keys = bitmap.keys();
    let containers = bitmap.containers();
    let count = keys.len();
    let has_runs = has_runs(bitmap);

    if has_runs {
        w.put_u32(u32::from(SERIAL_COOKIE) | (((count - 1) as u32) << 16));
        for flags in containers.chunks(8) {
            let byte = flags
                .iter()
                .enumerate()
                .filter(|(_, c)| c.is_run())
                .fold(0u8, |byte, (bit, _)| byte | (1 << bit));
            w.put_u8(byte);
        }
    } else {
        w.put_u32(SERIAL_COOKIE_NO_RUNCONTAINER);
        w.put_u32(count as u32);
    }

    for (&key, container) in keys.iter().zip(containers) {
        w.put_u16(key);
        w.put_u16((container.len() - 1) as u16);
    }

    if !has_runs || count >= NO_OFFSET_THRESHOLD {
        let mut offset = header_len(count, has_runs);
        for container in containers {
            w.put_u32(offset as u32);
            offset += container.serialized_size();
        }
    }

    for container in containers {
        match container {
            Container::Array(array) => w.put_u16_slice(array.as_slice()),
            Container::Bitmap(bits) => w.put_u64_slice(&bits.words()[..]),
            Container::Run(runs) => {
                w.put_u16(runs.num_runs() as u16);
                for iv in runs.intervals() {
                    w.put_u16(iv.start);
                    w.put_u16(iv.end - iv.start);
                }
            }
        }
    }
}

fn read_array(reader: &mut ByteReader<'_>, cardinality: usize, index: usize) -> Result<Container> {
    let bytes = reader.take(2 * cardinality)?;
    let mut values = Vec::new();
    values.try_reserve_exact(cardinality)?;
    values.resize(cardinality, 0);
    LittleEndian::read_u16_into(bytes, &mut values);
    if !values.windows(2).all(|w| w[0] < w[1]) {
        return Err(FormatError::UnsortedArray { index }.into());
    }
    Ok(Container::Array(ArrayStore::from_vec_unchecked(values)))
}

fn read_bitmap(reader: &mut ByteReader<'_>) -> Result<Container> {
    let bytes = reader.take(BITMAP_BYTES)?;
    let mut words = Box::new([0u64; BITMAP_WORDS]);
    LittleEndian::read_u64_into(bytes, &mut words[..]);
    Ok(Container::Bitmap(BitmapStore::from_words(words)))
}

/// Reads a run container. Adjacent runs are merged; overlapping, unsorted or
/// overflowing runs are rejected. Runs larger than the equivalent array or bitmap
/// are stored in that form instead.
fn read_runs(reader: &mut ByteReader<'_>, index: usize) -> Result<Container> {
    let num_runs = usize::from(reader.read_u16()?);
    if num_runs == 0 {
        return Err(FormatError::EmptyContainer { index }.into());
    }
    let bytes = reader.take(4 * num_runs)?;
    let mut runs: Vec<Interval> = Vec::new();
    runs.try_reserve_exact(num_runs)?;
    for pair in bytes.chunks_exact(4) {
        let start = LittleEndian::read_u16(&pair[..2]);
        let end = u32::from(start) + u32::from(LittleEndian::read_u16(&pair[2..]));
        let end = u16::try_from(end).map_err(|_| FormatError::InvalidRuns { index })?;
        match runs.last_mut() {
            Some(last) if start <= last.end => {
                return Err(FormatError::InvalidRuns { index }.into());
            }
            Some(last) if u32::from(last.end) + 1 == u32::from(start) => last.end = end,
            _ => runs.push(Interval::new(start, end)),
        }
    }
    let mut container = Container::Run(RunStore::from_vec_unchecked(runs));
    container.ensure_efficient();
    Ok(container)
}

fn read_portable(buffer: &[u8]) -> Result<(Bitmap, usize)> {
    let mut reader = ByteReader::new(buffer);
    let cookie = reader.read_u32()?;
    let (count, run_flags) = if cookie == SERIAL_COOKIE_NO_RUNCONTAINER {
        let count = u64::from(reader.read_u32()?);
        if count > MAX_CONTAINERS {
            return Err(FormatError::TooManyContainers(count).into());
        }
        (count as usize, None)
    } else if cookie as u16 == SERIAL_COOKIE {
        let count = (cookie >> 16) as usize + 1;
        (count, Some(reader.take((count + 7) / 8)?))
    } else {
        return Err(FormatError::UnknownCookie(cookie).into());
    };

    let header = reader.take(4 * count)?;
    if run_flags.is_none() || count >= NO_OFFSET_THRESHOLD {
        // Bodies are read in order, so the offsets are not needed.
        reader.take(4 * count)?;
    }

    let mut bitmap = Bitmap::new();
    bitmap.keys.try_reserve_exact(count)?;
    bitmap.containers.try_reserve_exact(count)?;
    let mut previous: Option<u16> = None;
    for (index, entry) in header.chunks_exact(4).enumerate() {
        let key = LittleEndian::read_u16(&entry[..2]);
        let declared = u64::from(LittleEndian::read_u16(&entry[2..])) + 1;
        if previous.map_or(false, |prev| key <= prev) {
            return Err(FormatError::UnsortedKeys { index }.into());
        }
        previous = Some(key);

        let is_run = run_flags.map_or(false, |flags| flags[index / 8] & (1 << (index % 8)) != 0);
        let container = if is_run {
            read_runs(&mut reader, index)?
        } else if declared > ARRAY_LIMIT {
            read_bitmap(&mut reader)?
        } else {
            read_array(&mut reader, declared as usize, index)?
        };
        let actual = container.len();
        if actual != declared {
            return Err(FormatError::CardinalityMismatch {
                index,
                declared,
                actual,
            }
            .into());
        }
        bitmap.push_unchecked(key, container);
    }
    Ok((bitmap, reader.position()))
}

impl Serializer for Portable {
    /// Serializes a bitmap to a slice of bytes in portable format.
    /// See [`Bitmap::serialize_into`] for examples.
    fn serialize_into<'a>(bitmap: &Bitmap, dst: &'a mut Vec<u8>) -> &'a [u8] {
        let len = Self::get_serialized_size_in_bytes(bitmap);
        append_with(dst, len, |w| write_portable(bitmap, w))
    }

    /// Computes the serialized size in bytes of the Bitmap in portable format.
    /// See [`Bitmap::get_serialized_size_in_bytes`] for examples.
    fn get_serialized_size_in_bytes(bitmap: &Bitmap) -> usize {
        let bodies: usize = bitmap
            .containers()
            .iter()
            .map(Container::serialized_size)
            .sum();
        header_len(bitmap.keys().len(), has_runs(bitmap)) + bodies
    }
}

impl Deserializer for Portable {
    /// Given a serialized bitmap as slice of bytes in portable format, returns a `Bitmap` instance.
    /// See [`Bitmap::try_deserialize`] for examples.
    fn try_deserialize(buffer: &[u8]) -> Result<(Bitmap, usize)> {
        read_portable(buffer).map_err(|err| {
            debug!(%err, len = buffer.len(), "rejected portable bitmap payload");
            err
        })
    }
}

impl Bitmap {
    /// Serializes a bitmap to a vector of bytes in the format `S`.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::{Bitmap, Portable};
    ///
    /// let bitmap = Bitmap::of(&[1, 2, 3]);
    /// let bytes = bitmap.serialize::<Portable>();
    ///
    /// assert_eq!(
    ///     bytes,
    ///     [0x3a, 0x30, 0, 0, 1, 0, 0, 0, 0, 0, 2, 0, 0x10, 0, 0, 0, 1, 0, 2, 0, 3, 0]
    /// );
    /// ```
    pub fn serialize<S: Serializer>(&self) -> Vec<u8> {
        let mut dst = Vec::new();
        self.serialize_into::<S>(&mut dst);
        dst
    }

    /// Serializes a bitmap to the end of `dst` in the format `S`.
    ///
    /// Returns the bytes written, which are the tail of `dst`.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::{Bitmap, Portable};
    ///
    /// let bitmap: Bitmap = (1..5).collect();
    /// let mut buf = vec![0xff];
    /// let written = bitmap.serialize_into::<Portable>(&mut buf).len();
    ///
    /// assert_eq!(written, bitmap.get_serialized_size_in_bytes::<Portable>());
    /// assert_eq!(buf.len(), 1 + written);
    /// assert_eq!(Bitmap::try_deserialize::<Portable>(&buf[1..]).unwrap(), bitmap);
    /// ```
    pub fn serialize_into<'a, S: Serializer>(&self, dst: &'a mut Vec<u8>) -> &'a [u8] {
        S::serialize_into(self, dst)
    }

    /// Computes the serialized size in bytes of the Bitmap in format `S`.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::{Bitmap, Portable};
    ///
    /// let mut bitmap: Bitmap = (1..5).collect();
    /// assert_eq!(bitmap.get_serialized_size_in_bytes::<Portable>(), 24);
    ///
    /// bitmap.run_optimize();
    /// assert_eq!(bitmap.get_serialized_size_in_bytes::<Portable>(), 15);
    ///
    /// assert_eq!(Bitmap::new().get_serialized_size_in_bytes::<Portable>(), 8);
    /// ```
    pub fn get_serialized_size_in_bytes<S: Serializer>(&self) -> usize {
        S::get_serialized_size_in_bytes(self)
    }

    /// Given a serialized bitmap as slice of bytes in format `D`, returns a `Bitmap` instance.
    ///
    /// Trailing bytes after the payload are ignored. On error nothing is returned, so a
    /// bitmap being replaced keeps its contents.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::{Bitmap, Portable};
    ///
    /// let original_bitmap: Bitmap = (1..5).collect();
    /// let serialized_buffer = original_bitmap.serialize::<Portable>();
    /// let deserialized_bitmap = Bitmap::try_deserialize::<Portable>(&serialized_buffer).unwrap();
    ///
    /// assert_eq!(original_bitmap, deserialized_bitmap);
    ///
    /// assert!(Bitmap::try_deserialize::<Portable>(&[0, 1, 2, 3]).is_err());
    /// ```
    pub fn try_deserialize<D: Deserializer>(buffer: &[u8]) -> Result<Self> {
        D::try_deserialize(buffer).map(|(bitmap, _)| bitmap)
    }

    /// Like [`Bitmap::try_deserialize`], also returning how many bytes of `buffer`
    /// the payload occupied. Use it to walk payloads stored back to back.
    ///
    /// # Examples
    ///
    /// ```
    /// use roaring_native::{Bitmap, Portable};
    ///
    /// let first = Bitmap::of(&[1, 2]);
    /// let second = Bitmap::of(&[100_000]);
    /// let mut buf = first.serialize::<Portable>();
    /// second.serialize_into::<Portable>(&mut buf);
    ///
    /// let (decoded, used) = Bitmap::try_deserialize_prefix::<Portable>(&buf).unwrap();
    /// assert_eq!(decoded, first);
    /// let (decoded, _) = Bitmap::try_deserialize_prefix::<Portable>(&buf[used..]).unwrap();
    /// assert_eq!(decoded, second);
    /// ```
    pub fn try_deserialize_prefix<D: Deserializer>(buffer: &[u8]) -> Result<(Self, usize)> {
        D::try_deserialize(buffer)
    }
}
