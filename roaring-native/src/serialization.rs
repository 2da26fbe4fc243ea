use byteorder::{ByteOrder, LittleEndian};

use crate::error::FormatError;

/// The `Portable` format is meant to be compatible with other roaring bitmap libraries, such as Go or Java.
///
/// Every integer is little-endian, whatever the host.
///
/// It's defined here: <https://github.com/RoaringBitmap/RoaringFormatSpec>
pub enum Portable {}

impl crate::sealed::Sealed for Portable {}

/// Cookie of a payload without run containers; a `u32` container count follows.
pub(crate) const SERIAL_COOKIE_NO_RUNCONTAINER: u32 = 12346;
/// Low half of the cookie of a payload with run containers; the high half holds
/// the container count minus one.
pub(crate) const SERIAL_COOKIE: u16 = 12347;
/// Payloads with run containers omit the offset header below this many containers.
pub(crate) const NO_OFFSET_THRESHOLD: usize = 4;

/// Forward-only reader over a payload, failing with [`FormatError::Truncated`].
pub(crate) struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        ByteReader { buf, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Everything not read yet.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        let remaining = self.buf.len() - self.pos;
        if len > remaining {
            return Err(FormatError::Truncated {
                needed: len,
                remaining,
            });
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_u16(&mut self) -> Result<u16, FormatError> {
        self.take(2).map(LittleEndian::read_u16)
    }

    pub fn read_u32(&mut self) -> Result<u32, FormatError> {
        self.take(4).map(LittleEndian::read_u32)
    }

    pub fn read_u64(&mut self) -> Result<u64, FormatError> {
        self.take(8).map(LittleEndian::read_u64)
    }
}

/// Writer over a pre-sized output slice. Callers size the slice from the exact
/// serialized length, so running past its end is a bug.
pub(crate) struct ByteWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        ByteWriter { buf, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    fn advance(&mut self, len: usize) -> &mut [u8] {
        let start = self.pos;
        self.pos += len;
        &mut self.buf[start..self.pos]
    }

    pub fn put_u8(&mut self, value: u8) {
        self.advance(1)[0] = value;
    }

    pub fn put_u16(&mut self, value: u16) {
        LittleEndian::write_u16(self.advance(2), value);
    }

    pub fn put_u32(&mut self, value: u32) {
        LittleEndian::write_u32(self.advance(4), value);
    }

    pub fn put_u64(&mut self, value: u64) {
        LittleEndian::write_u64(self.advance(8), value);
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.advance(bytes.len()).copy_from_slice(bytes);
    }

    pub fn put_u16_slice(&mut self, values: &[u16]) {
        LittleEndian::write_u16_into(values, self.advance(values.len() * 2));
    }

    pub fn put_u64_slice(&mut self, values: &[u64]) {
        LittleEndian::write_u64_into(values, self.advance(values.len() * 8));
    }
}

/// Appends `len` bytes to `dst`, fills them with `write`, and returns the new bytes.
pub(crate) fn append_with<'a>(
    dst: &'a mut Vec<u8>,
    len: usize,
    write: impl FnOnce(&mut ByteWriter<'_>),
) -> &'a [u8] {
    let start = dst.len();
    dst.resize(start + len, 0);
    let mut writer = ByteWriter::new(&mut dst[start..]);
    write(&mut writer);
    debug_assert_eq!(writer.position(), len);
    &dst[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_reports_truncation() {
        let bytes = [0x3a, 0x30, 0x00, 0x00, 0x01];
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(reader.read_u32(), Ok(SERIAL_COOKIE_NO_RUNCONTAINER));
        assert_eq!(
            reader.read_u32(),
            Err(FormatError::Truncated {
                needed: 4,
                remaining: 1
            })
        );
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn writer_is_little_endian() {
        let mut out = vec![0xff];
        let written = append_with(&mut out, 7, |w| {
            w.put_u8(1);
            w.put_u16(0x0302);
            w.put_u32(0x0706_0504);
        });
        assert_eq!(written, [1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(out.len(), 8);
    }
}
