//! # Bounds-Checked Byte Reader
//!
//! Firmware hands us a pointer and a length it claims to be correct. Every
//! field access goes through [`ByteReader`], which turns an out-of-range read
//! into [`ParseError::OutOfBounds`] instead of touching memory past the end.
//! Reads are unaligned and little-endian.

use crate::ParseError;

#[derive(Copy, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
}

impl<'a> ByteReader<'a> {
    #[inline]
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// # Errors
    /// [`ParseError::OutOfBounds`] if `off + 4` exceeds the buffer.
    #[inline]
    pub fn read_u32(&self, off: usize) -> Result<u32, ParseError> {
        self.array::<4>(off).map(u32::from_le_bytes)
    }

    /// # Errors
    /// [`ParseError::OutOfBounds`] if `off + 8` exceeds the buffer.
    #[inline]
    pub fn read_u64(&self, off: usize) -> Result<u64, ParseError> {
        self.array::<8>(off).map(u64::from_le_bytes)
    }

    /// A reader over `[off, off + len)` of this one.
    ///
    /// # Errors
    /// [`ParseError::OutOfBounds`] if the window does not fit.
    pub fn sub(&self, off: usize, len: usize) -> Result<Self, ParseError> {
        let oob = ParseError::OutOfBounds { offset: off, len };
        let end = off.checked_add(len).ok_or(oob)?;
        let buf = self.buf.get(off..end).ok_or(oob)?;
        Ok(Self { buf })
    }

    fn array<const N: usize>(&self, off: usize) -> Result<[u8; N], ParseError> {
        let oob = ParseError::OutOfBounds { offset: off, len: N };
        let end = off.checked_add(N).ok_or(oob)?;
        let s = self.buf.get(off..end).ok_or(oob)?;
        let mut out = [0u8; N];
        out.copy_from_slice(s);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian() {
        let bytes = [0x78, 0x56, 0x34, 0x12, 0xEF, 0xCD, 0xAB, 0x90, 0x01, 0x02, 0x03, 0x04];
        let r = ByteReader::new(&bytes);
        assert_eq!(r.read_u32(0), Ok(0x1234_5678));
        assert_eq!(r.read_u64(4), Ok(0x0403_0201_90AB_CDEF));
    }

    #[test]
    fn unaligned_offsets_are_fine() {
        let bytes = [0u8, 1, 0, 0, 0];
        assert_eq!(ByteReader::new(&bytes).read_u32(1), Ok(1));
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let bytes = [0u8; 6];
        let r = ByteReader::new(&bytes);
        assert_eq!(
            r.read_u32(4),
            Err(ParseError::OutOfBounds { offset: 4, len: 4 })
        );
        assert!(r.read_u64(0).is_err());
        assert!(r.read_u32(usize::MAX - 1).is_err());
    }

    #[test]
    fn sub_windows_restrict_reads() {
        let bytes = [1u8, 0, 0, 0, 2, 0, 0, 0];
        let r = ByteReader::new(&bytes);
        let w = r.sub(4, 4).expect("window fits");
        assert_eq!(w.len(), 4);
        assert_eq!(w.read_u32(0), Ok(2));
        assert!(w.read_u32(1).is_err());
        assert!(r.sub(6, 4).is_err());
        assert!(r.sub(usize::MAX, 2).is_err());
    }
}
