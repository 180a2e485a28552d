//! Bound-checked reading of encoded input
//!
//! [`ByteReader`] is the low-level consumption primitive of the decoder: a
//! cursor over one borrowed buffer whose every operation checks the
//! remaining length before touching the bytes. Length-prefixed reads check
//! the declared length against the remainder *before* handing out a slice,
//! so a corrupt prefix claiming more data than is present is rejected
//! without any allocation.
//!
//! The reader never backtracks and never skips: whatever a decode leaves
//! unconsumed is visible through [`ByteReader::remainder`], which is how
//! the codec enforces exact-consumption rules.

use crate::error::{CodecError, CodecResult};

/// Cursor over one borrowed input buffer
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    /// Constructs a reader positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Number of unconsumed bytes.
    #[inline]
    #[must_use]
    pub fn remainder(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Returns `true` once every byte has been consumed.
    #[inline]
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.offset == self.data.len()
    }

    /// Consumes and returns exactly `count` bytes.
    pub fn take(&mut self, count: usize) -> CodecResult<&'a [u8]> {
        let available = self.remainder();
        if count > available {
            return Err(CodecError::UnexpectedEnd {
                needed: count,
                available,
            });
        }
        let slice = &self.data[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }

    /// Consumes and returns one byte.
    pub fn take_one(&mut self) -> CodecResult<u8> {
        Ok(self.take(1)?[0])
    }

    /// Consumes and returns everything that remains.
    #[must_use]
    pub fn take_all(&mut self) -> &'a [u8] {
        let slice = &self.data[self.offset..];
        self.offset = self.data.len();
        slice
    }

    /// Reads a 4-byte unsigned big-endian length prefix and consumes that
    /// many subsequent bytes.
    ///
    /// The declared length is checked against the remainder before the
    /// payload is touched; an overlong prefix fails with
    /// [`CodecError::LengthPrefixOverrun`].
    pub fn take_length_prefixed(&mut self) -> CodecResult<&'a [u8]> {
        let prefix = self.take(4)?;
        let declared = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
        let available = self.remainder();
        if declared > available {
            return Err(CodecError::LengthPrefixOverrun {
                declared,
                available,
            });
        }
        self.take(declared)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn take_tracks_offset() {
        let mut reader = ByteReader::new(&[1, 2, 3, 4]);
        assert_eq!(reader.take(2).unwrap(), &[1, 2]);
        assert_eq!(reader.remainder(), 2);
        assert_eq!(reader.take_one().unwrap(), 3);
        assert_eq!(reader.take_all(), &[4]);
        assert!(reader.is_exhausted());
    }

    #[test]
    fn take_past_end() {
        let mut reader = ByteReader::new(&[1]);
        assert_eq!(
            reader.take(2),
            Err(CodecError::UnexpectedEnd {
                needed: 2,
                available: 1
            })
        );
        // A failed take consumes nothing.
        assert_eq!(reader.remainder(), 1);
    }

    #[test]
    fn length_prefix_bound_checked() {
        let mut reader = ByteReader::new(&[0, 0, 0, 2, 0xaa, 0xbb, 0xcc]);
        assert_eq!(reader.take_length_prefixed().unwrap(), &[0xaa, 0xbb]);
        assert_eq!(reader.remainder(), 1);

        let mut reader = ByteReader::new(&[0, 0, 0, 9, 0xaa]);
        assert_eq!(
            reader.take_length_prefixed(),
            Err(CodecError::LengthPrefixOverrun {
                declared: 9,
                available: 1
            })
        );
    }
}
