//! Append-only serialization targets
//!
//! [`Target`] abstracts the buffer the encoder writes into, in the manner
//! of [`std::io::Write`] but with infallible, total push operations: every
//! method returns the number of bytes it appended, and none of them can
//! fail or partially succeed. Encoding into a `Vec<u8>` and counting the
//! encoded size without allocating (via [`ByteCounter`]) share one code
//! path this way.

/// Byte-oriented buffer with infallible append operations
pub trait Target {
    /// Returns a fresh, empty target.
    fn create() -> Self;

    /// Reserves room for `extra` upcoming bytes, where doing so is
    /// meaningful for the underlying buffer.
    fn anticipate(&mut self, extra: usize);

    /// Appends a single byte; always returns 1.
    fn push_one(&mut self, byte: u8) -> usize;

    /// Appends a known-length byte array; always returns `N`.
    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize;

    /// Appends an arbitrary byte slice; always returns the slice length.
    fn push_all(&mut self, buf: &[u8]) -> usize;
}

impl Target for Vec<u8> {
    #[inline]
    fn create() -> Self {
        Vec::new()
    }

    #[inline]
    fn anticipate(&mut self, extra: usize) {
        self.reserve(extra);
    }

    #[inline]
    fn push_one(&mut self, byte: u8) -> usize {
        self.push(byte);
        1
    }

    #[inline]
    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize {
        self.extend_from_slice(&arr);
        N
    }

    #[inline]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.extend_from_slice(buf);
        buf.len()
    }
}

/// Zero-allocation target that only counts the bytes it is handed
///
/// Alias for [`std::io::Sink`], which discards everything written to it;
/// encoding into a `ByteCounter` computes the serialized size of a value
/// without touching memory.
pub type ByteCounter = std::io::Sink;

impl Target for ByteCounter {
    #[inline]
    fn create() -> Self {
        std::io::sink()
    }

    #[inline(always)]
    fn anticipate(&mut self, _: usize) {}

    #[inline(always)]
    fn push_one(&mut self, _: u8) -> usize {
        1
    }

    #[inline(always)]
    fn push_many<const N: usize>(&mut self, _: [u8; N]) -> usize {
        N
    }

    #[inline(always)]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        buf.len()
    }
}
