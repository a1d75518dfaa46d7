//! Fixed-capacity compressed-input buffer.

use lumpio_core::error::Result;
use lumpio_core::traits::StreamReader;

/// Compressed bytes pulled from the underlying reader, waiting to be decoded.
///
/// `data[pos..len]` holds the bytes not yet consumed by the decoder.
#[derive(Debug)]
pub struct InputBuffer {
    data: Box<[u8]>,
    pos: usize,
    len: usize,
}

impl InputBuffer {
    /// Create an empty buffer of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            pos: 0,
            len: 0,
        }
    }

    /// Bytes waiting to be decoded.
    #[inline]
    pub fn pending(&self) -> &[u8] {
        &self.data[self.pos..self.len]
    }

    /// Mark `n` pending bytes as consumed.
    #[inline]
    pub fn consume(&mut self, n: usize) {
        debug_assert!(self.pos + n <= self.len);
        self.pos = (self.pos + n).min(self.len);
    }

    /// True when no bytes are waiting.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos == self.len
    }

    /// True when the buffer cannot accept more bytes even after compaction.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len - self.pos == self.data.len()
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Move pending bytes to the front and read into the free space.
    ///
    /// Returns `(bytes read, bytes requested)`. Sources may return short
    /// counts; only zero means the source has no more data.
    pub fn refill<R: StreamReader + ?Sized>(&mut self, source: &mut R) -> Result<(usize, usize)> {
        if self.pos > 0 {
            self.data.copy_within(self.pos..self.len, 0);
            self.len -= self.pos;
            self.pos = 0;
        }

        let requested = self.data.len() - self.len;
        let n = source.read(&mut self.data[self.len..])?;
        self.len += n;
        Ok((n, requested))
    }
}
