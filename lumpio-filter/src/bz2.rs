//! Bzip2 decompression filter.
//!
//! Bzip2 streams are self-terminating, so no size needs to be declared.

use crate::reader::DecompressReader;
use ::bzip2::{Decompress, Status};
use lumpio_core::error::{LumpioError, Result};
use lumpio_core::traits::{DecompressStatus, Decompressor, StreamReader};

/// Streaming bzip2 decoder engine.
pub struct Bzip2Decoder {
    inner: Decompress,
    finished: bool,
}

impl Bzip2Decoder {
    /// Create a decoder using the fast (large memory) algorithm.
    pub fn new() -> Self {
        Self {
            inner: Decompress::new(false),
            finished: false,
        }
    }
}

impl Default for Bzip2Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for Bzip2Decoder {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)> {
        if self.finished {
            return Ok((0, 0, DecompressStatus::Done));
        }

        let before_in = self.inner.total_in();
        let before_out = self.inner.total_out();
        let status = self
            .inner
            .decompress(input, output)
            .map_err(|err| LumpioError::corrupted("bzip2", err.to_string()))?;
        let consumed = (self.inner.total_in() - before_in) as usize;
        let produced = (self.inner.total_out() - before_out) as usize;

        let status = match status {
            Status::StreamEnd => {
                self.finished = true;
                DecompressStatus::Done
            }
            _ if produced == output.len() => DecompressStatus::NeedsOutput,
            _ => DecompressStatus::NeedsInput,
        };
        Ok((consumed, produced, status))
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn method(&self) -> &'static str {
        "bzip2"
    }
}

/// A filter decoding a bzip2 stream from an underlying reader.
pub type Bzip2Reader<'a, R> = DecompressReader<'a, R, Bzip2Decoder>;

impl<'a, R: StreamReader + ?Sized> DecompressReader<'a, R, Bzip2Decoder> {
    /// Decode `source` as a bzip2 stream.
    pub fn new(source: &'a mut R) -> Self {
        Self::with_decoder(source, Bzip2Decoder::new())
    }
}
