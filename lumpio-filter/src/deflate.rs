//! Deflate and zlib decompression filter.

use crate::reader::DecompressReader;
use flate2::{Decompress, FlushDecompress, Status};
use lumpio_core::error::{LumpioError, Result};
use lumpio_core::traits::{DecompressStatus, Decompressor, StreamReader};

/// Framing of a deflate stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeflateFraming {
    /// RFC 1950 zlib header and Adler-32 trailer.
    #[default]
    Zlib,
    /// Bare RFC 1951 deflate data, as stored in zip entries.
    Raw,
}

/// Streaming deflate decoder engine.
pub struct DeflateDecoder {
    inner: Decompress,
    finished: bool,
}

impl DeflateDecoder {
    /// Create a decoder for the given framing.
    pub fn new(framing: DeflateFraming) -> Self {
        Self {
            inner: Decompress::new(framing == DeflateFraming::Zlib),
            finished: false,
        }
    }
}

impl Decompressor for DeflateDecoder {
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
            .decompress(input, output, FlushDecompress::Sync)
            .map_err(|err| LumpioError::corrupted(self.method(), err.to_string()))?;
        let consumed = (self.inner.total_in() - before_in) as usize;
        let produced = (self.inner.total_out() - before_out) as usize;

        let status = match status {
            Status::StreamEnd => {
                self.finished = true;
                DecompressStatus::Done
            }
            Status::Ok | Status::BufError if produced == output.len() => {
                DecompressStatus::NeedsOutput
            }
            Status::Ok | Status::BufError => DecompressStatus::NeedsInput,
        };
        Ok((consumed, produced, status))
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn method(&self) -> &'static str {
        "deflate"
    }
}

/// A filter decoding a deflate or zlib stream from an underlying reader.
pub type DeflateReader<'a, R> = DecompressReader<'a, R, DeflateDecoder>;

impl<'a, R: StreamReader + ?Sized> DecompressReader<'a, R, DeflateDecoder> {
    /// Decode `source` as a deflate stream with the given framing.
    pub fn new(source: &'a mut R, framing: DeflateFraming) -> Self {
        Self::with_decoder(source, DeflateDecoder::new(framing))
    }
}
