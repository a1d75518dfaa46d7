//! Raw LZMA decompression filter.
//!
//! Raw LZMA data carries no reliable end marker and no size, so the caller
//! must declare the exact uncompressed size. The filter stops after that many
//! bytes regardless of what the decoder would still produce, and reports a
//! decode fault if the stream runs out first.
//!
//! The stream is preceded by five property bytes: one byte packing the
//! `lc`/`lp`/`pb` literal and position parameters, then the dictionary size
//! as a little-endian `u32`. Zip entries put a four-byte header in front of
//! those: a two-byte encoder version and the property size as a
//! little-endian `u16`, which must be 5.

use crate::reader::DecompressReader;
use lumpio_core::endian::{le_u16, le_u32};
use lumpio_core::error::{LumpioError, Result};
use lumpio_core::traits::{DecompressStatus, Decompressor, ReadExt, StreamReader};
use xz2::stream::{Action, Status, Stream};

/// Size of the LZMA property block.
pub const LZMA_PROPS_SIZE: usize = 5;

/// Size of the zip LZMA header preceding the properties.
pub const ZIP_LZMA_HEADER_SIZE: usize = 4;

/// Header layout in front of the raw LZMA data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LzmaHeader {
    /// Zip method 14: version, property size, then properties.
    #[default]
    Zip,
    /// Property bytes only.
    Bare,
}

/// Decoded LZMA properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzmaProperties {
    /// Literal context bits.
    pub lc: u8,
    /// Literal position bits.
    pub lp: u8,
    /// Position bits.
    pub pb: u8,
    /// Dictionary size in bytes.
    pub dict_size: u32,
}

impl LzmaProperties {
    /// Parse the five property bytes.
    pub fn parse(bytes: &[u8; LZMA_PROPS_SIZE]) -> Result<Self> {
        let packed = bytes[0];
        if packed >= 9 * 5 * 5 {
            return Err(LumpioError::invalid_header(format!(
                "LZMA properties byte {packed:#04x} out of range"
            )));
        }

        Ok(Self {
            lc: packed % 9,
            lp: (packed / 9) % 5,
            pb: packed / 45,
            dict_size: le_u32(&bytes[1..]),
        })
    }

    /// Pack back into the five-byte wire form.
    pub fn to_bytes(&self) -> [u8; LZMA_PROPS_SIZE] {
        let mut out = [0u8; LZMA_PROPS_SIZE];
        out[0] = (self.pb * 5 + self.lp) * 9 + self.lc;
        out[1..].copy_from_slice(&self.dict_size.to_le_bytes());
        out
    }
}

/// Size of the `.lzma` container header: properties then a 64-bit size.
const ALONE_HEADER_SIZE: usize = LZMA_PROPS_SIZE + 8;

/// Build a `.lzma` header for `props` with the size marked unknown.
///
/// liblzma has no entry point for raw LZMA1 with external properties, so the
/// decoder is a `.lzma` decoder primed with this header. With the size unknown
/// it decodes until it runs out of input or meets an end marker.
pub fn alone_header(props: &LzmaProperties) -> [u8; ALONE_HEADER_SIZE] {
    let mut header = [0xFF; ALONE_HEADER_SIZE];
    header[..LZMA_PROPS_SIZE].copy_from_slice(&props.to_bytes());
    header
}

/// Streaming raw LZMA1 decoder engine.
pub struct LzmaDecoder {
    inner: Stream,
    header: [u8; ALONE_HEADER_SIZE],
    header_fed: usize,
    finished: bool,
}

impl LzmaDecoder {
    /// Create a raw decoder for the given properties.
    pub fn new(props: &LzmaProperties) -> Result<Self> {
        let inner = Stream::new_lzma_decoder(u64::MAX).map_err(|err| {
            LumpioError::invalid_header(format!("LZMA decoder setup failed: {err}"))
        })?;

        Ok(Self {
            inner,
            header: alone_header(props),
            header_fed: 0,
            finished: false,
        })
    }

    fn feed_header(&mut self, output: &mut [u8]) -> Result<()> {
        while self.header_fed < ALONE_HEADER_SIZE {
            let before = self.inner.total_in();
            self.inner
                .process(&self.header[self.header_fed..], output, Action::Run)
                .map_err(|err| LumpioError::corrupted("lzma", err.to_string()))?;
            let taken = (self.inner.total_in() - before) as usize;
            if taken == 0 {
                return Err(LumpioError::corrupted("lzma", "decoder rejected the property header"));
            }
            self.header_fed += taken;
        }
        Ok(())
    }
}

impl Decompressor for LzmaDecoder {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)> {
        if self.finished {
            return Ok((0, 0, DecompressStatus::Done));
        }
        self.feed_header(output)?;

        let before_in = self.inner.total_in();
        let before_out = self.inner.total_out();
        let status = self
            .inner
            .process(input, output, Action::Run)
            .map_err(|err| LumpioError::corrupted("lzma", err.to_string()))?;
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
        "lzma"
    }
}

/// A filter decoding raw LZMA data of a declared size.
pub type LzmaReader<'a, R> = DecompressReader<'a, R, LzmaDecoder>;

impl<'a, R: StreamReader + ?Sized> DecompressReader<'a, R, LzmaDecoder> {
    /// Read the property header from `source` and decode exactly
    /// `uncompressed_size` bytes after it.
    pub fn new(source: &'a mut R, uncompressed_size: u64, header: LzmaHeader) -> Result<Self> {
        let truncated = |_| LumpioError::invalid_header("LZMA header truncated");

        if header == LzmaHeader::Zip {
            let mut zip = [0u8; ZIP_LZMA_HEADER_SIZE];
            source.read_exact(&mut zip).map_err(truncated)?;
            let props_size = usize::from(le_u16(&zip[2..]));
            if props_size != LZMA_PROPS_SIZE {
                return Err(LumpioError::invalid_header(format!(
                    "LZMA props size is {props_size} (expected {LZMA_PROPS_SIZE})"
                )));
            }
        }

        let mut raw = [0u8; LZMA_PROPS_SIZE];
        source.read_exact(&mut raw).map_err(truncated)?;
        let props = LzmaProperties::parse(&raw)?;
        let decoder = LzmaDecoder::new(&props)?;

        Ok(Self::with_decoder(source, decoder).with_declared_size(uncompressed_size))
    }
}
