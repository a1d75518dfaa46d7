//! # lumpio filters
//!
//! Forward-only readers that decompress data pulled from another lumpio
//! reader.
//!
//! ## Supported Formats
//!
//! - **Deflate**: zlib-wrapped or raw (zip) streams, via [`DeflateReader`]
//! - **Bzip2**: self-terminating bzip2 streams, via [`Bzip2Reader`]
//! - **LZMA**: raw LZMA with an externally declared size, via [`LzmaReader`]
//!
//! Each filter borrows its underlying reader, which must outlive it, and
//! buffers compressed input in a fixed
//! [`FILTER_BUFFER_SIZE`](lumpio_core::FILTER_BUFFER_SIZE) buffer. Filters
//! cannot seek and cannot be cloned.
//!
//! ## Example
//!
//! ```rust,ignore
//! use lumpio_core::traits::ReadExt;
//! use lumpio_filter::{DeflateFraming, DeflateReader};
//!
//! let mut filter = DeflateReader::new(&mut source, DeflateFraming::Raw);
//! let magic = filter.read_u32()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
#[cfg(feature = "bzip2")]
pub mod bz2;
#[cfg(feature = "deflate")]
pub mod deflate;
#[cfg(feature = "lzma")]
pub mod lzma;
pub mod reader;

pub use buffer::InputBuffer;
#[cfg(feature = "bzip2")]
pub use bz2::{Bzip2Decoder, Bzip2Reader};
#[cfg(feature = "deflate")]
pub use deflate::{DeflateDecoder, DeflateFraming, DeflateReader};
#[cfg(feature = "lzma")]
pub use lzma::{LzmaDecoder, LzmaHeader, LzmaProperties, LzmaReader};
pub use reader::DecompressReader;

use lumpio_core::error::Result;
use lumpio_core::traits::{ReadExt, StreamReader};

/// Compression applied to a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Deflate data with the given framing.
    #[cfg(feature = "deflate")]
    Deflate(DeflateFraming),
    /// A bzip2 stream.
    #[cfg(feature = "bzip2")]
    Bzip2,
    /// Raw LZMA data of a declared uncompressed size.
    #[cfg(feature = "lzma")]
    Lzma {
        /// Exact number of bytes to decode.
        uncompressed_size: u64,
        /// Header layout in front of the compressed data.
        header: LzmaHeader,
    },
}

impl CompressionMethod {
    /// Short name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match *self {
            #[cfg(feature = "deflate")]
            Self::Deflate(_) => "deflate",
            #[cfg(feature = "bzip2")]
            Self::Bzip2 => "bzip2",
            #[cfg(feature = "lzma")]
            Self::Lzma { .. } => "lzma",
        }
    }
}

/// Decode everything `source` yields under `method` into a new buffer.
pub fn decompress_to_vec<R: StreamReader + ?Sized>(
    source: &mut R,
    method: CompressionMethod,
) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match method {
        #[cfg(feature = "deflate")]
        CompressionMethod::Deflate(framing) => {
            DeflateReader::new(source, framing).read_to_vec(&mut out)?;
        }
        #[cfg(feature = "bzip2")]
        CompressionMethod::Bzip2 => {
            Bzip2Reader::new(source).read_to_vec(&mut out)?;
        }
        #[cfg(feature = "lzma")]
        CompressionMethod::Lzma {
            uncompressed_size,
            header,
        } => {
            out.reserve(usize::try_from(uncompressed_size.min(1 << 24)).unwrap_or(0));
            LzmaReader::new(source, uncompressed_size, header)?.read_to_vec(&mut out)?;
        }
    }
    Ok(out)
}
