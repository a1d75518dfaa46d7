//! # lumpio
//!
//! Readers, writers and an owning reader handle for game archive data.
//!
//! Every reader implements the [`RandomAccessReader`] contract from
//! `lumpio-core`, so archive code can consume a lump the same way whether it
//! lives in a file, in memory, inside a larger container or behind a
//! compression filter.
//!
//! ## Readers
//!
//! - [`FileReader`]: a `(start, length)` window of an OS file
//! - [`MemoryReader`]: borrowed bytes
//! - [`MemoryArrayReader`]: owned bytes, copied or populated on demand
//! - [`RangeReader`]: a zero-based view of part of another reader
//!
//! Decompression filters live in [`lumpio_filter`] and are re-exported as
//! [`filter`].
//!
//! ## Writers
//!
//! - [`FileWriter`]: passthrough to an OS file
//! - [`BufferWriter`]: growable in-memory buffer with header patch-up
//!
//! ## Example
//!
//! ```rust
//! use lumpio::prelude::*;
//!
//! let mut out = BufferWriter::new();
//! out.write_all(b"IWAD")?;
//! out.write_u32(0)?;
//! out.seek(std::io::SeekFrom::Start(4))?;
//! out.write_u32(12)?;
//!
//! let bytes = out.into_inner();
//! let mut lump = LumpReader::new();
//! lump.open_memory(&bytes)?;
//! lump.seek(std::io::SeekFrom::Start(4))?;
//! assert_eq!(lump.read_u32()?, 12);
//! # Ok::<(), LumpioError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod file;
pub mod handle;
pub mod memory;
pub mod range;
pub mod writer;

pub use file::FileReader;
pub use handle::LumpReader;
pub use memory::{MemoryArrayReader, MemoryReader};
pub use range::RangeReader;
pub use writer::{BufferWriter, FileWriter};

pub use lumpio_core::{
    FILTER_BUFFER_SIZE, GETS_MAX_LINE, LumpioError, RandomAccessReader, ReadExt, Result,
    StreamReader, StreamWriter, WriteExt,
};
pub use lumpio_filter as filter;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        BufferWriter, FileReader, FileWriter, LumpReader, MemoryArrayReader, MemoryReader,
        RangeReader,
    };
    pub use lumpio_core::prelude::*;
}
