//! The owning reader handle.
//!
//! A [`LumpReader`] holds at most one concrete reader behind the
//! [`RandomAccessReader`] contract. Consumers open it over a file, a memory
//! block, a sub-range or a compressed stream and then drive it without knowing
//! which one they hold.
//!
//! ```
//! use lumpio::LumpReader;
//! use lumpio_core::traits::{RandomAccessReader, ReadExt};
//!
//! let data = [0x34, 0x12, 0xff];
//! let mut lump = LumpReader::new();
//! lump.open_memory(&data)?;
//! assert_eq!(lump.read_u16()?, 0x1234);
//!
//! let moved = lump.take();
//! assert!(!lump.is_open());
//! assert_eq!(moved.remaining(), 1);
//! # Ok::<(), lumpio_core::LumpioError>(())
//! ```

use crate::file::FileReader;
use crate::memory::{MemoryArrayReader, MemoryReader};
use crate::range::RangeReader;
use log::debug;
use lumpio_core::error::{LumpioError, Result};
use lumpio_core::traits::{RandomAccessReader, StreamReader};
use std::fmt;
use std::io::{self, SeekFrom};
use std::path::Path;

#[cfg(any(feature = "deflate", feature = "bzip2", feature = "lzma"))]
use lumpio_filter::CompressionMethod;

/// Single owner of whichever reader backs it.
///
/// Not `Clone`. Ownership moves with [`take`](Self::take) or a plain Rust
/// move, and the held reader is dropped exactly once, on
/// [`close`](Self::close), when a new reader is opened, or when the handle
/// goes out of scope.
#[derive(Default)]
pub struct LumpReader<'a> {
    reader: Option<Box<dyn RandomAccessReader + 'a>>,
}

impl<'a> LumpReader<'a> {
    /// Create an empty handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle that owns `reader`.
    pub fn from_reader<R: RandomAccessReader + 'a>(reader: R) -> Self {
        Self {
            reader: Some(Box::new(reader)),
        }
    }

    /// Whether a reader is held.
    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    /// Drop the held reader, if any.
    pub fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!("closed lump reader");
        }
    }

    /// Move the held reader into a new handle, leaving this one empty.
    pub fn take(&mut self) -> Self {
        Self {
            reader: self.reader.take(),
        }
    }

    /// Open the file at `path`.
    pub fn open_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.install(|| FileReader::open(path))
    }

    /// Open `length` bytes at `start` of `parent` as a zero-based stream.
    ///
    /// See [`RangeReader`] for how views over the same parent interact.
    pub fn open_file_part<R>(&mut self, parent: &'a mut R, start: u64, length: u64) -> Result<()>
    where
        R: RandomAccessReader + ?Sized + 'a,
    {
        self.install(move || RangeReader::new(parent, start, length))
    }

    /// Read directly from `data` without copying it.
    pub fn open_memory(&mut self, data: &'a [u8]) -> Result<()> {
        self.install(move || Ok(MemoryReader::new(data)))
    }

    /// Read from a private copy of `data`.
    pub fn open_memory_array(&mut self, data: &[u8]) -> Result<()> {
        self.install(|| Ok(MemoryArrayReader::from_slice(data)))
    }

    /// Read from memory produced by `populate`.
    ///
    /// See [`MemoryArrayReader::populate`].
    pub fn open_memory_array_with<F>(&mut self, populate: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<u8>) -> bool,
    {
        self.install(|| MemoryArrayReader::populate(populate))
    }

    /// Decode all of `source` under `method` and read from the result.
    ///
    /// The decoded bytes are held in memory, so the handle supports seeking
    /// even though the filter itself does not.
    #[cfg(any(feature = "deflate", feature = "bzip2", feature = "lzma"))]
    pub fn open_decompressed<R>(&mut self, source: &mut R, method: CompressionMethod) -> Result<()>
    where
        R: StreamReader + ?Sized,
    {
        self.install(move || {
            let data = lumpio_filter::decompress_to_vec(source, method)?;
            debug!("decoded {} bytes of {} data", data.len(), method.name());
            Ok(MemoryArrayReader::from_vec(data))
        })
    }

    /// The held reader.
    ///
    /// # Errors
    ///
    /// [`LumpioError::NotOpen`] if the handle is empty.
    pub fn reader(&mut self) -> Result<&mut (dyn RandomAccessReader + 'a)> {
        self.reader.as_deref_mut().ok_or(LumpioError::NotOpen)
    }

    /// Give up the handle and return the held reader.
    pub fn into_reader(self) -> Option<Box<dyn RandomAccessReader + 'a>> {
        self.reader
    }

    fn install<R, F>(&mut self, open: F) -> Result<()>
    where
        R: RandomAccessReader + 'a,
        F: FnOnce() -> Result<R>,
    {
        self.close();
        self.reader = Some(Box::new(open()?));
        Ok(())
    }

    fn held(&self) -> Result<&(dyn RandomAccessReader + 'a)> {
        self.reader.as_deref().ok_or(LumpioError::NotOpen)
    }
}

impl fmt::Debug for LumpReader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LumpReader")
            .field("open", &self.is_open())
            .finish()
    }
}

impl StreamReader for LumpReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.reader()?.read(buf)
    }
}

impl RandomAccessReader for LumpReader<'_> {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.reader()?.seek(pos)
    }

    fn tell(&self) -> Result<u64> {
        self.held()?.tell()
    }

    fn length(&self) -> u64 {
        self.held().map_or(0, |reader| reader.length())
    }

    fn gets(&mut self, max_len: usize) -> Result<Option<Vec<u8>>> {
        self.reader()?.gets(max_len)
    }
}

impl io::Read for LumpReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(StreamReader::read(self, buf)?)
    }
}

impl io::Seek for LumpReader<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(RandomAccessReader::seek(self, pos)?)
    }
}
