//! Memory-backed readers.
//!
//! - [`MemoryReader`]: a zero-copy view over caller-owned bytes
//! - [`MemoryArrayReader`]: owns its bytes, copied in or produced by a
//!   population routine
//!
//! Both follow the same bounds rules as a file-backed reader.

use lumpio_core::error::{LumpioError, Result};
use lumpio_core::traits::{RandomAccessReader, StreamReader, resolve_seek, scan_line};
use std::io::SeekFrom;

fn read_at(data: &[u8], position: &mut usize, buf: &mut [u8]) -> usize {
    let n = buf.len().min(data.len() - *position);
    buf[..n].copy_from_slice(&data[*position..*position + n]);
    *position += n;
    n
}

fn gets_at(data: &[u8], position: &mut usize, max_len: usize) -> Option<Vec<u8>> {
    if max_len <= 1 || *position >= data.len() {
        return None;
    }

    let mut budget = max_len - 1;
    let mut line = Vec::new();
    let (used, _) = scan_line(&data[*position..], &mut line, &mut budget);
    *position += used;
    (!line.is_empty()).then_some(line)
}

/// A reader over borrowed memory.
///
/// The borrow ties the reader to the caller's buffer, which therefore always
/// outlives it.
#[derive(Debug, Clone)]
pub struct MemoryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> MemoryReader<'a> {
    /// Create a reader over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// The whole underlying buffer.
    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    /// The unread part of the buffer.
    pub fn remaining_slice(&self) -> &'a [u8] {
        &self.data[self.position..]
    }
}

impl StreamReader for MemoryReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(read_at(self.data, &mut self.position, buf))
    }
}

impl RandomAccessReader for MemoryReader<'_> {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let target = resolve_seek(pos, self.position as u64, self.data.len() as u64)?;
        self.position = target as usize;
        Ok(target)
    }

    fn tell(&self) -> Result<u64> {
        Ok(self.position as u64)
    }

    fn length(&self) -> u64 {
        self.data.len() as u64
    }

    fn gets(&mut self, max_len: usize) -> Result<Option<Vec<u8>>> {
        Ok(gets_at(self.data, &mut self.position, max_len))
    }
}

/// A reader over memory it owns.
#[derive(Debug, Clone, Default)]
pub struct MemoryArrayReader {
    data: Vec<u8>,
    position: usize,
}

impl MemoryArrayReader {
    /// Create a reader over a copy of `data`.
    pub fn from_slice(data: &[u8]) -> Self {
        Self::from_vec(data.to_vec())
    }

    /// Create a reader that takes ownership of `data`.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data, position: 0 }
    }

    /// Create a reader whose contents are produced by `populate`.
    ///
    /// The routine fills the vector it is given and returns whether it
    /// succeeded. The stream length is the vector's final size.
    ///
    /// # Errors
    ///
    /// [`LumpioError::PopulateFailed`] if the routine returns `false`.
    pub fn populate<F>(populate: F) -> Result<Self>
    where
        F: FnOnce(&mut Vec<u8>) -> bool,
    {
        let mut data = Vec::new();
        if !populate(&mut data) {
            return Err(LumpioError::PopulateFailed);
        }
        Ok(Self::from_vec(data))
    }

    /// The owned bytes.
    pub fn array(&self) -> &[u8] {
        &self.data
    }

    /// Give up the reader and return its bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl StreamReader for MemoryArrayReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(read_at(&self.data, &mut self.position, buf))
    }
}

impl RandomAccessReader for MemoryArrayReader {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let target = resolve_seek(pos, self.position as u64, self.data.len() as u64)?;
        self.position = target as usize;
        Ok(target)
    }

    fn tell(&self) -> Result<u64> {
        Ok(self.position as u64)
    }

    fn length(&self) -> u64 {
        self.data.len() as u64
    }

    fn gets(&mut self, max_len: usize) -> Result<Option<Vec<u8>>> {
        Ok(gets_at(&self.data, &mut self.position, max_len))
    }
}
