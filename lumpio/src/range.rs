//! Sub-range view of another reader.

use lumpio_core::error::{LumpioError, Result};
use lumpio_core::traits::{RandomAccessReader, StreamReader, resolve_seek};
use std::io::SeekFrom;

/// Presents `[start, start + length)` of a parent reader as a zero-based
/// stream.
///
/// The view borrows the parent exclusively for its lifetime and moves the
/// parent's position as it reads. Views taken one after another over the same
/// parent share that position: each view repositions the parent when it is
/// created, and [`tell`](RandomAccessReader::tell) reports
/// [`LumpioError::PositionOutOfRange`] if the parent was moved outside the
/// window in between.
///
/// Seeking accepts targets in `[0, length)`; the window end itself is not a
/// valid seek target.
#[derive(Debug)]
pub struct RangeReader<'a, R: ?Sized> {
    parent: &'a mut R,
    start: u64,
    length: u64,
}

impl<'a, R: RandomAccessReader + ?Sized> RangeReader<'a, R> {
    /// Create a view of `length` bytes at `start` in `parent`.
    ///
    /// # Errors
    ///
    /// [`LumpioError::InvalidRange`] if the window does not fit in the parent.
    pub fn new(parent: &'a mut R, start: u64, length: u64) -> Result<Self> {
        let parent_length = parent.length();
        if start.checked_add(length).is_none_or(|end| end > parent_length) {
            return Err(LumpioError::invalid_range(start, length, parent_length));
        }

        parent.seek(SeekFrom::Start(start))?;
        Ok(Self {
            parent,
            start,
            length,
        })
    }

    /// Offset of the window in the parent.
    pub fn start(&self) -> u64 {
        self.start
    }

    fn end(&self) -> u64 {
        self.start + self.length
    }

    fn parent_position(&self) -> Result<u64> {
        let position = self.parent.tell()?;
        if position < self.start || position > self.end() {
            return Err(LumpioError::PositionOutOfRange {
                position,
                start: self.start,
                end: self.end(),
            });
        }
        Ok(position)
    }
}

impl<R: RandomAccessReader + ?Sized> StreamReader for RangeReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let left = self.end() - self.parent_position()?;
        let want = usize::try_from(left).map_or(buf.len(), |left| left.min(buf.len()));
        if want == 0 {
            return Ok(0);
        }
        self.parent.read(&mut buf[..want])
    }
}

impl<R: RandomAccessReader + ?Sized> RandomAccessReader for RangeReader<'_, R> {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let current = match pos {
            SeekFrom::Current(_) => self.tell()?,
            _ => 0,
        };
        let target = resolve_seek(pos, current, self.length)?;
        if target >= self.length {
            return Err(LumpioError::seek_out_of_range(target as i64, self.length));
        }

        self.parent.seek(SeekFrom::Start(self.start + target))?;
        Ok(target)
    }

    fn tell(&self) -> Result<u64> {
        Ok(self.parent_position()? - self.start)
    }

    fn length(&self) -> u64 {
        self.length
    }
}
