//! Stream contracts shared by every reader, writer and filter.
//!
//! Readers come in two capability sets. [`StreamReader`] is the minimal
//! forward-only contract that the decompression filters implement;
//! [`RandomAccessReader`] adds seek, tell and length for sources that know
//! their extent (files, memory blocks, sub-range views). Typed little-endian
//! extraction is provided once for every reader by [`ReadExt`].

use crate::endian::LittleEndian;
use crate::error::{LumpioError, Result};
use std::fmt;
use std::io::SeekFrom;

/// A forward-only byte stream.
pub trait StreamReader {
    /// Read up to `buf.len()` bytes into `buf`.
    ///
    /// Returns the number of bytes copied. A count smaller than `buf.len()`
    /// means end-of-stream; bytes past the returned count are left untouched.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// A byte stream with a known length and a movable position.
///
/// Positions are logical: they are relative to the stream's own start, not
/// to any enclosing physical file.
pub trait RandomAccessReader: StreamReader {
    /// Move to a new position.
    ///
    /// Targets outside `[0, length]` fail with
    /// [`LumpioError::SeekOutOfRange`] and leave the position unchanged.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64>;

    /// Current logical position.
    fn tell(&self) -> Result<u64>;

    /// Total logical length in bytes.
    fn length(&self) -> u64;

    /// Bytes between the current position and the end of the stream.
    ///
    /// Zero when [`tell`](Self::tell) fails.
    fn remaining(&self) -> u64 {
        self.tell()
            .map_or(0, |pos| self.length().saturating_sub(pos))
    }

    /// Extract one text line of at most `max_len - 1` bytes.
    ///
    /// Stops after a `\n` (kept), at a NUL byte (consumed, not kept) or at
    /// the end of the stream. Carriage returns are dropped. Returns `None`
    /// when nothing could be extracted. A position that cannot be reported
    /// is an error, not an empty line.
    fn gets(&mut self, max_len: usize) -> Result<Option<Vec<u8>>> {
        let left = self.length().saturating_sub(self.tell()?);
        if max_len <= 1 || left == 0 {
            return Ok(None);
        }

        let mut budget = max_len - 1;
        let mut line = Vec::new();
        let mut read_total = 0u64;
        let mut consumed = 0u64;
        let mut chunk = [0u8; 256];

        loop {
            let n = self.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            read_total += n as u64;
            let (used, done) = scan_line(&chunk[..n], &mut line, &mut budget);
            consumed += used as u64;
            if done {
                break;
            }
        }

        // Hand back whatever was read past the terminator.
        let surplus = read_total - consumed;
        if surplus > 0 {
            self.seek(SeekFrom::Current(-(surplus as i64)))?;
        }
        Ok((!line.is_empty()).then_some(line))
    }

    /// Extract one line of text, decoded lossily as UTF-8.
    fn gets_line(&mut self) -> Result<Option<String>> {
        Ok(self
            .gets(crate::GETS_MAX_LINE)?
            .map(|line| String::from_utf8_lossy(&line).into_owned()))
    }
}

/// Scan `data` for the continuation of a text line.
///
/// Appends accepted bytes to `line`, decrementing `budget` for each. Returns
/// the number of bytes of `data` consumed and whether the line is complete.
pub fn scan_line(data: &[u8], line: &mut Vec<u8>, budget: &mut usize) -> (usize, bool) {
    for (i, &byte) in data.iter().enumerate() {
        if *budget == 0 {
            return (i, true);
        }
        match byte {
            0 => return (i + 1, true),
            b'\r' => {}
            b'\n' => {
                line.push(byte);
                *budget -= 1;
                return (i + 1, true);
            }
            _ => {
                line.push(byte);
                *budget -= 1;
            }
        }
    }
    (data.len(), *budget == 0)
}

/// Resolve a [`SeekFrom`] against a stream of `length` bytes.
///
/// Returns the absolute target, or [`LumpioError::SeekOutOfRange`] when it
/// falls outside `[0, length]`.
pub fn resolve_seek(pos: SeekFrom, current: u64, length: u64) -> Result<u64> {
    let target = match pos {
        SeekFrom::Start(offset) => i128::from(offset),
        SeekFrom::Current(delta) => i128::from(current) + i128::from(delta),
        SeekFrom::End(delta) => i128::from(length) + i128::from(delta),
    };

    if target < 0 || target > i128::from(length) {
        let clamped = target.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;
        return Err(LumpioError::seek_out_of_range(clamped, length));
    }
    Ok(target as u64)
}

/// Typed little-endian extraction for any [`StreamReader`].
pub trait ReadExt: StreamReader {
    /// Read until `buf` is full or the stream ends; returns the count read.
    fn read_fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    /// Read exactly `buf.len()` bytes or fail with [`LumpioError::ShortRead`].
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let n = self.read_fill(buf)?;
        if n < buf.len() {
            return Err(LumpioError::short_read(buf.len(), n));
        }
        Ok(())
    }

    /// Read everything up to end-of-stream, appending to `out`.
    fn read_to_vec(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        let mut chunk = [0u8; 8192];
        let mut total = 0;
        loop {
            let n = self.read(&mut chunk)?;
            if n == 0 {
                return Ok(total);
            }
            out.extend_from_slice(&chunk[..n]);
            total += n;
        }
    }

    /// Read one little-endian value of type `T`.
    fn read_le<T: LittleEndian>(&mut self) -> Result<T> {
        let mut raw = [0u8; 8];
        self.read_exact(&mut raw[..T::SIZE])?;
        Ok(T::from_le_slice(&raw))
    }

    /// Read a `u8`.
    fn read_u8(&mut self) -> Result<u8> {
        self.read_le()
    }

    /// Read an `i8`.
    fn read_i8(&mut self) -> Result<i8> {
        self.read_le()
    }

    /// Read a little-endian `u16`.
    fn read_u16(&mut self) -> Result<u16> {
        self.read_le()
    }

    /// Read a little-endian `i16`.
    fn read_i16(&mut self) -> Result<i16> {
        self.read_le()
    }

    /// Read a little-endian `u32`.
    fn read_u32(&mut self) -> Result<u32> {
        self.read_le()
    }

    /// Read a little-endian `i32`.
    fn read_i32(&mut self) -> Result<i32> {
        self.read_le()
    }

    /// Read a little-endian `u64`.
    fn read_u64(&mut self) -> Result<u64> {
        self.read_le()
    }

    /// Read a little-endian `i64`.
    fn read_i64(&mut self) -> Result<i64> {
        self.read_le()
    }
}

impl<T: StreamReader + ?Sized> ReadExt for T {}

/// A byte sink with a movable position.
pub trait StreamWriter {
    /// Write `buf`, returning the number of bytes accepted.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Current write position.
    fn tell(&mut self) -> Result<u64>;

    /// Move the write position.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64>;

    /// Flush buffered output to the backing store.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Write formatted text, returning the number of bytes written.
    ///
    /// ```
    /// # use lumpio_core::traits::StreamWriter;
    /// # fn demo(w: &mut impl StreamWriter) -> lumpio_core::Result<()> {
    /// w.print_fmt(format_args!("{} lumps\n", 12))?;
    /// # Ok(())
    /// # }
    /// ```
    fn print_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<usize> {
        let text = fmt::format(args);
        self.write(text.as_bytes())
    }
}

/// Typed little-endian output for any [`StreamWriter`].
pub trait WriteExt: StreamWriter {
    /// Write all of `buf` or fail.
    fn write_all(&mut self, mut buf: &[u8]) -> Result<()> {
        while !buf.is_empty() {
            let n = self.write(buf)?;
            if n == 0 {
                return Err(std::io::Error::from(std::io::ErrorKind::WriteZero).into());
            }
            buf = &buf[n..];
        }
        Ok(())
    }

    /// Write one value in little-endian order.
    fn write_le<T: LittleEndian>(&mut self, value: T) -> Result<()> {
        let mut raw = [0u8; 8];
        value.write_le(&mut raw);
        self.write_all(&raw[..T::SIZE])
    }

    /// Write a `u8`.
    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_le(value)
    }

    /// Write a little-endian `u16`.
    fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_le(value)
    }

    /// Write a little-endian `i16`.
    fn write_i16(&mut self, value: i16) -> Result<()> {
        self.write_le(value)
    }

    /// Write a little-endian `u32`.
    fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write_le(value)
    }

    /// Write a little-endian `i32`.
    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_le(value)
    }
}

impl<T: StreamWriter + ?Sized> WriteExt for T {}

/// Status of a streaming decompression step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressStatus {
    /// More input is needed to continue decompression.
    NeedsInput,
    /// More output buffer space is needed.
    NeedsOutput,
    /// The compressed stream reported its end.
    Done,
}

/// A streaming decoder engine.
///
/// Engines are driven by a pull adapter that owns the input buffering; each
/// call consumes some prefix of `input` and fills some prefix of `output`.
pub trait Decompressor {
    /// Decode from `input` into `output`.
    ///
    /// Returns `(bytes consumed, bytes produced, status)`. A corrupt stream is
    /// reported as [`LumpioError::CorruptedData`].
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)>;

    /// True once the engine has seen the end of its stream.
    fn is_finished(&self) -> bool;

    /// Short name of the compression method, used in diagnostics.
    fn method(&self) -> &'static str;
}

impl<T: StreamReader + ?Sized> StreamReader for &mut T {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }
}

impl<T: RandomAccessReader + ?Sized> RandomAccessReader for &mut T {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        (**self).seek(pos)
    }

    fn tell(&self) -> Result<u64> {
        (**self).tell()
    }

    fn length(&self) -> u64 {
        (**self).length()
    }

    fn gets(&mut self, max_len: usize) -> Result<Option<Vec<u8>>> {
        (**self).gets(max_len)
    }
}

impl<T: StreamReader + ?Sized> StreamReader for Box<T> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }
}

impl<T: RandomAccessReader + ?Sized> RandomAccessReader for Box<T> {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        (**self).seek(pos)
    }

    fn tell(&self) -> Result<u64> {
        (**self).tell()
    }

    fn length(&self) -> u64 {
        (**self).length()
    }

    fn gets(&mut self, max_len: usize) -> Result<Option<Vec<u8>>> {
        (**self).gets(max_len)
    }
}
