//! Writers: straight to a file, or into a growable buffer.

use log::debug;
use lumpio_core::error::{LumpioError, Result};
use lumpio_core::traits::{StreamWriter, resolve_seek};
use std::fs::File;
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

/// Writes pass through to an OS file.
#[derive(Debug)]
pub struct FileWriter {
    file: File,
}

impl FileWriter {
    /// Create (or truncate) the file at `path`.
    ///
    /// # Errors
    ///
    /// [`LumpioError::NotFound`] if a parent directory is missing,
    /// [`LumpioError::Open`] for any other failure.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|err| LumpioError::from_open(path, err))?;
        debug!("created {}", path.display());
        Ok(Self { file })
    }

    /// Wrap an already-open file.
    pub fn from_file(file: File) -> Self {
        Self { file }
    }

    /// Give up the writer and return the file.
    pub fn into_inner(self) -> File {
        self.file
    }
}

impl StreamWriter for FileWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        loop {
            match self.file.write(buf) {
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                other => return Ok(other?),
            }
        }
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.file.stream_position()?)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        Ok(self.file.seek(pos)?)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.file.flush()?)
    }
}

impl io::Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Collects written bytes in memory.
///
/// Writes land at the cursor, overwriting existing bytes and extending the
/// buffer past its end. The cursor can be moved anywhere in `[0, len]`, which
/// allows patching a header after its payload has been written.
#[derive(Debug, Clone, Default)]
pub struct BufferWriter {
    buffer: Vec<u8>,
    position: usize,
}

impl BufferWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            position: 0,
        }
    }

    /// Everything written so far.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of bytes in the buffer.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Give up the writer and return its bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

impl StreamWriter for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let end = self.position + buf.len();
        let overlap = end.min(self.buffer.len());
        if overlap > self.position {
            let split = overlap - self.position;
            self.buffer[self.position..overlap].copy_from_slice(&buf[..split]);
            self.buffer.extend_from_slice(&buf[split..]);
        } else {
            self.buffer.extend_from_slice(buf);
        }
        self.position = end;
        Ok(buf.len())
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.position as u64)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let target = resolve_seek(pos, self.position as u64, self.buffer.len() as u64)?;
        self.position = target as usize;
        Ok(target)
    }
}

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(StreamWriter::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
