//! File-backed reader.
//!
//! A [`FileReader`] exposes a `(start, length)` window of a physical file as
//! a logical stream, so one file can back several readers. The OS cursor is
//! moved to the tracked offset before every read, which keeps readers that
//! share a file (through [`FileReader::try_clone_range`]) independent of each
//! other.

use log::debug;
use lumpio_core::error::{LumpioError, Result};
use lumpio_core::traits::{RandomAccessReader, StreamReader, resolve_seek};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// A reader over a window of an OS file.
#[derive(Debug)]
pub struct FileReader {
    file: File,
    path: Option<PathBuf>,
    /// Physical offset of logical position 0.
    start: u64,
    length: u64,
    /// Logical position.
    position: u64,
}

impl FileReader {
    /// Open the file at `path` as a stream over its whole contents.
    ///
    /// # Errors
    ///
    /// [`LumpioError::NotFound`] if the file does not exist,
    /// [`LumpioError::Open`] if it exists but cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| LumpioError::from_open(path, err))?;
        let length = file.metadata()?.len();
        debug!("opened {} ({} bytes)", path.display(), length);

        Ok(Self {
            file,
            path: Some(path.to_path_buf()),
            start: 0,
            length,
            position: 0,
        })
    }

    /// Wrap an already-open file, exposing all of it.
    pub fn from_file(file: File) -> Result<Self> {
        let length = file.metadata()?.len();
        Self::from_file_range(file, 0, length)
    }

    /// Wrap an already-open file, exposing `length` bytes from `start`.
    pub fn from_file_range(file: File, start: u64, length: u64) -> Result<Self> {
        let physical = file.metadata()?.len();
        if start.checked_add(length).is_none_or(|end| end > physical) {
            return Err(LumpioError::invalid_range(start, length, physical));
        }

        Ok(Self {
            file,
            path: None,
            start,
            length,
            position: 0,
        })
    }

    /// Create an independent reader over a window of this one.
    ///
    /// `start` is relative to this reader's logical stream. The new reader
    /// shares the OS file but tracks its own position.
    pub fn try_clone_range(&self, start: u64, length: u64) -> Result<Self> {
        if start.checked_add(length).is_none_or(|end| end > self.length) {
            return Err(LumpioError::invalid_range(start, length, self.length));
        }

        Ok(Self {
            file: self.file.try_clone()?,
            path: self.path.clone(),
            start: self.start + start,
            length,
            position: 0,
        })
    }

    /// Physical offset of the window inside the file.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Path the file was opened from, if known.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl StreamReader for FileReader {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let left = self.length - self.position;
        let want = usize::try_from(left).map_or(buf.len(), |left| left.min(buf.len()));
        if want == 0 {
            return Ok(0);
        }

        self.file.seek(SeekFrom::Start(self.start + self.position))?;
        let mut filled = 0;
        while filled < want {
            match self.file.read(&mut buf[filled..want]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.position += filled as u64;
                    return Err(err.into());
                }
            }
        }

        self.position += filled as u64;
        Ok(filled)
    }
}

impl RandomAccessReader for FileReader {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        self.position = resolve_seek(pos, self.position, self.length)?;
        Ok(self.position)
    }

    fn tell(&self) -> Result<u64> {
        Ok(self.position)
    }

    fn length(&self) -> u64 {
        self.length
    }
}
