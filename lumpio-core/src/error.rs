//! Error types for lumpio operations.
//!
//! Every fault a stream can report is a variant of [`LumpioError`]. Bounds
//! faults (seeking or reading outside a stream) and open faults (missing or
//! unreadable backing storage) are always recoverable and are returned to the
//! caller. Decode faults come from the decompression filters and are latched
//! by the filter that raised them.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for lumpio operations.
#[derive(Debug, Error)]
pub enum LumpioError {
    /// I/O error from the underlying file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backing file does not exist.
    #[error("File not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The backing file exists but could not be opened.
    #[error("Cannot open {}: {source}", path.display())]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// OS error reported by the open call.
        source: io::Error,
    },

    /// A lazy memory population routine reported failure.
    #[error("Memory population routine failed")]
    PopulateFailed,

    /// Seek target lies outside the logical stream.
    #[error("Seek target {target} outside stream of length {length}")]
    SeekOutOfRange {
        /// Requested absolute target (may be negative).
        target: i64,
        /// Logical length of the stream.
        length: u64,
    },

    /// A sub-range view found its parent positioned outside the view.
    #[error("Parent position {position} outside view [{start}, {end})")]
    PositionOutOfRange {
        /// Position reported by the parent reader.
        position: u64,
        /// First byte of the view in parent coordinates.
        start: u64,
        /// One past the last byte of the view in parent coordinates.
        end: u64,
    },

    /// A fixed-width read ran into end-of-stream.
    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Number of bytes requested.
        expected: usize,
        /// Number of bytes actually available.
        actual: usize,
    },

    /// Sub-range construction outside the parent stream.
    #[error("Range [{start}, {start}+{length}) exceeds parent of length {parent_length}")]
    InvalidRange {
        /// Requested start offset.
        start: u64,
        /// Requested length.
        length: u64,
        /// Length of the parent stream.
        parent_length: u64,
    },

    /// Corrupted compressed data detected by a decompression filter.
    #[error("Corrupt {method} stream: {message}")]
    CorruptedData {
        /// Name of the compression method.
        method: &'static str,
        /// Description of the corruption.
        message: String,
    },

    /// Invalid compression properties header.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// Operation on a reader handle that holds no reader.
    #[error("Reader handle is not open")]
    NotOpen,
}

/// Result type alias for lumpio operations.
pub type Result<T> = std::result::Result<T, LumpioError>;

impl LumpioError {
    /// Classify a failed `File::open` into [`LumpioError::NotFound`] or
    /// [`LumpioError::Open`].
    pub fn from_open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Open { path, source }
        }
    }

    /// Create a seek out of range error.
    pub fn seek_out_of_range(target: i64, length: u64) -> Self {
        Self::SeekOutOfRange { target, length }
    }

    /// Create a short read error.
    pub fn short_read(expected: usize, actual: usize) -> Self {
        Self::ShortRead { expected, actual }
    }

    /// Create an invalid range error.
    pub fn invalid_range(start: u64, length: u64, parent_length: u64) -> Self {
        Self::InvalidRange {
            start,
            length,
            parent_length,
        }
    }

    /// Create a corrupted data error.
    pub fn corrupted(method: &'static str, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            method,
            message: message.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// True for faults caused by positioning outside a stream.
    pub fn is_bounds(&self) -> bool {
        matches!(
            self,
            Self::SeekOutOfRange { .. }
                | Self::PositionOutOfRange { .. }
                | Self::ShortRead { .. }
                | Self::InvalidRange { .. }
        )
    }

    /// True for faults raised while opening a backing source.
    pub fn is_open_failure(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Open { .. } | Self::PopulateFailed
        )
    }

    /// True for faults raised by a decompression filter.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::CorruptedData { .. } | Self::InvalidHeader { .. })
    }
}

impl From<LumpioError> for io::Error {
    fn from(err: LumpioError) -> Self {
        match err {
            LumpioError::Io(inner) => inner,
            LumpioError::NotFound { .. } => io::Error::new(io::ErrorKind::NotFound, err),
            LumpioError::SeekOutOfRange { .. } | LumpioError::InvalidRange { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
            LumpioError::ShortRead { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            LumpioError::CorruptedData { .. } | LumpioError::InvalidHeader { .. } => {
                io::Error::new(io::ErrorKind::InvalidData, err)
            }
            other => io::Error::other(other),
        }
    }
}
