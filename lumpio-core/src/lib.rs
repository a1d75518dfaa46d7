//! # lumpio core
//!
//! Core contracts for the lumpio byte-stream layer.
//!
//! - [`traits`]: reader, writer and decompressor contracts
//! - [`endian`]: little-endian wire codec
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Handle: LumpReader (single owner of one reader)         │
//! ├─────────────────────────────────────────────────────────┤
//! │ Readers: file, memory, owned memory, sub-range view     │
//! │ Filters: deflate, bzip2, raw LZMA (forward-only)        │
//! │ Writers: file, buffer                                   │
//! ├─────────────────────────────────────────────────────────┤
//! │ Core (this crate): traits, endian codec, errors         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use lumpio_core::endian::{LittleEndian, to_le_vec};
//!
//! let wire = to_le_vec(0x1234u16);
//! assert_eq!(wire, [0x34, 0x12]);
//! assert_eq!(u16::from_le_slice(&wire), 0x1234);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod endian;
pub mod error;
pub mod traits;

/// Capacity of the compressed-input buffer shared by all decompression
/// filters.
pub const FILTER_BUFFER_SIZE: usize = 4096;

/// Default line cap used by [`RandomAccessReader::gets_line`].
pub const GETS_MAX_LINE: usize = 1024;

// Re-exports for convenience
pub use endian::LittleEndian;
pub use error::{LumpioError, Result};
pub use traits::{
    DecompressStatus, Decompressor, RandomAccessReader, ReadExt, StreamReader, StreamWriter,
    WriteExt,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{LumpioError, Result};
    pub use crate::traits::{
        RandomAccessReader, ReadExt, StreamReader, StreamWriter, WriteExt,
    };
}
