//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// the scheme tag matches no known compression scheme
    #[error("unknown compression scheme tag {0:02X?}")]
    UnknownScheme([u8; 4]),

    /// the scheme tag is recognized but not implemented
    #[error("unsupported compression scheme {}", String::from_utf8_lossy(.0))]
    UnsupportedScheme([u8; 4]),

    /// a header layout field holds a value this library does not understand
    #[error("unsupported frame layout: {field} is {value:#x}")]
    UnsupportedLayout { field: &'static str, value: u32 },

    /// a declared size runs past the end of the buffer
    #[error("truncated frame: expected {expected} bytes, got {actual}")]
    Truncated { expected: u64, actual: u64 },

    /// decompressed output disagrees with the declared size
    #[error("size mismatch: header declares {declared} bytes, decompression produced {actual}")]
    SizeMismatch { declared: u64, actual: u64 },

    /// the compressed stream itself is corrupt
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    /// the payload cannot be represented in the frame's 32-bit size fields
    #[error("payload too large for a DCX frame: {0} bytes")]
    TooLarge(u64),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
