//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// the leading magic bytes belong to no supported binder format
    #[error("unrecognized binder magic {0:02X?}")]
    InvalidMagic([u8; 4]),

    /// the format is recognized but this sub-variant is not implemented
    #[error("unsupported binder variant: {field} is {value:#x}")]
    UnsupportedVariant { field: &'static str, value: u64 },

    /// a declared offset or length runs past the end of the buffer
    #[error("truncated binder: expected {expected} bytes, got {actual}")]
    Truncated { expected: u64, actual: u64 },

    /// an entry name has no terminator before the end of the buffer
    #[error("entry name at {offset:#x} is not terminated")]
    UnterminatedName { offset: u64 },

    /// two entries of a split binder claim intersecting data regions
    #[error("entries {first} and {second} claim overlapping data regions")]
    OverlappingEntries { first: usize, second: usize },

    /// an entry or table cannot be represented in the format's size fields
    #[error("contents too large for the binder's size fields: {0} bytes")]
    TooLarge(u64),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
