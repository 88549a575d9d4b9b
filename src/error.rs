//! Error types for capgen.
//!
//! A single typed failure taxonomy for the whole crate, with a
//! [`Result`] alias. Grounded on pcapsql `src/error.rs` (thiserror enums
//! with named-field variants carrying frame/offset context) and
//! yersinia-core `src/error.rs` (`InvalidParameter { name, reason }`,
//! `Result` alias).

use thiserror::Error;

/// Convenience alias for results across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for capgen operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed capture container at a byte offset.
    #[error("format error at offset {offset}: {reason}")]
    Format { offset: u64, reason: String },

    /// The stream ended before a full record could be read.
    #[error("truncated record {record} at offset {offset}: expected {expected} bytes, got {actual}")]
    Truncated {
        record: u64,
        offset: u64,
        expected: usize,
        actual: usize,
    },

    /// A requested packet size is below the minimum the encoder requires.
    #[error("packet size {packet_size} is too small (minimum {minimum})")]
    SizeTooSmall { packet_size: usize, minimum: usize },

    /// A configuration or call parameter was invalid.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },

    /// A classified record carried a consumer tag with no mapping.
    #[error("record {record} carries unknown consumer tag {tag:#04x}")]
    UnknownTag { record: u64, tag: u8 },
}
