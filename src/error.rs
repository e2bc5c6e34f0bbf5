//! Unified error type for the extraction pipeline.
//!
//! Every operation in this crate returns one of the variants below. Each variant
//! corresponds to one of the negative error codes a C-style caller of this library
//! would expect; [`Error::code`] recovers that numeric contract and [`Error::strerror`]
//! recovers the human-readable string for a raw code without requiring an `Error`
//! value in hand.

use thiserror::Error as ThisError;

/// Failure modes of CFB navigation, BIFF8 scanning, and image extraction.
#[derive(ThisError, Debug)]
pub enum Error {
    /// CFB magic signature mismatch.
    #[error("wrong format: not a compound file")]
    WrongFormat,

    /// Sizes, offsets, or sector sentinels are inconsistent with the declared
    /// container layout.
    #[error("file corrupted: {0}")]
    FileCorrupted(String),

    /// Null/empty buffer, or a buffer too small to hold a valid header.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The directory tree contains no `Workbook`/`WORKBOOK` stream.
    #[error("no workbook stream found")]
    NoWorkbook,

    /// The BIFF8 scan completed without emitting any image payloads.
    #[error("no images found")]
    NoImages,

    /// Allocation failure. Reserved; Rust's allocator aborts the process on OOM
    /// rather than returning an error, so this variant exists for parity with the
    /// original numeric contract and is not otherwise produced.
    #[error("out of memory")]
    OutOfMemory,
}

impl Error {
    /// The signed error code this variant corresponds to, per the original
    /// `XLS2IMG_ERROR_*` contract.
    pub fn code(&self) -> i32 {
        match self {
            Error::WrongFormat => -1,
            Error::FileCorrupted(_) => -2,
            Error::InvalidArgument(_) => -3,
            Error::NoWorkbook => -4,
            Error::NoImages => -5,
            Error::OutOfMemory => -6,
        }
    }

    /// Static, allocation-free message for a raw numeric code. Unknown codes map
    /// to a generic "unknown error" string rather than panicking.
    pub fn strerror(code: i32) -> &'static str {
        match code {
            0 => "success",
            -1 => "wrong format: not a compound file",
            -2 => "file corrupted",
            -3 => "invalid argument",
            -4 => "no workbook stream found",
            -5 => "no images found",
            -6 => "out of memory",
            _ => "unknown error",
        }
    }
}

/// Result type for this crate's operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_contract() {
        assert_eq!(Error::WrongFormat.code(), -1);
        assert_eq!(Error::FileCorrupted(String::new()).code(), -2);
        assert_eq!(Error::InvalidArgument(String::new()).code(), -3);
        assert_eq!(Error::NoWorkbook.code(), -4);
        assert_eq!(Error::NoImages.code(), -5);
        assert_eq!(Error::OutOfMemory.code(), -6);
    }

    #[test]
    fn strerror_is_static_and_stable() {
        assert_eq!(Error::strerror(0), "success");
        assert_eq!(Error::strerror(-4), "no workbook stream found");
        assert_eq!(Error::strerror(42), "unknown error");
    }

    #[test]
    fn display_matches_strerror_family() {
        let err = Error::NoWorkbook;
        assert_eq!(err.to_string(), Error::strerror(-4));
    }
}
