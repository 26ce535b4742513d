//! Error types for the Miranda database decoder.

use std::io;
use thiserror::Error;

use crate::diagnostics::RecordKind;

/// Errors that abort the decode call in progress.
///
/// Conditions that only affect a single field or entry (signature drift,
/// unknown setting tags, undecodable text) are reported as
/// [`DecodeWarning`](crate::DecodeWarning)s instead.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred while loading the file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A read would run past the end of the buffer or of the enclosing record
    #[error("Out of range: {length} bytes at offset {offset:#x} pass end {end:#x}")]
    OutOfRange {
        /// Absolute offset of the read
        offset: u64,
        /// Number of bytes requested
        length: u64,
        /// End offset of the region the read was checked against
        end: u64,
    },

    /// The file is too short to contain the database header
    #[error("Truncated header: file is {size} bytes, header needs {}", crate::DatabaseHeader::SIZE)]
    TruncatedHeader {
        /// Actual size of the buffer
        size: usize,
    },

    /// A chain walk came back to a record it had already visited
    #[error("Cycle in {kind} chain at offset {offset:#x}")]
    ChainCycle {
        /// Kind of record the chain links together
        kind: RecordKind,
        /// Offset that was visited twice
        offset: u32,
    },

    /// Fixed-layout parse failure
    #[error("Binary parse error: {0}")]
    Binrw(String),
}

impl From<binrw::Error> for Error {
    fn from(err: binrw::Error) -> Self {
        Self::Binrw(format!("{err}"))
    }
}

/// Result type for Miranda database operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::OutOfRange {
            offset: 0x40,
            length: 32,
            end: 0x50,
        };
        assert_eq!(
            error.to_string(),
            "Out of range: 32 bytes at offset 0x40 pass end 0x50"
        );

        let error = Error::TruncatedHeader { size: 10 };
        assert_eq!(
            error.to_string(),
            "Truncated header: file is 10 bytes, header needs 44"
        );

        let error = Error::ChainCycle {
            kind: RecordKind::Contact,
            offset: 0x2c,
        };
        assert_eq!(error.to_string(), "Cycle in contact chain at offset 0x2c");
    }

    #[test]
    fn test_binrw_conversion() {
        let err = binrw::Error::AssertFail {
            pos: 0,
            message: "bad".to_string(),
        };
        assert!(matches!(Error::from(err), Error::Binrw(_)));
    }
}
