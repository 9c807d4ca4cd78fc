//! Error taxonomy for COG parsing, writing, and codec dispatch.

use std::fmt;
use std::io;

/// Errors raised while reading, writing, or transcoding a COG.
#[derive(Debug)]
pub enum TiffError {
    /// The two-byte endianness magic was neither `II` nor `MM`.
    InvalidMagic(u16),
    /// The version field was not 42 or 43.
    UnsupportedVersion(u16),
    /// BigTIFF (version 43) was recognized but this core only supports
    /// 32-bit offsets.
    BigTiffNotSupported,
    /// A read extended past the end of the supplied buffer or source.
    Truncated(String),
    /// A tag code had no registered descriptor. Non-fatal; callers skip it.
    UnknownTag(u16),
    /// A GeoKey id had no registered descriptor. Non-fatal; callers skip it.
    UnknownGeoKey(u16),
    /// A `Compression` code had no registered codec factory.
    UnknownCompression(u64),
    /// The underlying codec rejected its input.
    CodecFailure(String),
    /// A writer size/offset sanity check failed; indicates a bug.
    InvariantViolation(String),
    /// A tag required for the requested operation was missing.
    MissingTag(&'static str),
    /// Propagated I/O error from the byte source.
    Io(io::Error),
}

impl fmt::Display for TiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiffError::InvalidMagic(v) => write!(f, "invalid byte order marker: {:#06x}", v),
            TiffError::UnsupportedVersion(v) => write!(f, "unsupported TIFF version: {}", v),
            TiffError::BigTiffNotSupported => {
                write!(f, "BigTIFF 64-bit offsets are not supported")
            }
            TiffError::Truncated(msg) => write!(f, "truncated read: {}", msg),
            TiffError::UnknownTag(id) => write!(f, "unknown tag code: {}", id),
            TiffError::UnknownGeoKey(id) => write!(f, "unknown geokey id: {}", id),
            TiffError::UnknownCompression(code) => write!(f, "unknown compression code: {}", code),
            TiffError::CodecFailure(msg) => write!(f, "codec failure: {}", msg),
            TiffError::InvariantViolation(msg) => write!(f, "invariant violation: {}", msg),
            TiffError::MissingTag(name) => write!(f, "missing required tag: {}", name),
            TiffError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for TiffError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TiffError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TiffError {
    fn from(error: io::Error) -> Self {
        TiffError::Io(error)
    }
}

/// Result type for every fallible operation in this crate.
pub type TiffResult<T> = Result<T, TiffError>;
