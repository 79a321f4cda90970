//! Error taxonomy shared by the type compiler, reader, and writer.
//!
//! Mirrors the small, stable set of failure modes the wire format can
//! produce. There is no `Ok`-carrying payload variant here on purpose —
//! every fallible operation in this crate returns `Result<T, Error>` with
//! `T` specific to the call site.

use std::fmt;

/// Everything that can go wrong while compiling a signature, reading a
/// frame, or writing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A signature exceeded the 255-character length limit while being
    /// compiled.
    OverlongType,
    /// A signature nested containers deeper than the depth limits allow
    /// (64 total, 32 tuple, 32 array).
    DepthOverflow,
    /// A signature violates the D-Bus type grammar (unmatched bracket,
    /// empty tuple, non-basic dict-entry key, ...).
    InvalidType,
    /// The byte stream itself is malformed: non-zero alignment padding,
    /// an out-of-range bool, invalid UTF-8/path/signature bytes, a
    /// missing NUL terminator, or trailing bytes left inside a closed
    /// array.
    CorruptData,
    /// A declared size (string length, array length, struct body) would
    /// read or write past the end of the available buffer.
    OutOfBounds,
    /// A variant's on-wire signature did not match the type the caller
    /// declared when entering it.
    TypeMismatch,
    /// The format string passed to `read`/`write`/`skip` does not match
    /// the shape of the type currently being visited. This is API
    /// misuse, not malformed data, and is never recoverable mid-call.
    FormatMismatch,
    /// A read-mode buffer was not 8-byte aligned. The original C API
    /// asserts this precondition; this port checks it instead (see
    /// `DESIGN.md`).
    Misaligned,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::OverlongType => "type signature exceeds the 255-character limit",
            Error::DepthOverflow => "type signature exceeds container depth limits",
            Error::InvalidType => "type signature is not a valid D-Bus type",
            Error::CorruptData => "serialized data is malformed",
            Error::OutOfBounds => "declared size exceeds the available buffer",
            Error::TypeMismatch => "on-wire variant signature does not match the expected type",
            Error::FormatMismatch => "format string does not match the type being visited",
            Error::Misaligned => "read buffer is not 8-byte aligned",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
