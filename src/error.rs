//! Error types for archive parsing, extraction and verification.

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Fatal, whole-archive structural errors.
///
/// When any of these occurs the container cannot be trusted and no partial
/// manifest is returned.
#[derive(Error, Debug)]
pub enum FormatError {
    /// No End of Central Directory signature within the trailing search
    /// window. The input is not a ZIP container (or is hopelessly mangled).
    #[error("no end of central directory record found")]
    MissingIndex,

    /// A central directory record carried a bad signature or otherwise
    /// unparseable fixed fields.
    #[error("corrupt central directory: {0}")]
    CorruptIndex(String),

    /// The index declares more bytes than the buffer holds.
    #[error("central directory truncated: need {needed} bytes at offset {offset}, have {available}")]
    TruncatedIndex {
        /// Offset at which the shortfall was detected.
        offset: u64,
        /// Bytes the declared sizes require from that offset.
        needed: u64,
        /// Bytes actually remaining.
        available: u64,
    },
}

// Record parsing bounds-checks before reading, so a short read from a
// cursor means the declared layout lied about its own size.
impl From<io::Error> for FormatError {
    fn from(err: io::Error) -> Self {
        FormatError::CorruptIndex(format!("record ended early: {err}"))
    }
}

/// Per-entry name decoding errors.
///
/// Unlike [`FormatError`] these do not poison the whole archive; callers may
/// skip the offending entry and continue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameEncodingError {
    /// The entry declared UTF-8 (or the policy selected it) but the raw
    /// name bytes are not valid UTF-8.
    #[error("entry name is not valid UTF-8: {raw:x?}")]
    InvalidUtf8 {
        /// Leading raw name bytes, for diagnostics.
        raw: Vec<u8>,
    },

    /// The requested legacy codepage has no decoding table.
    #[error("unsupported codepage {0}")]
    UnsupportedCodepage(u16),
}

/// Per-entry extraction errors. None are retried.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The requested name is not in the manifest. This is a normal outcome
    /// for negative lookups and is guaranteed to leave no side effect.
    #[error("no such entry in archive: {0}")]
    NotFound(String),

    /// The local file header at the entry's recorded offset has a bad
    /// signature, or the data region it describes runs past the buffer.
    #[error("corrupt local file header at offset {0}")]
    CorruptLocalHeader(u64),

    /// The entry uses a compression method this reader does not handle.
    #[error("unsupported compression method {0}")]
    UnsupportedMethod(u16),

    /// The deflate stream failed to decompress.
    #[error("decompression failed: {0}")]
    Decompression(#[source] io::Error),
}

/// Failures at the external archiver boundary.
#[derive(Error, Debug)]
pub enum ExternalToolError {
    /// The archiver executable could not be launched at all.
    #[error("failed to launch archiver {program:?}: {source}")]
    Launch {
        /// Program name as invoked.
        program: String,
        /// Underlying spawn error.
        #[source]
        source: io::Error,
    },

    /// The archiver ran but reported a non-zero exit status.
    #[error("archiver {program:?} exited with {status}")]
    Failed {
        /// Program name as invoked.
        program: String,
        /// The reported exit status.
        status: ExitStatus,
    },
}

/// Failures while generating a synthetic corpus.
#[derive(Error, Debug)]
pub enum CorpusError {
    /// The fixed-length permutation namespace ran out of unique names for
    /// the requested tree size.
    #[error("unique name space exhausted after {generated} names")]
    NamesExhausted {
        /// Names successfully generated before exhaustion.
        generated: usize,
    },

    /// Filesystem error while laying out the corpus.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
