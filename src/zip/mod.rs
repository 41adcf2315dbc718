//! ZIP container reading.
//!
//! This module parses the on-disk container format into a manifest of
//! entries and extracts member content for verification.
//!
//! ## Architecture
//!
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, file headers, etc.)
//! - [`names`]: Entry-name decoding policy and separator normalization
//! - [`parser`]: Central-directory parsing from raw bytes into an [`Archive`]
//! - [`extractor`]: Per-entry data location and decompression
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! The EOCD is read first (from the end of the buffer), then the Central
//! Directory, which yields the whole manifest without walking entry data.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for files > 4GB
//! - STORED (no compression) method
//! - DEFLATE compression method
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No BZIP2, LZMA, or other compression methods
//! - Read-only: this crate never writes containers

mod extractor;
pub mod names;
mod parser;
mod structures;

pub use names::{Codepage, NamePolicy};
pub use parser::{Archive, NameError};
pub use structures::*;
