//! # checkzip
//!
//! A ZIP archive verifier.
//!
//! This library checks that a produced ZIP container is structurally and
//! semantically correct relative to a known source tree: it parses the
//! container's central directory into an immutable manifest, decompresses
//! and checksum-verifies member content, normalizes member names across
//! platform encoding conventions, and composes those pieces into the
//! conformance checks a test harness runs against an external archiver.
//!
//! The core operates on an in-memory byte buffer and performs no I/O of
//! its own; reading the archive file and invoking the archiver live at
//! the edges ([`harness`], the CLI binary).
//!
//! ## Example
//!
//! ```no_run
//! use checkzip::{Archive, NamePolicy};
//! use checkzip::verify::conformance;
//!
//! fn main() -> anyhow::Result<()> {
//!     let data = std::fs::read("archive.zip")?;
//!     let archive = Archive::parse(&data, &NamePolicy::Utf8)?;
//!
//!     for entry in archive.entries() {
//!         println!("{}", entry.name);
//!     }
//!
//!     let report = conformance::check_integrity(&archive);
//!     assert!(report.is_pass());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod harness;
pub mod logging;
pub mod verify;
pub mod zip;

pub use cli::Cli;
pub use error::{CorpusError, ExternalToolError, ExtractError, FormatError, NameEncodingError};
pub use verify::{ConformanceReport, VerifyOutcome};
pub use zip::{Archive, Codepage, CompressionMethod, ManifestEntry, NamePolicy};
