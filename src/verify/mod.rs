//! Archive verification.
//!
//! - [`integrity`]: checksum recomputation and the compression predicate
//! - [`conformance`]: composed checks a caller runs against a whole archive

pub mod conformance;
pub mod integrity;

pub use conformance::{ConformanceReport, Issue, IssueKind};
pub use integrity::{COMPRESSION_WORTHWHILE_MIN, VerifyOutcome, verify, was_compressed};
