//! Composed conformance checks over a parsed archive.
//!
//! Each check sweeps the whole manifest and collects issues instead of
//! stopping at the first failure, so one bad member never hides the rest
//! of the results.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::ExtractError;
use crate::verify::integrity::{self, VerifyOutcome};
use crate::zip::Archive;

/// What a conformance issue is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// Expected name not present in the manifest.
    MissingEntry,
    /// Manifest name not present in the expected set.
    UnexpectedEntry,
    /// The same raw name appears in more than one record.
    DuplicateName,
    /// A record's name failed to decode under the active policy.
    UndecodableName,
    /// Entry content could not be extracted.
    ExtractFailed,
    /// Extracted content does not match the manifest checksum.
    ChecksumMismatch,
    /// A directory marker with a non-zero size or non-empty content.
    DirectoryNotEmpty,
    /// A large entry was not actually compressed.
    NotCompressed,
    /// A name asserted absent is present (or failed in an unexpected way).
    AbsentEntryPresent,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IssueKind::MissingEntry => "missing entry",
            IssueKind::UnexpectedEntry => "unexpected entry",
            IssueKind::DuplicateName => "duplicate name",
            IssueKind::UndecodableName => "undecodable name",
            IssueKind::ExtractFailed => "extract failed",
            IssueKind::ChecksumMismatch => "checksum mismatch",
            IssueKind::DirectoryNotEmpty => "directory not empty",
            IssueKind::NotCompressed => "not compressed",
            IssueKind::AbsentEntryPresent => "absent entry present",
        };
        f.write_str(label)
    }
}

/// One failed expectation, tied to the entry name it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: IssueKind,
    pub name: String,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.name, self.message)
    }
}

/// Aggregated result of one or more conformance checks.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConformanceReport {
    pub issues: Vec<Issue>,
    /// Non-directory entries whose content was extracted and checked.
    pub verified_entries: usize,
}

impl ConformanceReport {
    pub fn is_pass(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn merge(&mut self, other: ConformanceReport) {
        self.issues.extend(other.issues);
        self.verified_entries += other.verified_entries;
    }

    fn push(&mut self, kind: IssueKind, name: impl Into<String>, message: impl Into<String>) {
        self.issues.push(Issue {
            kind,
            name: name.into(),
            message: message.into(),
        });
    }
}

/// Check that the manifest's name set equals `expected` exactly.
///
/// Directory markers keep their trailing `/` on both sides; both sets are
/// compared in canonical separator form. Duplicate raw names and records
/// whose names failed to decode are reported here as well, since either
/// makes the name set untrustworthy.
pub fn check_name_set(archive: &Archive<'_>, expected: &BTreeSet<String>) -> ConformanceReport {
    let mut report = ConformanceReport::default();

    let manifest: BTreeSet<&str> = archive.entries().iter().map(|e| e.name.as_str()).collect();

    for name in expected {
        if !manifest.contains(name.as_str()) {
            report.push(IssueKind::MissingEntry, name.clone(), "expected in archive");
        }
    }
    for name in &manifest {
        if !expected.contains(*name) {
            report.push(IssueKind::UnexpectedEntry, *name, "not in expected set");
        }
    }

    for raw in archive.duplicate_raw_names() {
        report.push(
            IssueKind::DuplicateName,
            String::from_utf8_lossy(raw),
            "raw name stored more than once",
        );
    }

    for err in archive.name_errors() {
        report.push(
            IssueKind::UndecodableName,
            String::from_utf8_lossy(&err.raw_name),
            err.error.to_string(),
        );
    }

    report
}

/// Extract and checksum-verify every entry in the manifest.
///
/// Directory markers are checked for the zero-size invariant instead of
/// being extracted.
pub fn check_integrity(archive: &Archive<'_>) -> ConformanceReport {
    let mut report = ConformanceReport::default();

    for entry in archive.entries() {
        if entry.is_directory {
            if entry.uncompressed_size != 0 {
                report.push(
                    IssueKind::DirectoryNotEmpty,
                    entry.name.clone(),
                    format!("directory marker with size {}", entry.uncompressed_size),
                );
            }
            continue;
        }

        let content = match archive.extract(entry) {
            Ok(content) => content,
            Err(err) => {
                report.push(IssueKind::ExtractFailed, entry.name.clone(), err.to_string());
                continue;
            }
        };

        match integrity::verify(entry, &content) {
            VerifyOutcome::Valid => report.verified_entries += 1,
            VerifyOutcome::Corrupt { expected, actual } => {
                report.push(
                    IssueKind::ChecksumMismatch,
                    entry.name.clone(),
                    format!("stored {expected:#010x}, computed {actual:#010x}"),
                );
            }
        }
    }

    report
}

/// Check that entries of at least `min_size` uncompressed bytes actually
/// shrank. Smaller entries are exempt: compression overhead can exceed the
/// savings there.
pub fn check_compression(archive: &Archive<'_>, min_size: u64) -> ConformanceReport {
    let mut report = ConformanceReport::default();

    for entry in archive.entries() {
        if entry.is_directory || entry.uncompressed_size < min_size {
            continue;
        }
        if !integrity::was_compressed(entry) {
            report.push(
                IssueKind::NotCompressed,
                entry.name.clone(),
                format!(
                    "{} bytes stored as {}",
                    entry.uncompressed_size, entry.compressed_size
                ),
            );
        }
    }

    report
}

/// Assert that `name` is not extractable: the lookup must fail with
/// `NotFound`. Success, or any other failure, is an issue.
pub fn check_absent(archive: &Archive<'_>, name: &str) -> ConformanceReport {
    let mut report = ConformanceReport::default();

    match archive.extract_by_name(name) {
        Err(ExtractError::NotFound(_)) => {}
        Ok(content) => {
            report.push(
                IssueKind::AbsentEntryPresent,
                name,
                format!("extracted {} bytes", content.len()),
            );
        }
        Err(err) => {
            report.push(
                IssueKind::AbsentEntryPresent,
                name,
                format!("failed with {err} instead of a missing-entry error"),
            );
        }
    }

    report
}

/// Run the full conformance suite: name-set equality, per-entry integrity,
/// compression effectiveness, and negative lookups.
pub fn run(
    archive: &Archive<'_>,
    expected: &BTreeSet<String>,
    absent_probes: &[&str],
) -> ConformanceReport {
    let mut report = check_name_set(archive, expected);
    report.merge(check_integrity(archive));
    report.merge(check_compression(
        archive,
        integrity::COMPRESSION_WORTHWHILE_MIN,
    ));
    for name in absent_probes {
        report.merge(check_absent(archive, name));
    }
    report
}
