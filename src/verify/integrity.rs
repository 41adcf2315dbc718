//! Content checksum verification and compression effectiveness.

use crc32fast::Hasher;

use crate::zip::ManifestEntry;

/// Entries at least this large are expected to shrink when deflated.
///
/// Below it, header overhead can legitimately exceed the savings, so a
/// stored-larger-than-source tiny entry is not evidence of a misbehaving
/// archiver.
pub const COMPRESSION_WORTHWHILE_MIN: u64 = 256;

/// Result of checking extracted content against the manifest checksum.
///
/// A mismatch is a reported outcome, not a hard error: callers sweep whole
/// manifests and want every mismatch, not the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Checksum matches the manifest.
    Valid,
    /// Checksum differs from the manifest.
    Corrupt {
        /// CRC-32 the manifest declares.
        expected: u32,
        /// CRC-32 computed over the extracted content.
        actual: u32,
    },
}

impl VerifyOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerifyOutcome::Valid)
    }
}

/// Recompute the CRC-32 over `content` and compare it to the manifest.
pub fn verify(entry: &ManifestEntry, content: &[u8]) -> VerifyOutcome {
    let actual = crc32(content);
    if actual == entry.crc32 {
        VerifyOutcome::Valid
    } else {
        VerifyOutcome::Corrupt {
            expected: entry.crc32,
            actual,
        }
    }
}

/// CRC-32 (IEEE polynomial, as the ZIP format uses) of a byte slice.
pub fn crc32(content: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(content);
    hasher.finalize()
}

/// Whether compression actually shrank the entry.
///
/// Entries smaller than [`COMPRESSION_WORTHWHILE_MIN`] may fail this
/// without anything being wrong.
pub fn was_compressed(entry: &ManifestEntry) -> bool {
    entry.compressed_size < entry.uncompressed_size
}
