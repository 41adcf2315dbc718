//! Low-level ZIP container parsing.
//!
//! This module turns a raw container byte buffer into an [`Archive`]: an
//! immutable manifest of every entry the central directory declares.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the buffer's end
//! 2. If ZIP64, read the ZIP64 EOCD for large file support
//! 3. Read the Central Directory to get metadata for all files
//!
//! No entry data is touched here; decompression happens per entry, on
//! demand, in [`extract`](Archive::extract).

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};
use tracing::{debug, trace};

use crate::error::{FormatError, NameEncodingError};
use crate::zip::names::{self, NamePolicy};

use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: usize = 65535;

/// An entry whose structural fields parsed but whose name failed to decode
/// under the active [`NamePolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameError {
    /// Index of the record within the central directory.
    pub index: usize,
    /// The undecoded name bytes.
    pub raw_name: Vec<u8>,
    /// What went wrong.
    pub error: NameEncodingError,
}

/// An immutable view over a parsed ZIP container.
///
/// Holds a reference into the caller's byte buffer plus the manifest built
/// from the central directory. Once built, the manifest never changes;
/// parsing the same bytes again yields a field-identical manifest. Entries
/// only read from the shared buffer during extraction, so a single
/// `Archive` may serve extractions from multiple threads.
#[derive(Debug)]
pub struct Archive<'a> {
    data: &'a [u8],
    entries: Vec<ManifestEntry>,
    name_errors: Vec<NameError>,
}

impl<'a> Archive<'a> {
    /// Parse a container buffer into a manifest.
    ///
    /// Structural problems (no EOCD, bad record signature, sizes past the
    /// end of the buffer) are fatal and yield no partial manifest. A name
    /// that fails to decode excludes only that entry; the failure is kept
    /// in [`name_errors`](Self::name_errors) for the caller to judge.
    ///
    /// # Errors
    ///
    /// [`FormatError::MissingIndex`], [`FormatError::CorruptIndex`] or
    /// [`FormatError::TruncatedIndex`].
    pub fn parse(data: &'a [u8], policy: &NamePolicy) -> Result<Self, FormatError> {
        let (eocd, eocd_offset) = find_eocd(data)?;

        // Get Central Directory info, using ZIP64 if needed
        let (cd_offset, cd_size, total_entries) = if eocd.is_zip64() {
            let eocd64 = read_zip64_eocd(data, eocd_offset)?;
            (eocd64.cd_offset, eocd64.cd_size, eocd64.total_entries)
        } else {
            (
                eocd.cd_offset as u64,
                eocd.cd_size as u64,
                eocd.total_entries as u64,
            )
        };

        debug!(cd_offset, cd_size, total_entries, "parsing central directory");

        let cd_end = cd_offset.checked_add(cd_size).filter(|&e| e <= data.len() as u64);
        let Some(cd_end) = cd_end else {
            return Err(FormatError::TruncatedIndex {
                offset: cd_offset,
                needed: cd_size,
                available: (data.len() as u64).saturating_sub(cd_offset),
            });
        };
        let cd_data = &data[cd_offset as usize..cd_end as usize];

        let mut entries = Vec::with_capacity(total_entries as usize);
        let mut name_errors = Vec::new();
        let mut cursor = Cursor::new(cd_data);

        for index in 0..total_entries as usize {
            let record = parse_cdfh(&mut cursor, cd_offset)?;
            let utf8_flag = record.flags & FLAG_UTF8 != 0;

            match names::normalize(&record.raw_name, utf8_flag, policy) {
                Ok(name) => {
                    trace!(index, %name, "manifest entry");
                    entries.push(record.into_entry(name));
                }
                Err(error) => {
                    debug!(index, ?error, "entry name failed to decode, skipping");
                    name_errors.push(NameError {
                        index,
                        raw_name: record.raw_name,
                        error,
                    });
                }
            }
        }

        Ok(Archive {
            data,
            entries,
            name_errors,
        })
    }

    /// The underlying container bytes.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// All manifest entries, in central-directory order.
    ///
    /// Duplicate names are retained as-is; they are a format anomaly the
    /// caller should surface, not something to merge away.
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Look up an entry by normalized name. With duplicates present the
    /// first record wins, matching how sequential unpackers behave.
    pub fn entry(&self, name: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Entries whose names failed to decode during parsing.
    pub fn name_errors(&self) -> &[NameError] {
        &self.name_errors
    }

    /// Raw name byte sequences that appear in more than one record.
    pub fn duplicate_raw_names(&self) -> Vec<&[u8]> {
        let mut dups = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            let first = self
                .entries
                .iter()
                .position(|e| e.raw_name == entry.raw_name);
            if first == Some(i) {
                let count = self
                    .entries
                    .iter()
                    .filter(|e| e.raw_name == entry.raw_name)
                    .count();
                if count > 1 {
                    dups.push(entry.raw_name.as_slice());
                }
            }
        }
        dups
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Find and parse the End of Central Directory record.
///
/// Handles both the simple case (no comment) and archives with trailing
/// comments by searching backwards for the signature within the bounded
/// comment window.
fn find_eocd(data: &[u8]) -> Result<(EndOfCentralDirectory, u64), FormatError> {
    // First try the simple case where there's no comment: the EOCD sits
    // exactly at the end of the buffer.
    if data.len() >= EndOfCentralDirectory::SIZE {
        let offset = data.len() - EndOfCentralDirectory::SIZE;
        let tail = &data[offset..];
        if &tail[0..4] == EndOfCentralDirectory::SIGNATURE && &tail[20..22] == b"\x00\x00" {
            let eocd = EndOfCentralDirectory::from_bytes(tail)?;
            return Ok((eocd, offset as u64));
        }
    }

    // EOCD not at the expected location - there may be a trailing comment.
    // Search backwards from the end, bounded by the maximum comment size.
    let search_size = (MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE).min(data.len());
    let search_start = data.len() - search_size;
    let window = &data[search_start..];

    for i in (0..window.len().saturating_sub(EndOfCentralDirectory::SIZE)).rev() {
        if &window[i..i + 4] == EndOfCentralDirectory::SIGNATURE {
            // Candidate EOCD - the comment length field must account for
            // exactly the bytes that remain after the record.
            let comment_len = u16::from_le_bytes([window[i + 20], window[i + 21]]) as usize;

            if comment_len == window.len() - i - EndOfCentralDirectory::SIZE {
                let eocd =
                    EndOfCentralDirectory::from_bytes(&window[i..i + EndOfCentralDirectory::SIZE])?;
                return Ok((eocd, (search_start + i) as u64));
            }
        }
    }

    Err(FormatError::MissingIndex)
}

/// Read the ZIP64 End of Central Directory record.
///
/// Called when the regular EOCD indicates ZIP64 extensions are needed
/// (fields saturated to 0xFFFF or 0xFFFFFFFF).
fn read_zip64_eocd(data: &[u8], eocd_offset: u64) -> Result<Zip64EOCD, FormatError> {
    // The ZIP64 EOCD Locator sits immediately before the regular EOCD
    let locator_offset = eocd_offset
        .checked_sub(Zip64EOCDLocator::SIZE as u64)
        .ok_or_else(|| {
            FormatError::CorruptIndex("no room for ZIP64 end of central directory locator".into())
        })?;
    let locator = Zip64EOCDLocator::from_bytes(&data[locator_offset as usize..])?;

    if locator.eocd64_offset + Zip64EOCD::MIN_SIZE as u64 > data.len() as u64 {
        return Err(FormatError::TruncatedIndex {
            offset: locator.eocd64_offset,
            needed: Zip64EOCD::MIN_SIZE as u64,
            available: (data.len() as u64).saturating_sub(locator.eocd64_offset),
        });
    }

    Zip64EOCD::from_bytes(&data[locator.eocd64_offset as usize..])
}

/// A central directory record with its name still undecoded.
struct CdfhRecord {
    flags: u16,
    compression_method: u16,
    last_mod_time: u16,
    last_mod_date: u16,
    crc32: u32,
    compressed_size: u64,
    uncompressed_size: u64,
    lfh_offset: u64,
    raw_name: Vec<u8>,
}

impl CdfhRecord {
    fn into_entry(self, name: String) -> ManifestEntry {
        // Directory markers end with the separator. Size invariants are
        // checked by the conformance layer, not assumed here.
        let is_directory = name.ends_with('/');
        ManifestEntry {
            name,
            raw_name: self.raw_name,
            compression_method: CompressionMethod::from_u16(self.compression_method),
            compressed_size: self.compressed_size,
            uncompressed_size: self.uncompressed_size,
            crc32: self.crc32,
            local_header_offset: self.lfh_offset,
            last_mod_time: self.last_mod_time,
            last_mod_date: self.last_mod_date,
            is_directory,
        }
    }
}

/// Parse one Central Directory File Header from the cursor.
///
/// `cd_offset` is only used to report absolute offsets in errors.
fn parse_cdfh(cursor: &mut Cursor<&[u8]>, cd_offset: u64) -> Result<CdfhRecord, FormatError> {
    let cd_len = cursor.get_ref().len() as u64;
    let record_start = cursor.position();

    if cd_len.saturating_sub(record_start) < CDFH_MIN_SIZE as u64 {
        return Err(FormatError::TruncatedIndex {
            offset: cd_offset + record_start,
            needed: CDFH_MIN_SIZE as u64,
            available: cd_len - record_start,
        });
    }

    // Read and verify the signature (PK\x01\x02)
    let mut sig = [0u8; 4];
    cursor.read_exact(&mut sig)?;
    if sig != CDFH_SIGNATURE {
        return Err(FormatError::CorruptIndex(format!(
            "bad record signature {:02x?} at offset {}",
            sig,
            cd_offset + record_start
        )));
    }

    // Fixed-size header fields
    let _version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let flags = cursor.read_u16::<LittleEndian>()?;
    let compression_method = cursor.read_u16::<LittleEndian>()?;
    let last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let crc32 = cursor.read_u32::<LittleEndian>()?;
    let mut compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let mut uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let file_name_length = cursor.read_u16::<LittleEndian>()?;
    let extra_field_length = cursor.read_u16::<LittleEndian>()?;
    let file_comment_length = cursor.read_u16::<LittleEndian>()?;
    let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let _external_attrs = cursor.read_u32::<LittleEndian>()?;
    let mut lfh_offset = cursor.read_u32::<LittleEndian>()? as u64;

    // The three variable-length regions must fit in what remains of the
    // central directory.
    let variable_len =
        file_name_length as u64 + extra_field_length as u64 + file_comment_length as u64;
    if cursor.position() + variable_len > cd_len {
        return Err(FormatError::TruncatedIndex {
            offset: cd_offset + cursor.position(),
            needed: variable_len,
            available: cd_len - cursor.position(),
        });
    }

    // Variable-length file name, kept raw; decoding is the caller's job
    let mut raw_name = vec![0u8; file_name_length as usize];
    cursor.read_exact(&mut raw_name)?;

    // Parse extra field for ZIP64 extended information (id 0x0001).
    // Fields are present only when the corresponding 32-bit header field
    // is saturated.
    let extra_field_end = cursor.position() + extra_field_length as u64;

    while cursor.position() + 4 <= extra_field_end {
        let header_id = cursor.read_u16::<LittleEndian>()?;
        let field_size = cursor.read_u16::<LittleEndian>()?;

        if header_id == 0x0001 {
            if uncompressed_size == 0xFFFFFFFF && cursor.position() + 8 <= extra_field_end {
                uncompressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if compressed_size == 0xFFFFFFFF && cursor.position() + 8 <= extra_field_end {
                compressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if lfh_offset == 0xFFFFFFFF && cursor.position() + 8 <= extra_field_end {
                lfh_offset = cursor.read_u64::<LittleEndian>()?;
            }
            // Skip any remaining ZIP64 fields (disk number start)
            let remaining = extra_field_end.saturating_sub(cursor.position());
            cursor.set_position(cursor.position() + remaining);
        } else {
            // Skip unknown extra fields
            cursor.set_position(cursor.position() + field_size as u64);
        }
    }

    // Ensure cursor is positioned after extra field, then skip the comment
    cursor.set_position(extra_field_end);
    cursor.set_position(cursor.position() + file_comment_length as u64);

    Ok(CdfhRecord {
        flags,
        compression_method,
        last_mod_time,
        last_mod_date,
        crc32,
        compressed_size,
        uncompressed_size,
        lfh_offset,
        raw_name,
    })
}
