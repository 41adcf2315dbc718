//! Per-entry data-record location and decompression.

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::DeflateDecoder;
use std::io::{Cursor, Read};
use tracing::trace;

use crate::error::ExtractError;

use super::parser::Archive;
use super::structures::{CompressionMethod, LFH_SIGNATURE, LFH_SIZE, ManifestEntry};

impl<'a> Archive<'a> {
    /// Extract one entry's content into memory.
    ///
    /// Directory entries have no data record; extracting one returns empty
    /// content without touching the buffer.
    ///
    /// # Errors
    ///
    /// [`ExtractError::CorruptLocalHeader`] when the local header at the
    /// entry's recorded offset does not check out,
    /// [`ExtractError::UnsupportedMethod`] for compression methods other
    /// than Stored/Deflate, and [`ExtractError::Decompression`] when the
    /// deflate stream is damaged.
    pub fn extract(&self, entry: &ManifestEntry) -> Result<Vec<u8>, ExtractError> {
        if entry.is_directory {
            return Ok(Vec::new());
        }

        let data_offset = self.data_offset(entry)?;
        let data = self.data();

        let end = data_offset
            .checked_add(entry.compressed_size)
            .filter(|&e| e <= data.len() as u64)
            .ok_or(ExtractError::CorruptLocalHeader(entry.local_header_offset))?;
        let compressed = &data[data_offset as usize..end as usize];

        trace!(
            name = %entry.name,
            data_offset,
            compressed = compressed.len(),
            "extracting entry"
        );

        match entry.compression_method {
            CompressionMethod::Stored => Ok(compressed.to_vec()),
            CompressionMethod::Deflate => {
                let mut decoder = DeflateDecoder::new(compressed);
                let mut content = Vec::with_capacity(entry.uncompressed_size as usize);
                decoder
                    .read_to_end(&mut content)
                    .map_err(ExtractError::Decompression)?;
                Ok(content)
            }
            CompressionMethod::Unknown(method) => Err(ExtractError::UnsupportedMethod(method)),
        }
    }

    /// Extract by normalized name.
    ///
    /// An absent name fails with [`ExtractError::NotFound`] before anything
    /// else happens; no external resource is created or modified on that
    /// path.
    pub fn extract_by_name(&self, name: &str) -> Result<Vec<u8>, ExtractError> {
        let entry = self
            .entry(name)
            .ok_or_else(|| ExtractError::NotFound(name.to_owned()))?;
        self.extract(entry)
    }

    /// Locate the entry's data region.
    ///
    /// The Local File Header re-states the variable-length name and extra
    /// fields, and its extra field may differ in length from the central
    /// directory's copy, so the data offset has to be computed from the
    /// LFH itself.
    fn data_offset(&self, entry: &ManifestEntry) -> Result<u64, ExtractError> {
        let data = self.data();
        let lfh_offset = entry.local_header_offset;
        let header_end = lfh_offset
            .checked_add(LFH_SIZE as u64)
            .filter(|&e| e <= data.len() as u64)
            .ok_or(ExtractError::CorruptLocalHeader(lfh_offset))?;
        let header = &data[lfh_offset as usize..header_end as usize];

        if &header[0..4] != LFH_SIGNATURE {
            return Err(ExtractError::CorruptLocalHeader(lfh_offset));
        }

        // Variable field lengths sit at fixed positions in the LFH
        let mut cursor = Cursor::new(header);
        cursor.set_position(26);
        let file_name_length = cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| ExtractError::CorruptLocalHeader(lfh_offset))? as u64;
        let extra_field_length = cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| ExtractError::CorruptLocalHeader(lfh_offset))? as u64;

        // Data starts after: LFH (30 bytes) + filename + extra field
        Ok(header_end + file_name_length + extra_field_length)
    }
}
