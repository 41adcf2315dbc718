//! Shared fixtures: a minimal raw ZIP container builder.
//!
//! The product never writes containers, so the tests assemble their own
//! bytes record by record. That also gives full control over the fields a
//! real archiver would never misproduce: flag bits, stored checksums,
//! declared sizes and signatures.

#![allow(dead_code)]

use std::io::Write;

use flate2::Compression;
use flate2::write::DeflateEncoder;

pub const MOD_TIME: u16 = (13 << 11) | (30 << 5) | 10;
pub const MOD_DATE: u16 = (44 << 9) | (6 << 5) | 15;

/// One entry of a synthetic container, described at the wire level.
///
/// `payload` holds the exact bytes placed after the local header; tests
/// mutate the public fields to produce deliberately broken containers.
pub struct EntrySpec {
    pub raw_name: Vec<u8>,
    pub payload: Vec<u8>,
    pub method: u16,
    pub crc32: u32,
    pub uncompressed_size: u32,
    pub utf8_flag: bool,
}

impl EntrySpec {
    /// A stored (uncompressed) file entry.
    pub fn stored(name: &str, data: &[u8]) -> Self {
        EntrySpec {
            raw_name: name.as_bytes().to_vec(),
            payload: data.to_vec(),
            method: 0,
            crc32: crc32(data),
            uncompressed_size: data.len() as u32,
            utf8_flag: false,
        }
    }

    /// A deflate-compressed file entry.
    pub fn deflated(name: &str, data: &[u8]) -> Self {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        let payload = encoder.finish().unwrap();
        EntrySpec {
            raw_name: name.as_bytes().to_vec(),
            payload,
            method: 8,
            crc32: crc32(data),
            uncompressed_size: data.len() as u32,
            utf8_flag: false,
        }
    }

    /// A directory marker (trailing slash, no data).
    pub fn dir(name: &str) -> Self {
        let raw_name = if name.ends_with('/') {
            name.as_bytes().to_vec()
        } else {
            format!("{name}/").into_bytes()
        };
        EntrySpec {
            raw_name,
            payload: Vec::new(),
            method: 0,
            crc32: 0,
            uncompressed_size: 0,
            utf8_flag: false,
        }
    }

    /// Same entry with a different raw name byte sequence.
    pub fn with_raw_name(mut self, raw: &[u8]) -> Self {
        self.raw_name = raw.to_vec();
        self
    }

    pub fn with_utf8_flag(mut self) -> Self {
        self.utf8_flag = true;
        self
    }

    fn flags(&self) -> u16 {
        if self.utf8_flag { 1 << 11 } else { 0 }
    }
}

pub fn crc32(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Assemble a complete container: local records, central directory, EOCD.
pub fn build_archive(entries: &[EntrySpec]) -> Vec<u8> {
    build_archive_with_comment(entries, b"")
}

/// Same, with a trailing archive comment after the EOCD.
pub fn build_archive_with_comment(entries: &[EntrySpec], comment: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut lfh_offsets = Vec::with_capacity(entries.len());

    // Local file headers + data
    for entry in entries {
        lfh_offsets.push(buf.len() as u32);
        buf.extend_from_slice(b"PK\x03\x04");
        put_u16(&mut buf, 20); // version needed
        put_u16(&mut buf, entry.flags());
        put_u16(&mut buf, entry.method);
        put_u16(&mut buf, MOD_TIME);
        put_u16(&mut buf, MOD_DATE);
        put_u32(&mut buf, entry.crc32);
        put_u32(&mut buf, entry.payload.len() as u32);
        put_u32(&mut buf, entry.uncompressed_size);
        put_u16(&mut buf, entry.raw_name.len() as u16);
        put_u16(&mut buf, 0); // extra length
        buf.extend_from_slice(&entry.raw_name);
        buf.extend_from_slice(&entry.payload);
    }

    // Central directory
    let cd_offset = buf.len() as u32;
    for (entry, lfh_offset) in entries.iter().zip(&lfh_offsets) {
        buf.extend_from_slice(b"PK\x01\x02");
        put_u16(&mut buf, 20); // version made by
        put_u16(&mut buf, 20); // version needed
        put_u16(&mut buf, entry.flags());
        put_u16(&mut buf, entry.method);
        put_u16(&mut buf, MOD_TIME);
        put_u16(&mut buf, MOD_DATE);
        put_u32(&mut buf, entry.crc32);
        put_u32(&mut buf, entry.payload.len() as u32);
        put_u32(&mut buf, entry.uncompressed_size);
        put_u16(&mut buf, entry.raw_name.len() as u16);
        put_u16(&mut buf, 0); // extra length
        put_u16(&mut buf, 0); // comment length
        put_u16(&mut buf, 0); // disk number start
        put_u16(&mut buf, 0); // internal attrs
        put_u32(&mut buf, 0); // external attrs
        put_u32(&mut buf, *lfh_offset);
        buf.extend_from_slice(&entry.raw_name);
    }
    let cd_size = buf.len() as u32 - cd_offset;

    // End of central directory
    buf.extend_from_slice(b"PK\x05\x06");
    put_u16(&mut buf, 0); // disk number
    put_u16(&mut buf, 0); // disk with cd
    put_u16(&mut buf, entries.len() as u16);
    put_u16(&mut buf, entries.len() as u16);
    put_u32(&mut buf, cd_size);
    put_u32(&mut buf, cd_offset);
    put_u16(&mut buf, comment.len() as u16);
    buf.extend_from_slice(comment);

    buf
}

fn put_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}
