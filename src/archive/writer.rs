//! Store-mode ZIP writer.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ local header #0 (30 + name)  │
//! │ payload #0                   │
//! │ ...                          │
//! │ local header #n (30 + name)  │
//! │ payload #n                   │
//! ├──────────────────────────────┤  <- central directory offset
//! │ central record #0 (46 + name)│
//! │ ...                          │
//! │ central record #n (46 + name)│
//! ├──────────────────────────────┤
//! │ end record (22)              │
//! └──────────────────────────────┘
//! ```
//!
//! All multi-byte integers are little-endian. Payloads are stored as-is
//! (method 0), so compressed and uncompressed sizes are always equal.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use super::crc::crc32;
use super::dos_time::DosDateTime;
use crate::error::ArchiveError;

// =============================================================================
// Constants
// =============================================================================

/// Local file header signature ("PK\x03\x04")
const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4B50;

/// Central directory file header signature ("PK\x01\x02")
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4B50;

/// End of central directory signature ("PK\x05\x06")
const END_RECORD_SIGNATURE: u32 = 0x0605_4B50;

/// Size of the fixed part of a local header
pub const LOCAL_HEADER_SIZE: usize = 30;

/// Size of the fixed part of a central directory record
pub const CENTRAL_HEADER_SIZE: usize = 46;

/// Size of the end of central directory record (without comment)
pub const END_RECORD_SIZE: usize = 22;

/// Version 2.0: the baseline for stored entries and directories
const VERSION: u16 = 20;

/// General purpose flag bit 11: name is UTF-8
const FLAG_UTF8: u16 = 1 << 11;

/// Compression method 0: stored
const METHOD_STORED: u16 = 0;

const MAX_ENTRIES: usize = u16::MAX as usize;
const MAX_NAME_LEN: usize = u16::MAX as usize;
const MAX_OFFSET: u64 = u32::MAX as u64;

// =============================================================================
// Archive Entry
// =============================================================================

/// One named file to be stored in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub payload: Bytes,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }
}

/// Per-entry values the central directory repeats from the local header.
struct EntryRecord<'a> {
    name: &'a [u8],
    crc: u32,
    size: u32,
    header_offset: u32,
}

// =============================================================================
// Archive Writer
// =============================================================================

/// Serializes entries into a complete ZIP archive.
///
/// The writer is synchronous and performs no I/O. It does not deduplicate
/// names; entries are written exactly in the order given.
///
/// # Example
///
/// ```
/// use sheetpack::archive::{ArchiveEntry, ArchiveWriter, DosDateTime};
///
/// let writer = ArchiveWriter::with_timestamp(DosDateTime::EPOCH);
/// let archive = writer
///     .build(&[ArchiveEntry::new("hello.txt", &b"hello"[..])])
///     .unwrap();
///
/// assert_eq!(&archive[..4], b"PK\x03\x04");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ArchiveWriter {
    timestamp: DosDateTime,
}

impl ArchiveWriter {
    /// Writer stamping entries with the current local time.
    pub fn new() -> Self {
        Self {
            timestamp: DosDateTime::now(),
        }
    }

    /// Writer stamping entries with a fixed time, for reproducible output.
    pub fn with_timestamp(timestamp: DosDateTime) -> Self {
        Self { timestamp }
    }

    pub fn timestamp(&self) -> DosDateTime {
        self.timestamp
    }

    /// Build the archive.
    ///
    /// # Errors
    ///
    /// Returns an error, and no partial output, if the entries exceed what the
    /// classic ZIP layout can address: more than 65535 entries, a name longer
    /// than 65535 bytes, or any size or offset beyond 4 GiB.
    pub fn build(&self, entries: &[ArchiveEntry]) -> Result<Bytes, ArchiveError> {
        if entries.len() > MAX_ENTRIES {
            return Err(ArchiveError::TooManyEntries(entries.len()));
        }

        let capacity = Self::encoded_len(entries);
        if capacity > MAX_OFFSET {
            return Err(ArchiveError::ArchiveTooLarge(capacity));
        }

        let mut out = BytesMut::with_capacity(capacity as usize);
        let mut records = Vec::with_capacity(entries.len());

        for entry in entries {
            let name = entry.name.as_bytes();
            if name.len() > MAX_NAME_LEN {
                return Err(ArchiveError::NameTooLong {
                    name: entry.name.clone(),
                    len: name.len(),
                });
            }
            let size = u32::try_from(entry.payload.len()).map_err(|_| {
                ArchiveError::EntryTooLarge {
                    name: entry.name.clone(),
                    size: entry.payload.len(),
                }
            })?;

            let record = EntryRecord {
                name,
                crc: crc32(&entry.payload),
                size,
                header_offset: out.len() as u32,
            };

            self.put_local_header(&mut out, &record);
            out.put_slice(name);
            out.put_slice(&entry.payload);

            debug!(
                name = %entry.name,
                size,
                crc = format_args!("{:08x}", record.crc),
                offset = record.header_offset,
                "Stored archive entry"
            );
            records.push(record);
        }

        let directory_offset = out.len() as u32;
        for record in &records {
            self.put_central_header(&mut out, record);
            out.put_slice(record.name);
        }
        let directory_size = out.len() as u32 - directory_offset;

        put_end_record(
            &mut out,
            records.len() as u16,
            directory_size,
            directory_offset,
        );

        Ok(out.freeze())
    }

    /// Exact byte length of the archive for `entries`.
    pub fn encoded_len(entries: &[ArchiveEntry]) -> u64 {
        let per_entry: u64 = entries
            .iter()
            .map(|e| {
                (LOCAL_HEADER_SIZE + CENTRAL_HEADER_SIZE) as u64
                    + 2 * e.name.len() as u64
                    + e.payload.len() as u64
            })
            .sum();
        per_entry + END_RECORD_SIZE as u64
    }

    fn put_local_header(&self, out: &mut BytesMut, record: &EntryRecord<'_>) {
        out.put_u32_le(LOCAL_HEADER_SIGNATURE);
        out.put_u16_le(VERSION);
        out.put_u16_le(FLAG_UTF8);
        out.put_u16_le(METHOD_STORED);
        out.put_u16_le(self.timestamp.time);
        out.put_u16_le(self.timestamp.date);
        out.put_u32_le(record.crc);
        out.put_u32_le(record.size); // compressed
        out.put_u32_le(record.size); // uncompressed
        out.put_u16_le(record.name.len() as u16);
        out.put_u16_le(0); // extra field length
    }

    fn put_central_header(&self, out: &mut BytesMut, record: &EntryRecord<'_>) {
        out.put_u32_le(CENTRAL_HEADER_SIGNATURE);
        out.put_u16_le(VERSION); // made by
        out.put_u16_le(VERSION); // needed to extract
        out.put_u16_le(FLAG_UTF8);
        out.put_u16_le(METHOD_STORED);
        out.put_u16_le(self.timestamp.time);
        out.put_u16_le(self.timestamp.date);
        out.put_u32_le(record.crc);
        out.put_u32_le(record.size);
        out.put_u32_le(record.size);
        out.put_u16_le(record.name.len() as u16);
        out.put_u16_le(0); // extra field length
        out.put_u16_le(0); // comment length
        out.put_u16_le(0); // disk number start
        out.put_u16_le(0); // internal attributes
        out.put_u32_le(0); // external attributes
        out.put_u32_le(record.header_offset);
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn put_end_record(out: &mut BytesMut, count: u16, directory_size: u32, directory_offset: u32) {
    out.put_u32_le(END_RECORD_SIGNATURE);
    out.put_u16_le(0); // this disk
    out.put_u16_le(0); // disk with central directory
    out.put_u16_le(count); // entries on this disk
    out.put_u16_le(count); // total entries
    out.put_u32_le(directory_size);
    out.put_u32_le(directory_offset);
    out.put_u16_le(0); // comment length
}

/// Build an archive stamped with the current local time.
pub fn build_archive(entries: &[ArchiveEntry]) -> Result<Bytes, ArchiveError> {
    ArchiveWriter::new().build(entries)
}

// =============================================================================
// Tests
// =============================================================================
