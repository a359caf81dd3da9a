//! ZIP archive output.
//!
//! A minimal writer for store-mode (uncompressed) ZIP files:
//!
//! - [`crc32`] / [`Crc32`]: table-driven CRC-32 for entry checksums
//! - [`DosDateTime`]: the legacy 2-second-resolution timestamp encoding
//! - [`ArchiveWriter`]: local headers, central directory and end record
//!
//! Any standard ZIP reader can open the output. Extraction and compression
//! are not supported.

mod crc;
mod dos_time;
mod writer;

pub use crc::{crc32, Crc32};
pub use dos_time::DosDateTime;
pub use writer::{
    build_archive, ArchiveEntry, ArchiveWriter, CENTRAL_HEADER_SIZE, END_RECORD_SIZE,
    LOCAL_HEADER_SIZE,
};
