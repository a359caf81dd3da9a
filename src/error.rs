use thiserror::Error;

use crate::layout::TileId;

/// Errors raised by the tile packer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    /// Sheet geometry cannot hold any column
    #[error("Invalid sheet layout: {reason}")]
    InvalidLayout { reason: String },

    /// Tile has a zero dimension
    #[error("Tile {tile} has an empty dimension ({width}x{height})")]
    EmptyTile { tile: TileId, width: u32, height: u32 },

    /// Tile cannot fit a column of an empty sheet
    #[error(
        "Tile {tile} ({width}x{height}) does not fit a {max_width}x{max_height} column slot"
    )]
    TileTooLarge {
        tile: TileId,
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },

    /// The packer lost or duplicated a tile. This is a bug, not an input problem.
    #[error("Packing invariant violated: placed {placed} of {expected} tiles")]
    PackingInvariant { placed: usize, expected: usize },
}

/// Errors raised while serializing a ZIP archive.
///
/// The classic (non-ZIP64) layout stores counts in 16 bits and sizes and
/// offsets in 32 bits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArchiveError {
    #[error("Too many entries: {0} (limit is 65535)")]
    TooManyEntries(usize),

    #[error("Entry name too long: {len} bytes in {name:?}")]
    NameTooLong { name: String, len: usize },

    #[error("Entry {name:?} is too large: {size} bytes")]
    EntryTooLarge { name: String, size: usize },

    #[error("Archive exceeds 4 GiB at offset {0}")]
    ArchiveTooLarge(u64),
}

/// Errors from the external translate service.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// Service answered with a non-2xx status
    #[error("Translate service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Response decoded but carried no image
    #[error("Translate service response contained no image data")]
    MissingImage,

    /// Transport failure or timeout
    #[error("Translate request failed: {0}")]
    Request(String),

    /// Response body was not the expected JSON
    #[error("Invalid translate response: {0}")]
    InvalidResponse(String),
}

/// Errors from pixel decoding, encoding and compositing.
#[derive(Debug, Clone, Error)]
pub enum ImageError {
    #[error("Failed to decode image {name}: {message}")]
    Decode { name: String, message: String },

    #[error("Failed to encode image: {message}")]
    Encode { message: String },

    #[error("No pixels available for tile {0}")]
    MissingPixels(TileId),

    /// Pixel buffer does not match the placed rectangle
    #[error("Tile {tile} pixels are {actual:?}, placement expects {expected:?}")]
    SizeMismatch {
        tile: TileId,
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Top-level errors for a batch run.
///
/// Any of these aborts the batch; no archive is produced.
#[derive(Debug, Clone, Error)]
pub enum BatchError {
    #[error("Packing error: {0}")]
    Pack(#[from] PackError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Batch contains no images")]
    EmptyBatch,

    /// A blocking worker panicked or was cancelled
    #[error("Worker task failed: {0}")]
    Task(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<tokio::task::JoinError> for BatchError {
    fn from(err: tokio::task::JoinError) -> Self {
        BatchError::Task(err.to_string())
    }
}

impl From<std::io::Error> for BatchError {
    fn from(err: std::io::Error) -> Self {
        BatchError::Io(err.to_string())
    }
}
