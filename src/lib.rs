//! # sheetpack
//!
//! Batch images through an image translation service that caps the resolution
//! it works at and the rate it accepts requests.
//!
//! Instead of sending every image on its own, sheetpack packs many images onto
//! a few fixed-size sheets, translates each sheet with a single call, cuts the
//! translated tiles back out and writes originals and translations to a ZIP
//! archive.
//!
//! ## Architecture
//!
//! - [`layout`] - Column geometry and the greedy best-fit packer
//! - [`sheet`] - Image decode/encode, sheet composition and decomposition
//! - [`translate`] - Translator trait, HTTP client and rate limiter
//! - [`archive`] - Store-only ZIP writer with CRC-32 and DOS timestamps
//! - [`batch`] - Orchestration of a whole run
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use sheetpack::{BatchOptions, BatchService, HttpTranslator, InputImage, DEFAULT_TIMEOUT};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let translator = HttpTranslator::new(
//!         "https://translate.example.com/v1/images",
//!         None,
//!         DEFAULT_TIMEOUT,
//!     )?;
//!     let service = BatchService::new(translator, BatchOptions::default());
//!
//!     let page = tokio::fs::read("page.png").await?;
//!     let output = service.run(vec![InputImage::new("page.png", page)]).await?;
//!
//!     tokio::fs::write("translated.zip", &output.archive).await?;
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod batch;
pub mod config;
pub mod error;
pub mod layout;
pub mod sheet;
pub mod translate;

// Re-export commonly used types
pub use archive::{build_archive, crc32, ArchiveEntry, ArchiveWriter, Crc32, DosDateTime};
pub use batch::{
    translated_name, unique_names, BatchOptions, BatchOutput, BatchService, InputImage, TilingMode,
};
pub use config::{parse_hex_color, Config};
pub use error::{ArchiveError, BatchError, ImageError, PackError, ServiceError};
pub use layout::{
    column_slots, pack, ColumnSlot, Packing, Placement, Sheet, SheetLayout, Tile, TileId,
};
pub use sheet::{compose, decompose, SheetStyle};
pub use translate::{
    AspectRatio, HttpTranslator, ImageSize, RateLimiter, Throttled, Translator, DEFAULT_TIMEOUT,
};
