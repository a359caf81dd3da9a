//! Batch orchestration.
//!
//! # Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         BatchService::run                       │
//! │                                                                 │
//! │   decode all inputs (blocking pool, concurrent)                 │
//! │        │                                                        │
//! │        ├── single ──▶ fit_single ─▶ translate ─▶ unfit_single   │
//! │        │                                                        │
//! │        └── tiled ───▶ scale to column ─▶ pack ─▶ per sheet:     │
//! │                       compose ─▶ translate ─▶ restore_sheet     │
//! │                       ─▶ decompose ─▶ scale back                │
//! │        │                                                        │
//! │        ▼                                                        │
//! │   originals + translated ─▶ unique_names ─▶ build_archive       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Images (single path) and sheets (tiled path) run concurrently; every
//! translate call passes the shared [`RateLimiter`]. The joins are
//! all-or-nothing: the first failure aborts the batch and no archive is built.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::try_join_all;
use image::RgbaImage;
use tokio::task::spawn_blocking;
use tracing::{debug, info};

use crate::archive::{build_archive, ArchiveEntry};
use crate::error::{BatchError, PackError};
use crate::layout::{column_slots, pack, Sheet, SheetLayout, Tile, TileId};
use crate::sheet::{
    compose, decode_image, decompose, encode_png, fit_single, resize_exact, restore_sheet,
    scale_to_width, unfit_single, SheetStyle,
};
use crate::translate::{
    AspectRatio, ImageSize, RateLimiter, Throttled, Translator, DEFAULT_MIN_INTERVAL,
};

use super::naming::{translated_name, unique_names};

/// Default number of columns per sheet.
pub const DEFAULT_COLUMNS: usize = 2;

/// Default gap between columns and between stacked tiles, in pixels.
pub const DEFAULT_COLUMN_GAP: u32 = 10;

// =============================================================================
// Options
// =============================================================================

/// When to pack images onto shared sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TilingMode {
    /// Tile when the batch has two or more images
    #[default]
    Auto,
    /// Always pack onto sheets, even a single image
    Always,
    /// Send every image on its own
    Never,
}

impl TilingMode {
    fn applies_to(self, image_count: usize) -> bool {
        match self {
            TilingMode::Auto => image_count >= 2,
            TilingMode::Always => true,
            TilingMode::Never => false,
        }
    }
}

/// Settings for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub image_size: ImageSize,
    pub sheet_width: u32,
    pub sheet_height: u32,
    pub columns: usize,
    pub column_gap: u32,
    pub tiling: TilingMode,
    pub style: SheetStyle,
    pub min_interval: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        let image_size = ImageSize::default();
        Self {
            image_size,
            sheet_width: image_size.edge(),
            sheet_height: image_size.edge(),
            columns: DEFAULT_COLUMNS,
            column_gap: DEFAULT_COLUMN_GAP,
            tiling: TilingMode::default(),
            style: SheetStyle::default(),
            min_interval: DEFAULT_MIN_INTERVAL,
        }
    }
}

// =============================================================================
// Input / Output
// =============================================================================

/// One source image as read from disk.
#[derive(Debug, Clone)]
pub struct InputImage {
    /// File name used for the archive entries
    pub name: String,

    /// Encoded bytes, stored verbatim in the archive
    pub bytes: Bytes,
}

impl InputImage {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Result of a successful batch.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    /// The ZIP archive
    pub archive: Bytes,

    /// Entry names in archive order
    pub entry_names: Vec<String>,

    /// Number of sheets sent (0 on the single-image path)
    pub sheet_count: usize,

    /// Number of translate calls made
    pub translate_calls: usize,
}

// =============================================================================
// Batch Service
// =============================================================================

/// Runs a batch of images through the translate service.
///
/// # Example
///
/// ```ignore
/// use sheetpack::batch::{BatchOptions, BatchService, InputImage};
/// use sheetpack::translate::HttpTranslator;
///
/// let translator = HttpTranslator::new("https://example.com/translate", None, timeout)?;
/// let service = BatchService::new(translator, BatchOptions::default());
///
/// let output = service.run(vec![InputImage::new("page.png", bytes)]).await?;
/// tokio::fs::write("translated.zip", &output.archive).await?;
/// ```
pub struct BatchService<T: Translator> {
    translator: Throttled<T>,
    options: BatchOptions,
}

impl<T: Translator> BatchService<T> {
    /// Create a service with its own rate limiter.
    pub fn new(translator: T, options: BatchOptions) -> Self {
        let limiter = Arc::new(RateLimiter::new(options.min_interval));
        Self::with_limiter(translator, options, limiter)
    }

    /// Create a service sharing an existing rate limiter.
    pub fn with_limiter(translator: T, options: BatchOptions, limiter: Arc<RateLimiter>) -> Self {
        Self {
            translator: Throttled::new(translator, limiter),
            options,
        }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Translate every input and package originals and results into a ZIP.
    ///
    /// # Errors
    ///
    /// Any decode, packing, service, encode or archive failure aborts the
    /// whole batch.
    pub async fn run(&self, inputs: Vec<InputImage>) -> Result<BatchOutput, BatchError> {
        if inputs.is_empty() {
            return Err(BatchError::EmptyBatch);
        }

        info!(images = inputs.len(), "Decoding inputs");
        let images = decode_all(&inputs).await?;

        let tiled = self.options.tiling.applies_to(images.len());
        let (translated, sheet_count) = if tiled {
            self.run_tiled(images).await?
        } else {
            (self.run_single(images).await?, 0)
        };
        let translate_calls = if tiled { sheet_count } else { inputs.len() };

        let entries = build_entries(inputs, translated);
        let entry_names: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();

        info!(entries = entries.len(), "Building archive");
        let archive = spawn_blocking(move || build_archive(&entries)).await??;

        info!(
            bytes = archive.len(),
            sheets = sheet_count,
            calls = translate_calls,
            "Batch complete"
        );

        Ok(BatchOutput {
            archive,
            entry_names,
            sheet_count,
            translate_calls,
        })
    }

    /// Send each image on its own padded canvas. Results are in input order.
    async fn run_single(&self, images: Vec<RgbaImage>) -> Result<Vec<Bytes>, BatchError> {
        let size = self.options.image_size;
        let edge = size.edge();
        let background = self.options.style.background;

        info!(images = images.len(), size = %size, "Translating images individually");

        try_join_all(images.into_iter().enumerate().map(|(index, image)| async move {
            let (png, geometry) = spawn_blocking(move || {
                let (canvas, geometry) = fit_single(&image, edge, background);
                encode_png(&canvas).map(|png| (png, geometry))
            })
            .await??;

            debug!(image = index, bytes = png.len(), "Translating image");
            let answer = self
                .translator
                .translate(png, size, Some(AspectRatio::SQUARE))
                .await?;

            let restored = spawn_blocking(move || {
                let translated = decode_image(&format!("translated image {index}"), &answer)?;
                encode_png(&unfit_single(translated, &geometry))
            })
            .await??;

            Ok::<Bytes, BatchError>(restored)
        }))
        .await
    }

    /// Pack images onto sheets, translate each sheet, cut the tiles back out.
    ///
    /// Returns results in input order and the number of sheets.
    async fn run_tiled(&self, images: Vec<RgbaImage>) -> Result<(Vec<Bytes>, usize), BatchError> {
        let options = self.options.clone();
        let image_count = images.len();

        let (packing, originals, prepared) = spawn_blocking(move || {
            let columns = column_slots(options.sheet_width, options.columns, options.column_gap)?;
            let column_width = columns.first().map(|c| c.width).unwrap_or(0);

            let originals: Vec<(u32, u32)> = images.iter().map(|i| i.dimensions()).collect();
            let prepared: Vec<RgbaImage> = images
                .into_iter()
                .map(|image| scale_to_width(&image, column_width).unwrap_or(image))
                .collect();

            let tiles: Vec<Tile> = prepared
                .iter()
                .enumerate()
                .map(|(i, image)| Tile::new(TileId(i), image.width(), image.height()))
                .collect();

            let packing = pack(
                &tiles,
                options.sheet_width,
                options.sheet_height,
                options.columns,
                options.column_gap,
            )?;

            Ok::<_, PackError>((packing, originals, prepared))
        })
        .await??;

        let sheet_count = packing.sheets.len();
        info!(
            images = image_count,
            sheets = sheet_count,
            "Packed images onto sheets"
        );

        let layout = Arc::new(packing.layout);
        let originals = Arc::new(originals);
        let prepared = Arc::new(prepared);

        let per_sheet = try_join_all(packing.sheets.into_iter().map(|sheet| {
            self.translate_sheet(
                sheet,
                Arc::clone(&layout),
                Arc::clone(&prepared),
                Arc::clone(&originals),
            )
        }))
        .await?;

        let mut results: Vec<Option<Bytes>> = vec![None; image_count];
        for (tile_id, png) in per_sheet.into_iter().flatten() {
            if let Some(slot) = results.get_mut(tile_id.0) {
                *slot = Some(png);
            }
        }

        let placed = results.iter().filter(|r| r.is_some()).count();
        let results: Option<Vec<Bytes>> = results.into_iter().collect();
        let results = results.ok_or(PackError::PackingInvariant {
            placed,
            expected: image_count,
        })?;

        Ok((results, sheet_count))
    }

    async fn translate_sheet(
        &self,
        sheet: Sheet,
        layout: Arc<SheetLayout>,
        prepared: Arc<Vec<RgbaImage>>,
        originals: Arc<Vec<(u32, u32)>>,
    ) -> Result<Vec<(TileId, Bytes)>, BatchError> {
        let style = self.options.style;
        let size = self.options.image_size;
        let aspect_ratio = AspectRatio::of(layout.sheet_width, layout.sheet_height);
        let sheet_index = sheet.index;
        let sheet = Arc::new(sheet);

        let png = spawn_blocking({
            let sheet = Arc::clone(&sheet);
            let layout = Arc::clone(&layout);
            move || {
                let canvas = compose(&sheet, &layout, &style, |id| prepared.get(id.0))?;
                encode_png(&canvas)
            }
        })
        .await??;

        debug!(
            sheet = sheet_index,
            tiles = sheet.placements.len(),
            bytes = png.len(),
            "Translating sheet"
        );
        let answer = self.translator.translate(png, size, aspect_ratio).await?;

        let tiles = spawn_blocking(move || {
            let translated = decode_image(&format!("translated sheet {sheet_index}"), &answer)?;
            let restored = restore_sheet(translated, &layout);

            sheet
                .placements
                .iter()
                .map(|placement| {
                    let tile = decompose(&restored, placement);
                    let (width, height) = originals
                        .get(placement.tile_id.0)
                        .copied()
                        .unwrap_or((placement.width, placement.height));
                    encode_png(&resize_exact(tile, width, height))
                        .map(|png| (placement.tile_id, png))
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .await??;

        debug!(sheet = sheet_index, tiles = tiles.len(), "Recovered sheet tiles");
        Ok(tiles)
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn decode_all(inputs: &[InputImage]) -> Result<Vec<RgbaImage>, BatchError> {
    try_join_all(inputs.iter().map(|input| {
        let name = input.name.clone();
        let bytes = input.bytes.clone();
        async move {
            let image = spawn_blocking(move || decode_image(&name, &bytes)).await??;
            Ok::<RgbaImage, BatchError>(image)
        }
    }))
    .await
}

/// Originals then translations, per input, with unique names.
fn build_entries(inputs: Vec<InputImage>, translated: Vec<Bytes>) -> Vec<ArchiveEntry> {
    let mut names = Vec::with_capacity(inputs.len() * 2);
    let mut payloads = Vec::with_capacity(inputs.len() * 2);

    for (input, png) in inputs.into_iter().zip(translated) {
        let translated = translated_name(&input.name);
        names.push(input.name);
        names.push(translated);
        payloads.push(input.bytes);
        payloads.push(png);
    }

    unique_names(&names)
        .into_iter()
        .zip(payloads)
        .map(|(name, payload)| ArchiveEntry::new(name, payload))
        .collect()
}
