//! Configuration for the sheetpack command line.
//!
//! Every option can be given as a flag or as an environment variable with the
//! `SHEETPACK_` prefix:
//!
//! - `SHEETPACK_ENDPOINT` - Translate service URL (required)
//! - `SHEETPACK_API_KEY` - Bearer token for the service
//! - `SHEETPACK_OUTPUT` - Archive path (default: translated.zip)
//! - `SHEETPACK_IMAGE_SIZE` - Service resolution tier, 1K/2K/4K (default: 2K)
//! - `SHEETPACK_SHEET_WIDTH` / `SHEETPACK_SHEET_HEIGHT` - Sheet size (default: tier edge)
//! - `SHEETPACK_COLUMNS` - Columns per sheet (default: 2)
//! - `SHEETPACK_COLUMN_GAP` - Gap in pixels (default: 10)
//! - `SHEETPACK_TILING` - auto, always or never (default: auto)
//! - `SHEETPACK_MIN_INTERVAL_MS` - Spacing between service calls (default: 3300)
//! - `SHEETPACK_TIMEOUT_SECS` - Per-request timeout (default: 120)
//! - `SHEETPACK_BACKGROUND` / `SHEETPACK_DIVIDER` - Sheet colors as hex

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use image::Rgba;

use crate::batch::{BatchOptions, TilingMode, DEFAULT_COLUMNS, DEFAULT_COLUMN_GAP};
use crate::sheet::SheetStyle;
use crate::translate::ImageSize;

// =============================================================================
// Default Values
// =============================================================================

/// Default archive path.
pub const DEFAULT_OUTPUT: &str = "translated.zip";

/// Default spacing between translate calls in milliseconds.
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 3300;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default sheet background.
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

/// Default divider color.
pub const DEFAULT_DIVIDER: &str = "#000000";

/// Upper bound for the column count.
const MAX_COLUMNS: usize = 16;

// =============================================================================
// CLI Arguments
// =============================================================================

/// sheetpack - batch images through a size-limited translation service.
///
/// Packs the input images onto shared sheets, translates each sheet, cuts the
/// results back apart and writes originals and translations to a ZIP archive.
#[derive(Parser, Debug, Clone)]
#[command(name = "sheetpack")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Images to translate (PNG or JPEG).
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Path of the ZIP archive to write.
    #[arg(short, long, default_value = DEFAULT_OUTPUT, env = "SHEETPACK_OUTPUT")]
    pub output: PathBuf,

    // =========================================================================
    // Service Configuration
    // =========================================================================
    /// Translate service URL.
    #[arg(long, env = "SHEETPACK_ENDPOINT")]
    pub endpoint: String,

    /// Bearer token sent to the service.
    #[arg(long, env = "SHEETPACK_API_KEY")]
    pub api_key: Option<String>,

    /// Resolution tier requested from the service (1K, 2K or 4K).
    #[arg(long, default_value_t = ImageSize::default(), env = "SHEETPACK_IMAGE_SIZE")]
    pub image_size: ImageSize,

    /// Minimum time between two service calls, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_MIN_INTERVAL_MS, env = "SHEETPACK_MIN_INTERVAL_MS")]
    pub min_interval_ms: u64,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, env = "SHEETPACK_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    // =========================================================================
    // Sheet Configuration
    // =========================================================================
    /// Sheet width in pixels. Defaults to the image size edge.
    #[arg(long, env = "SHEETPACK_SHEET_WIDTH")]
    pub sheet_width: Option<u32>,

    /// Sheet height in pixels. Defaults to the image size edge.
    #[arg(long, env = "SHEETPACK_SHEET_HEIGHT")]
    pub sheet_height: Option<u32>,

    /// Number of columns per sheet.
    #[arg(long, default_value_t = DEFAULT_COLUMNS, env = "SHEETPACK_COLUMNS")]
    pub columns: usize,

    /// Gap between columns and between stacked images, in pixels.
    #[arg(long, default_value_t = DEFAULT_COLUMN_GAP, env = "SHEETPACK_COLUMN_GAP")]
    pub column_gap: u32,

    /// When to pack images onto shared sheets.
    #[arg(long, value_enum, default_value_t = TilingMode::Auto, env = "SHEETPACK_TILING")]
    pub tiling: TilingMode,

    /// Sheet background color (#rrggbb or #rrggbbaa).
    #[arg(long, default_value = DEFAULT_BACKGROUND, env = "SHEETPACK_BACKGROUND")]
    pub background: String,

    /// Divider color between images (#rrggbb or #rrggbbaa).
    #[arg(long, default_value = DEFAULT_DIVIDER, env = "SHEETPACK_DIVIDER")]
    pub divider: String,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.inputs.is_empty() {
            return Err("At least one input image is required".to_string());
        }

        if self.endpoint.trim().is_empty() {
            return Err(
                "Translate endpoint is required. Set --endpoint or SHEETPACK_ENDPOINT".to_string(),
            );
        }

        let edge = self.image_size.edge();
        let (width, height) = self.sheet_size();
        if width == 0 || height == 0 {
            return Err("sheet dimensions must be greater than 0".to_string());
        }
        if width > edge || height > edge {
            return Err(format!(
                "sheet {}x{} exceeds the {} service limit of {}x{}",
                width, height, self.image_size, edge, edge
            ));
        }

        if self.columns == 0 || self.columns > MAX_COLUMNS {
            return Err(format!("columns must be between 1 and {}", MAX_COLUMNS));
        }

        let reserved = self.columns as u64 + self.column_gap as u64 * (self.columns as u64 - 1);
        if reserved > width as u64 {
            return Err(format!(
                "{} columns with a {}px gap do not fit a {}px wide sheet",
                self.columns, self.column_gap, width
            ));
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        parse_hex_color(&self.background).map_err(|e| format!("background: {}", e))?;
        parse_hex_color(&self.divider).map_err(|e| format!("divider: {}", e))?;

        Ok(())
    }

    /// Sheet dimensions, falling back to the image size edge.
    pub fn sheet_size(&self) -> (u32, u32) {
        let edge = self.image_size.edge();
        (
            self.sheet_width.unwrap_or(edge),
            self.sheet_height.unwrap_or(edge),
        )
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Options for the batch service (call `validate()` first).
    pub fn batch_options(&self) -> Result<BatchOptions, String> {
        let (sheet_width, sheet_height) = self.sheet_size();
        Ok(BatchOptions {
            image_size: self.image_size,
            sheet_width,
            sheet_height,
            columns: self.columns,
            column_gap: self.column_gap,
            tiling: self.tiling,
            style: SheetStyle {
                background: parse_hex_color(&self.background)?,
                divider: parse_hex_color(&self.divider)?,
            },
            min_interval: self.min_interval(),
        })
    }
}

/// Parse `#rrggbb` or `#rrggbbaa` (the `#` is optional).
pub fn parse_hex_color(value: &str) -> Result<Rgba<u8>, String> {
    let hex = value.trim().trim_start_matches('#');
    if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("invalid color '{}', expected #rrggbb or #rrggbbaa", value));
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };

    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

// =============================================================================
// Tests
// =============================================================================
