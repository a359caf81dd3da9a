//! Drawing tiles onto sheets and cutting them back out.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::error::ImageError;
use crate::layout::{Placement, Sheet, SheetLayout, TileId};

/// Colors used when composing a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetStyle {
    /// Fill for space no tile covers
    pub background: Rgba<u8>,

    /// Fill for the column gutters and the strips between stacked tiles
    pub divider: Rgba<u8>,
}

impl Default for SheetStyle {
    fn default() -> Self {
        Self {
            background: Rgba([255, 255, 255, 255]),
            divider: Rgba([0, 0, 0, 255]),
        }
    }
}

/// Draw a sheet.
///
/// The canvas is filled with `style.background`, each placement's pixels are
/// copied to its offset, then divider bars are drawn over every gutter
/// between columns (full sheet height) and over the `column_gap` strip above
/// every stacked tile (full column width).
///
/// # Errors
///
/// Returns [`ImageError::MissingPixels`] when `lookup` has no image for a
/// placed tile and [`ImageError::SizeMismatch`] when its size differs from
/// the placement.
pub fn compose<'a, F>(
    sheet: &Sheet,
    layout: &SheetLayout,
    style: &SheetStyle,
    lookup: F,
) -> Result<RgbaImage, ImageError>
where
    F: Fn(TileId) -> Option<&'a RgbaImage>,
{
    let mut canvas =
        RgbaImage::from_pixel(layout.sheet_width, layout.sheet_height, style.background);

    for placement in &sheet.placements {
        let pixels = lookup(placement.tile_id).ok_or(ImageError::MissingPixels(placement.tile_id))?;

        if pixels.dimensions() != (placement.width, placement.height) {
            return Err(ImageError::SizeMismatch {
                tile: placement.tile_id,
                expected: (placement.width, placement.height),
                actual: pixels.dimensions(),
            });
        }

        imageops::replace(&mut canvas, pixels, placement.x as i64, placement.y as i64);
    }

    for (x, width) in layout.gutters() {
        fill_rect(&mut canvas, x, 0, width, layout.sheet_height, style.divider);
    }

    for placement in &sheet.placements {
        let (Some(gap_start), Some(slot)) =
            (placement.gap_start, layout.columns.get(placement.column))
        else {
            continue;
        };
        fill_rect(
            &mut canvas,
            slot.x,
            gap_start,
            slot.width,
            layout.column_gap,
            style.divider,
        );
    }

    Ok(canvas)
}

/// Cut a placed tile out of a composed sheet.
///
/// The sheet must have the layout's dimensions; see [`restore_sheet`].
pub fn decompose(composed: &RgbaImage, placement: &Placement) -> RgbaImage {
    imageops::crop_imm(
        composed,
        placement.x,
        placement.y,
        placement.width,
        placement.height,
    )
    .to_image()
}

/// Bring a translated sheet back to the layout's pixel grid.
///
/// The service may answer at a different resolution than it was sent.
/// Images already at sheet size are returned unchanged.
pub fn restore_sheet(translated: RgbaImage, layout: &SheetLayout) -> RgbaImage {
    resize_exact(translated, layout.sheet_width, layout.sheet_height)
}

/// Resize to exactly `width x height` with Lanczos3, or pass through if
/// already that size.
pub fn resize_exact(image: RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) {
        image
    } else {
        imageops::resize(&image, width, height, FilterType::Lanczos3)
    }
}

fn fill_rect(canvas: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
    let x_end = x.saturating_add(width).min(canvas.width());
    let y_end = y.saturating_add(height).min(canvas.height());

    for py in y..y_end {
        for px in x..x_end {
            canvas.put_pixel(px, py, color);
        }
    }
}
