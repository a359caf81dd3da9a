//! Geometry for images sent to the service one at a time.
//!
//! A single image is scaled down so its long edge fits the service's edge
//! length, then centered on a square canvas. The returned [`FitGeometry`]
//! remembers where the content went so the translated answer can be cropped
//! and scaled back to the original size.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use super::compositor::resize_exact;

/// Where a single image was drawn on its padded canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitGeometry {
    /// Side of the square canvas
    pub canvas: u32,

    /// Content rectangle on the canvas
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,

    /// Size of the input before scaling
    pub original_width: u32,
    pub original_height: u32,
}

/// Size after shrinking `(width, height)` to fit inside `max_width x max_height`,
/// keeping the aspect ratio. Never upscales and never returns a zero side.
pub fn scaled_size(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let (w, h) = (width as u64, height as u64);
    let (mw, mh) = (max_width as u64, max_height as u64);

    // Compare mw/w against mh/h without floating point
    if mw * h <= mh * w {
        let scaled_h = (h * mw + w / 2) / w;
        (max_width, scaled_h.clamp(1, mh) as u32)
    } else {
        let scaled_w = (w * mh + h / 2) / h;
        (scaled_w.clamp(1, mw) as u32, max_height)
    }
}

/// Shrink an image to at most `max_width` pixels wide, keeping its aspect ratio.
///
/// Returns `None` if the image is already narrow enough.
pub fn scale_to_width(image: &RgbaImage, max_width: u32) -> Option<RgbaImage> {
    let (width, height) = image.dimensions();
    if width <= max_width {
        return None;
    }

    let (w, h) = scaled_size(width, height, max_width, u32::MAX);
    Some(imageops::resize(image, w, h, FilterType::Lanczos3))
}

/// Scale down and pad an image onto an `edge x edge` canvas.
pub fn fit_single(image: &RgbaImage, edge: u32, background: Rgba<u8>) -> (RgbaImage, FitGeometry) {
    let (original_width, original_height) = image.dimensions();
    let (width, height) = scaled_size(original_width, original_height, edge, edge);

    let geometry = FitGeometry {
        canvas: edge,
        x: (edge - width) / 2,
        y: (edge - height) / 2,
        width,
        height,
        original_width,
        original_height,
    };

    let mut canvas = RgbaImage::from_pixel(edge, edge, background);
    if (width, height) == (original_width, original_height) {
        imageops::replace(&mut canvas, image, geometry.x as i64, geometry.y as i64);
    } else {
        let scaled = imageops::resize(image, width, height, FilterType::Lanczos3);
        imageops::replace(&mut canvas, &scaled, geometry.x as i64, geometry.y as i64);
    }

    (canvas, geometry)
}

/// Recover the original-sized image from a translated canvas.
pub fn unfit_single(translated: RgbaImage, geometry: &FitGeometry) -> RgbaImage {
    let canvas = resize_exact(translated, geometry.canvas, geometry.canvas);
    let content = imageops::crop_imm(
        &canvas,
        geometry.x,
        geometry.y,
        geometry.width,
        geometry.height,
    )
    .to_image();

    resize_exact(content, geometry.original_width, geometry.original_height)
}
