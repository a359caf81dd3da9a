//! Image decoding and PNG encoding.
//!
//! Inputs may be any format the `image` crate was built with (PNG, JPEG);
//! the format is sniffed from the bytes. Everything sent to the translate
//! service and stored as a translated result is PNG.

use std::io::Cursor;

use bytes::Bytes;
use image::{ImageFormat, ImageReader, RgbaImage};

use crate::error::ImageError;

/// Decode image bytes into RGBA pixels.
///
/// `name` only labels the error.
pub fn decode_image(name: &str, bytes: &[u8]) -> Result<RgbaImage, ImageError> {
    let decode_error = |message: String| ImageError::Decode {
        name: name.to_string(),
        message,
    };

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| decode_error(e.to_string()))?;

    let image = reader.decode().map_err(|e| decode_error(e.to_string()))?;

    Ok(image.to_rgba8())
}

/// Encode RGBA pixels as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Bytes, ImageError> {
    let mut output = Cursor::new(Vec::new());

    image
        .write_to(&mut output, ImageFormat::Png)
        .map_err(|e| ImageError::Encode {
            message: e.to_string(),
        })?;

    Ok(Bytes::from(output.into_inner()))
}
