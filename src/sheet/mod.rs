//! Pixel work around the packer.
//!
//! - [`compose`] draws a packed sheet, [`decompose`] cuts a tile back out
//! - [`restore_sheet`] maps a translated sheet back onto the layout's grid
//! - [`fit_single`] / [`unfit_single`] handle images sent on their own
//! - [`decode_image`] / [`encode_png`] convert between bytes and pixels
//!
//! Everything here is synchronous and CPU-bound; async callers should run it
//! on a blocking thread.

mod codec;
mod compositor;
mod fit;

pub use codec::{decode_image, encode_png};
pub use compositor::{compose, decompose, resize_exact, restore_sheet, SheetStyle};
pub use fit::{fit_single, scale_to_width, scaled_size, unfit_single, FitGeometry};
