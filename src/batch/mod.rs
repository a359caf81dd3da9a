//! Batch orchestration.
//!
//! [`BatchService`] drives a whole run: decode, pack or pad, translate
//! through the rate-limited service, cut results back out, and build the
//! archive. Entry names come from [`translated_name`] and [`unique_names`].

mod naming;
mod service;

pub use naming::{translated_name, unique_names, TRANSLATED_SUFFIX};
pub use service::{
    BatchOptions, BatchOutput, BatchService, InputImage, TilingMode, DEFAULT_COLUMNS,
    DEFAULT_COLUMN_GAP,
};
