//! Sheet layout and tile packing.
//!
//! The packer places variable-height tiles into fixed-size sheets divided
//! into equal-width columns, recording exact geometry for every tile so it
//! can later be cut back out of a combined image.
//!
//! ```text
//!  sheet_width
//! ┌────────┬──┬────────┐
//! │ tile 0 │  │ tile 1 │
//! │        │g │────────│ <- column_gap strip above a stacked tile
//! │        │a │ tile 3 │
//! │        │p │────────│
//! │        │  │ tile 4 │
//! └────────┴──┴────────┘
//!  column 0    column 1
//! ```
//!
//! Packing is deterministic: the same tiles always produce the same layout.

mod columns;
mod packer;
mod types;

pub use columns::column_slots;
pub use packer::pack;
pub use types::{ColumnSlot, Packing, Placement, Sheet, SheetLayout, Tile, TileId};
