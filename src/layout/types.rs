//! Geometry types shared by the packer and the compositor.

use std::fmt;

/// Opaque identifier of a tile.
///
/// The orchestrator uses the input index; the packer never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub usize);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A rectangle to be placed on a sheet.
///
/// Only geometry lives here; pixels stay with the caller and are looked up
/// by [`TileId`] when compositing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub id: TileId,
    pub width: u32,
    pub height: u32,
}

impl Tile {
    pub fn new(id: TileId, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }
}

/// A vertical column slot of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSlot {
    /// Column index (0 = leftmost)
    pub index: usize,

    /// Left edge in pixels
    pub x: u32,

    /// Width in pixels
    pub width: u32,
}

impl ColumnSlot {
    /// Right edge (exclusive).
    pub fn right(&self) -> u32 {
        self.x + self.width
    }
}

/// Where a tile was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub tile_id: TileId,

    /// Index of the sheet holding the tile
    pub sheet_index: usize,

    /// Column the tile was stacked into
    pub column: usize,

    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,

    /// First row of the divider strip above this tile, for every tile that is
    /// not the first in its column. The strip ends at `y`.
    pub gap_start: Option<u32>,
}

impl Placement {
    /// Right edge (exclusive).
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Whether two rectangles share at least one pixel.
    pub fn intersects(&self, other: &Placement) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// One fixed-size canvas and the tiles assigned to it, in placement order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub index: usize,
    pub placements: Vec<Placement>,
}

/// Geometry common to every sheet of a packing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub sheet_width: u32,
    pub sheet_height: u32,
    pub column_gap: u32,
    pub columns: Vec<ColumnSlot>,
}

impl SheetLayout {
    /// Width available to a single tile.
    ///
    /// All columns share this width; the floor remainder goes to the gaps.
    pub fn column_width(&self) -> u32 {
        self.columns.first().map(|c| c.width).unwrap_or(0)
    }

    /// Horizontal strips between adjacent columns as `(x, width)`.
    pub fn gutters(&self) -> Vec<(u32, u32)> {
        self.columns
            .windows(2)
            .map(|pair| (pair[0].right(), pair[1].x - pair[0].right()))
            .collect()
    }
}

/// Result of packing a tile set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packing {
    pub layout: SheetLayout,
    pub sheets: Vec<Sheet>,
}

impl Packing {
    /// Total number of placements across all sheets.
    pub fn placement_count(&self) -> usize {
        self.sheets.iter().map(|s| s.placements.len()).sum()
    }

    /// Iterate over every placement, sheet by sheet.
    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.sheets.iter().flat_map(|s| s.placements.iter())
    }

    /// Find the placement of a tile.
    pub fn placement_of(&self, id: TileId) -> Option<&Placement> {
        self.placements().find(|p| p.tile_id == id)
    }
}
