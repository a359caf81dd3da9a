//! Greedy column packer.
//!
//! Tiles are sorted tallest-first and stacked into the columns of the current
//! sheet. Each tile goes to the column with the least vertical space left
//! after placing it (best fit, lowest index on ties). After every placement
//! the scan restarts from the tallest remaining tile, so a shorter tile can
//! fill a column a taller one could not. When no remaining tile fits anywhere,
//! the sheet is sealed and a fresh one opened.

use tracing::debug;

use crate::error::PackError;

use super::columns::column_slots;
use super::types::{ColumnSlot, Packing, Placement, Sheet, SheetLayout, Tile, TileId};

// =============================================================================
// Sheet Cursor
// =============================================================================

/// Vertical fill state of one column.
#[derive(Debug, Clone, Copy, Default)]
struct ColumnCursor {
    height_used: u32,
    count: u32,
}

/// Fill state of the sheet currently being packed.
#[derive(Debug)]
struct SheetCursor {
    index: usize,
    columns: Vec<ColumnCursor>,
    placements: Vec<Placement>,
}

impl SheetCursor {
    fn new(index: usize, column_count: usize) -> Self {
        Self {
            index,
            columns: vec![ColumnCursor::default(); column_count],
            placements: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Column that would be left with the least free space, if any admits the tile.
    fn best_column(&self, height: u32, sheet_height: u32, gap: u32) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;

        for (index, column) in self.columns.iter().enumerate() {
            let gap = if column.count > 0 { gap as u64 } else { 0 };
            let bottom = column.height_used as u64 + gap + height as u64;
            if bottom > sheet_height as u64 {
                continue;
            }

            let leftover = sheet_height as u64 - bottom;
            // Strict comparison keeps the lowest index on ties
            if best.map_or(true, |(_, best_leftover)| leftover < best_leftover) {
                best = Some((index, leftover));
            }
        }

        best.map(|(index, _)| index)
    }

    fn place(&mut self, tile: &Tile, slot: &ColumnSlot, gap: u32) -> Placement {
        let column = &mut self.columns[slot.index];

        let (y, gap_start) = if column.count > 0 {
            (column.height_used + gap, Some(column.height_used))
        } else {
            (0, None)
        };

        let placement = Placement {
            tile_id: tile.id,
            sheet_index: self.index,
            column: slot.index,
            x: slot.x + (slot.width - tile.width) / 2,
            y,
            width: tile.width,
            height: tile.height,
            gap_start,
        };

        column.height_used = y + tile.height;
        column.count += 1;
        self.placements.push(placement);
        placement
    }

    fn seal(self) -> Sheet {
        Sheet {
            index: self.index,
            placements: self.placements,
        }
    }
}

// =============================================================================
// Packing
// =============================================================================

/// Pack tiles into `sheet_width x sheet_height` sheets of `column_count`
/// columns separated by `column_gap` pixels.
///
/// The gap is also left between vertically stacked tiles in a column.
///
/// # Errors
///
/// - [`PackError::InvalidLayout`] if the sheet cannot hold the columns
/// - [`PackError::EmptyTile`] if a tile has a zero dimension
/// - [`PackError::TileTooLarge`] if a tile is taller than the sheet or wider
///   than a column
/// - [`PackError::PackingInvariant`] if tiles were lost or duplicated, which
///   indicates a bug in the packer
///
/// # Example
///
/// ```
/// use sheetpack::layout::{pack, Tile, TileId};
///
/// let tiles = vec![
///     Tile::new(TileId(0), 100, 300),
///     Tile::new(TileId(1), 100, 200),
/// ];
/// let packing = pack(&tiles, 250, 400, 2, 10).unwrap();
///
/// assert_eq!(packing.sheets.len(), 1);
/// assert_eq!(packing.placement_count(), 2);
/// ```
pub fn pack(
    tiles: &[Tile],
    sheet_width: u32,
    sheet_height: u32,
    column_count: usize,
    column_gap: u32,
) -> Result<Packing, PackError> {
    if sheet_height == 0 {
        return Err(PackError::InvalidLayout {
            reason: "sheet height must be greater than 0".to_string(),
        });
    }

    let columns = column_slots(sheet_width, column_count, column_gap)?;
    let layout = SheetLayout {
        sheet_width,
        sheet_height,
        column_gap,
        columns,
    };

    validate_tiles(tiles, &layout)?;

    // Stable: equal heights keep input order
    let mut remaining: Vec<Tile> = tiles.to_vec();
    remaining.sort_by(|a, b| b.height.cmp(&a.height));

    let mut sheets = Vec::new();
    let mut current = SheetCursor::new(0, column_count);

    while !remaining.is_empty() {
        let fit = remaining.iter().enumerate().find_map(|(i, tile)| {
            current
                .best_column(tile.height, sheet_height, column_gap)
                .map(|column| (i, column))
        });

        match fit {
            Some((i, column)) => {
                let tile = remaining.remove(i);
                let placement = current.place(&tile, &layout.columns[column], column_gap);
                debug!(
                    tile = %tile.id,
                    sheet = placement.sheet_index,
                    column,
                    x = placement.x,
                    y = placement.y,
                    "Placed tile"
                );
            }
            None if current.is_empty() => {
                // Validation guarantees every tile fits an empty sheet
                return Err(PackError::PackingInvariant {
                    placed: tiles.len() - remaining.len(),
                    expected: tiles.len(),
                });
            }
            None => {
                let next = SheetCursor::new(current.index + 1, column_count);
                let sealed = std::mem::replace(&mut current, next).seal();
                debug!(
                    sheet = sealed.index,
                    tiles = sealed.placements.len(),
                    "Sealed sheet"
                );
                sheets.push(sealed);
            }
        }
    }

    if !current.is_empty() {
        sheets.push(current.seal());
    }

    let packing = Packing { layout, sheets };
    verify_complete(tiles, &packing)?;
    Ok(packing)
}

fn validate_tiles(tiles: &[Tile], layout: &SheetLayout) -> Result<(), PackError> {
    let max_width = layout.column_width();
    let max_height = layout.sheet_height;

    for tile in tiles {
        if tile.width == 0 || tile.height == 0 {
            return Err(PackError::EmptyTile {
                tile: tile.id,
                width: tile.width,
                height: tile.height,
            });
        }
        if tile.width > max_width || tile.height > max_height {
            return Err(PackError::TileTooLarge {
                tile: tile.id,
                width: tile.width,
                height: tile.height,
                max_width,
                max_height,
            });
        }
    }

    Ok(())
}

/// Every input id is placed exactly once.
fn verify_complete(tiles: &[Tile], packing: &Packing) -> Result<(), PackError> {
    let mut expected: Vec<TileId> = tiles.iter().map(|t| t.id).collect();
    let mut placed: Vec<TileId> = packing.placements().map(|p| p.tile_id).collect();
    expected.sort_unstable();
    placed.sort_unstable();

    if expected != placed {
        return Err(PackError::PackingInvariant {
            placed: placed.len(),
            expected: expected.len(),
        });
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
