//! Column slot computation.

use crate::error::PackError;

use super::types::ColumnSlot;

/// Split a sheet width into `count` equal columns separated by gaps.
///
/// Each column gets `(width - gap * (count - 1)) / count` pixels. The floor
/// remainder is spread over the gaps, one extra pixel at a time, leftmost gap
/// first, so the rightmost column always ends exactly at `width`.
///
/// # Errors
///
/// Returns [`PackError::InvalidLayout`] when `count` is zero or the gaps leave
/// less than one pixel per column.
pub fn column_slots(width: u32, count: usize, gap: u32) -> Result<Vec<ColumnSlot>, PackError> {
    if count == 0 {
        return Err(PackError::InvalidLayout {
            reason: "column count must be at least 1".to_string(),
        });
    }

    let count_u64 = count as u64;
    let gaps = count_u64 - 1;
    let reserved = gaps * gap as u64 + count_u64;
    if reserved > width as u64 {
        return Err(PackError::InvalidLayout {
            reason: format!(
                "{count} columns with a {gap}px gap do not fit a {width}px wide sheet"
            ),
        });
    }

    let usable = width as u64 - gaps * gap as u64;
    let column_width = usable / count_u64;
    let remainder = usable % count_u64;

    // remainder < count, so with a single column it is always zero
    let (per_gap, leftover) = if gaps == 0 {
        (0, 0)
    } else {
        (remainder / gaps, remainder % gaps)
    };

    let mut slots = Vec::with_capacity(count);
    let mut x = 0u64;
    for index in 0..count {
        slots.push(ColumnSlot {
            index,
            x: x as u32,
            width: column_width as u32,
        });

        if (index as u64) < gaps {
            let extra = per_gap + u64::from((index as u64) < leftover);
            x += column_width + gap as u64 + extra;
        }
    }

    Ok(slots)
}
