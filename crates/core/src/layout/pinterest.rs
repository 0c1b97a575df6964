use rand::Rng;
use story_deck_protocol::Rect;

use super::Slot;

/// Placeholder item heights are drawn from this range.
pub const PLACEHOLDER_HEIGHTS: std::ops::Range<u32> = 100..500;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Column {
    /// Item indices, top to bottom.
    pub items: Vec<usize>,
    /// Sum of the item heights in this column.
    pub height: u32,
}

/// Greedy shortest-column-first packing.
///
/// Each item goes to the column with the smallest running height; ties go
/// to the lowest column index. The result depends only on the height
/// sequence, so the same input always yields the same columns.
pub fn assign(heights: &[u32], column_count: usize) -> Vec<Column> {
    let mut columns = vec![Column::default(); column_count];
    if columns.is_empty() {
        return columns;
    }
    for (index, &height) in heights.iter().enumerate() {
        let mut shortest = 0;
        for (i, column) in columns.iter().enumerate() {
            if column.height < columns[shortest].height {
                shortest = i;
            }
        }
        let column = &mut columns[shortest];
        column.items.push(index);
        column.height += height;
    }
    columns
}

pub fn placeholder_heights<R: Rng>(count: usize, rng: &mut R) -> Vec<u32> {
    (0..count)
        .map(|_| rng.random_range(PLACEHOLDER_HEIGHTS))
        .collect()
}

/// Convert [`assign`]'s columns into rects: equal-width columns separated
/// by `spacing`, items stacked with the same gap.
pub fn pinterest_slots(heights: &[u32], column_count: usize, width: f64, spacing: f64) -> Vec<Slot> {
    let columns = assign(heights, column_count);
    if columns.is_empty() {
        return Vec::new();
    }
    let n = columns.len() as f64;
    let column_width = ((width - spacing * (n - 1.0)) / n).max(0.0);

    let mut slots = Vec::with_capacity(heights.len());
    for (c, column) in columns.iter().enumerate() {
        let x = c as f64 * (column_width + spacing);
        let mut y = 0.0;
        for &index in &column.items {
            let h = f64::from(heights[index]);
            slots.push(Slot {
                index,
                rect: Rect::new(x, y, column_width, h),
            });
            y += h + spacing;
        }
    }
    slots.sort_by_key(|s| s.index);
    slots
}
