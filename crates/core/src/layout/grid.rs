use story_deck_protocol::Rect;

use super::Slot;

/// Uniform grid: `columns` equal-width flexible columns, fixed row height.
pub fn grid_slots(count: usize, columns: usize, width: f64, row_height: f64, spacing: f64) -> Vec<Slot> {
    if columns == 0 {
        return Vec::new();
    }
    let n = columns as f64;
    let cell_width = ((width - spacing * (n - 1.0)) / n).max(0.0);
    (0..count)
        .map(|index| {
            let row = (index / columns) as f64;
            let col = (index % columns) as f64;
            Slot {
                index,
                rect: Rect::new(
                    col * (cell_width + spacing),
                    row * (row_height + spacing),
                    cell_width,
                    row_height,
                ),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_column_rows() {
        let slots = grid_slots(3, 2, 208.0, 300.0, 8.0);
        assert_eq!(slots[0].rect, Rect::new(0.0, 0.0, 100.0, 300.0));
        assert_eq!(slots[1].rect, Rect::new(108.0, 0.0, 100.0, 300.0));
        assert_eq!(slots[2].rect, Rect::new(0.0, 308.0, 100.0, 300.0));
    }

    #[test]
    fn zero_columns_is_empty() {
        assert!(grid_slots(5, 0, 100.0, 10.0, 0.0).is_empty());
    }
}
