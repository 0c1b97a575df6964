use story_deck_protocol::Rect;

use super::Slot;

/// Share of the width taken by the stacked column in arrangements 0 and 2.
const SIDE_FRACTION: f64 = 0.33;

/// Section heights for arrangements 0..=3.
const SECTION_HEIGHTS: [f64; 4] = [300.0, 150.0, 300.0, 230.0];

/// Chunked layout cycling through four section arrangements.
///
/// Items are taken `chunk_size` at a time; section `i` uses arrangement
/// `i % 4`:
/// 0. one large item on the left, the rest stacked in a narrow right column
/// 1. all items side by side in a short row
/// 2. the rest stacked in a narrow left column, the last item large on the right
/// 3. all items side by side in a medium row
pub fn compositional_slots(count: usize, chunk_size: usize, width: f64, spacing: f64) -> Vec<Slot> {
    if chunk_size == 0 {
        return Vec::new();
    }
    let mut slots = Vec::with_capacity(count);
    let mut y = 0.0;
    let mut start = 0;
    let mut section = 0;
    while start < count {
        let end = (start + chunk_size).min(count);
        let items: Vec<usize> = (start..end).collect();
        let arrangement = section % 4;
        let height = SECTION_HEIGHTS[arrangement];
        match arrangement {
            0 => feature_with_column(&items, y, width, height, spacing, false, &mut slots),
            2 => feature_with_column(&items, y, width, height, spacing, true, &mut slots),
            _ => row(&items, y, width, height, spacing, &mut slots),
        }
        y += height + spacing;
        start = end;
        section += 1;
    }
    slots
}

fn row(items: &[usize], y: f64, width: f64, height: f64, spacing: f64, out: &mut Vec<Slot>) {
    let n = items.len() as f64;
    let w = ((width - spacing * (n - 1.0)) / n).max(0.0);
    for (i, &index) in items.iter().enumerate() {
        out.push(Slot {
            index,
            rect: Rect::new(i as f64 * (w + spacing), y, w, height),
        });
    }
}

/// One large feature item next to a column stacking the others. With
/// `feature_last` the column is on the left and the last item is featured.
fn feature_with_column(
    items: &[usize],
    y: f64,
    width: f64,
    height: f64,
    spacing: f64,
    feature_last: bool,
    out: &mut Vec<Slot>,
) {
    let (feature, stacked) = if feature_last {
        match items.split_last() {
            Some((last, rest)) => (*last, rest),
            None => return,
        }
    } else {
        match items.split_first() {
            Some((first, rest)) => (*first, rest),
            None => return,
        }
    };

    if stacked.is_empty() {
        out.push(Slot {
            index: feature,
            rect: Rect::new(0.0, y, width, height),
        });
        return;
    }

    let side_width = (width - spacing) * SIDE_FRACTION;
    let feature_width = (width - spacing - side_width).max(0.0);
    let (feature_x, side_x) = if feature_last {
        (side_width + spacing, 0.0)
    } else {
        (0.0, feature_width + spacing)
    };

    let n = stacked.len() as f64;
    let cell_height = ((height - spacing * (n - 1.0)) / n).max(0.0);
    let stacked_slots = stacked.iter().enumerate().map(|(i, &index)| Slot {
        index,
        rect: Rect::new(side_x, y + i as f64 * (cell_height + spacing), side_width, cell_height),
    });
    let feature_slot = Slot {
        index: feature,
        rect: Rect::new(feature_x, y, feature_width, height),
    };

    // Keep output in index order.
    if feature_last {
        out.extend(stacked_slots);
        out.push(feature_slot);
    } else {
        out.push(feature_slot);
        out.extend(stacked_slots);
    }
}
