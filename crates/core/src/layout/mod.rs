//! Pure layout planners for the story list.
//!
//! Each planner maps `count` items onto [`Slot`]s in content coordinates
//! (origin at the top-left of the scrollable area). Every item lands in
//! exactly one slot.

pub mod compositional;
pub mod grid;
pub mod pinterest;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use story_deck_protocol::Rect;
use thiserror::Error;

/// Placement of the `index`-th item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub index: usize,
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    #[default]
    Pinterest,
    Grid,
    Compositional,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 3] = [
        LayoutKind::Pinterest,
        LayoutKind::Grid,
        LayoutKind::Compositional,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LayoutKind::Pinterest => "pinterest",
            LayoutKind::Grid => "grid",
            LayoutKind::Compositional => "compositional",
        }
    }

    /// The next layout in [`LayoutKind::ALL`], wrapping around.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
#[error("unknown layout {0:?} (expected pinterest, grid, or compositional)")]
pub struct UnknownLayout(String);

impl FromStr for LayoutKind {
    type Err = UnknownLayout;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pinterest" | "masonry" => Ok(LayoutKind::Pinterest),
            "grid" => Ok(LayoutKind::Grid),
            "compositional" => Ok(LayoutKind::Compositional),
            _ => Err(UnknownLayout(s.to_string())),
        }
    }
}

/// Chooses and parameterizes one of the three planners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutPlanner {
    pub kind: LayoutKind,
    pub columns: usize,
    pub spacing: f64,
    /// Row height for [`LayoutKind::Grid`].
    pub grid_row_height: f64,
    /// Items per section for [`LayoutKind::Compositional`].
    pub chunk_size: usize,
}

impl Default for LayoutPlanner {
    fn default() -> Self {
        Self {
            kind: LayoutKind::Pinterest,
            columns: 2,
            spacing: 8.0,
            grid_row_height: 300.0,
            chunk_size: 3,
        }
    }
}

impl LayoutPlanner {
    pub fn with_kind(kind: LayoutKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Lay out one item per entry of `heights`. Heights are only consulted
    /// by the pinterest planner; the others size items from `width`.
    pub fn plan(&self, heights: &[u32], width: f64) -> Vec<Slot> {
        match self.kind {
            LayoutKind::Pinterest => {
                pinterest::pinterest_slots(heights, self.columns, width, self.spacing)
            }
            LayoutKind::Grid => grid::grid_slots(
                heights.len(),
                self.columns,
                width,
                self.grid_row_height,
                self.spacing,
            ),
            LayoutKind::Compositional => compositional::compositional_slots(
                heights.len(),
                self.chunk_size,
                width,
                self.spacing,
            ),
        }
    }
}

/// Total height spanned by `slots`.
pub fn content_height(slots: &[Slot]) -> f64 {
    slots.iter().map(|s| s.rect.max_y()).fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_layout_names() {
        assert_eq!("Grid".parse::<LayoutKind>().ok(), Some(LayoutKind::Grid));
        assert_eq!(
            "masonry".parse::<LayoutKind>().ok(),
            Some(LayoutKind::Pinterest)
        );
        assert!("carousel".parse::<LayoutKind>().is_err());
    }

    #[test]
    fn next_cycles_through_all() {
        let mut kind = LayoutKind::Pinterest;
        for _ in 0..LayoutKind::ALL.len() {
            kind = kind.next();
        }
        assert_eq!(kind, LayoutKind::Pinterest);
    }

    #[test]
    fn every_planner_places_every_item_once() {
        let heights: Vec<u32> = (0..17).map(|i| 100 + i * 23).collect();
        for kind in LayoutKind::ALL {
            let slots = LayoutPlanner::with_kind(kind).plan(&heights, 390.0);
            let mut seen: Vec<usize> = slots.iter().map(|s| s.index).collect();
            seen.sort_unstable();
            assert_eq!(seen, (0..17).collect::<Vec<_>>(), "{kind}");
        }
    }
}
