use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    // Story tile placeholders, cycled by story index.
    TileRose,
    TilePeach,
    TileSky,
    TileMauve,
    TileTeal,

    TextPrimary,
    TextSecondary,
    TextMuted,

    Background,
    Surface,
    Border,

    // Title bar
    ToolbarBackground,
    ToolbarText,

    /// Outline drawn around a floating ghost.
    GhostOutline,
    SelectionHighlight,
    StatusError,
}

impl ThemeToken {
    pub const TILE_PALETTE: [ThemeToken; 5] = [
        ThemeToken::TileRose,
        ThemeToken::TilePeach,
        ThemeToken::TileSky,
        ThemeToken::TileMauve,
        ThemeToken::TileTeal,
    ];

    /// Placeholder tile color for the `index`-th story.
    pub fn tile(index: usize) -> ThemeToken {
        Self::TILE_PALETTE[index % Self::TILE_PALETTE.len()]
    }
}
