//! Screens rendered to [`RenderCommand`](story_deck_protocol::RenderCommand)
//! lists. Views report their transition anchors while they lay out.

pub mod detail;
pub mod list;

use story_deck_protocol::{ElementKey, Rect};

/// Height of the title / navigation bar at the top of every screen.
pub const HEADER_HEIGHT: f64 = 56.0;
pub const CONTENT_PADDING: f64 = 16.0;
pub const TILE_CORNER_RADIUS: f64 = 10.0;
pub const DETAIL_CORNER_RADIUS: f64 = 10.0;

/// A tappable region and the story element it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct HitRegion {
    pub rect: Rect,
    pub key: ElementKey,
    pub index: usize,
}
