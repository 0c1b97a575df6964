use serde::{Deserialize, Serialize};
use story_deck_protocol::{ElementKey, Point, Rect, RenderCommand, TextAlign, ThemeToken};

/// Snapshot of the content floated by the overlay while a transition runs.
///
/// A closed set of descriptors instead of an erased view: the overlay only
/// needs to draw the snapshot at an arbitrary rect and corner radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GhostContent {
    /// A plain colored tile with an optional centered label.
    Tile {
        color: ThemeToken,
        label: Option<String>,
    },
    /// A story thumbnail over its placeholder color, captioned with its
    /// author.
    Story {
        id: String,
        author: String,
        color: ThemeToken,
        /// Key of the fetched thumbnail.
        image: ElementKey,
    },
}

const CAPTION_FONT_SIZE: f64 = 12.0;

impl GhostContent {
    pub fn draw(&self, rect: Rect, corner_radius: f64) -> Vec<RenderCommand> {
        match self {
            GhostContent::Tile { color, label } => vec![RenderCommand::DrawRect {
                rect,
                color: *color,
                corner_radius,
                opacity: 1.0,
                border_color: None,
                label: label.clone(),
                element: None,
            }],
            GhostContent::Story {
                id,
                author,
                color,
                image,
            } => {
                let mut commands = vec![
                    RenderCommand::BeginGroup {
                        id: format!("ghost-{id}"),
                        label: Some(author.clone()),
                    },
                    RenderCommand::DrawRect {
                        rect,
                        color: *color,
                        corner_radius,
                        opacity: 1.0,
                        border_color: Some(ThemeToken::GhostOutline),
                        label: None,
                        element: None,
                    },
                    RenderCommand::DrawImage {
                        rect,
                        image: image.clone(),
                        corner_radius,
                        opacity: 1.0,
                    },
                ];
                // Skip the caption while the ghost is too small to hold it.
                if rect.h > CAPTION_FONT_SIZE * 2.0 {
                    commands.push(RenderCommand::DrawText {
                        position: Point::new(rect.x + 8.0, rect.max_y() - CAPTION_FONT_SIZE),
                        text: author.clone(),
                        color: ThemeToken::TextPrimary,
                        font_size: CAPTION_FONT_SIZE,
                        align: TextAlign::Left,
                    });
                }
                commands.push(RenderCommand::EndGroup);
                commands
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_draws_single_rect_at_frame() {
        let ghost = GhostContent::Tile {
            color: ThemeToken::TileRose,
            label: Some("x".into()),
        };
        let rect = Rect::new(1.0, 2.0, 30.0, 40.0);
        let cmds = ghost.draw(rect, 6.0);
        assert_eq!(cmds.len(), 1);
        assert!(matches!(
            &cmds[0],
            RenderCommand::DrawRect { rect: r, corner_radius, element: None, .. }
                if *r == rect && (*corner_radius - 6.0).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn story_caption_dropped_when_small() {
        let ghost = GhostContent::Story {
            id: "1".into(),
            author: "Alejandro Escamilla".into(),
            color: ThemeToken::TileSky,
            image: ElementKey::from("story-1"),
        };
        let big = ghost.draw(Rect::new(0.0, 0.0, 100.0, 100.0), 0.0);
        let small = ghost.draw(Rect::new(0.0, 0.0, 10.0, 10.0), 0.0);
        let has_text = |cmds: &[RenderCommand]| {
            cmds.iter().any(|c| matches!(c, RenderCommand::DrawText { .. }))
        };
        assert!(has_text(&big));
        assert!(!has_text(&small));
    }

    #[test]
    fn story_floats_its_image_at_the_ghost_frame() {
        let ghost = GhostContent::Story {
            id: "7".into(),
            author: "Paul Jarvis".into(),
            color: ThemeToken::TileSky,
            image: ElementKey::from("story-7"),
        };
        let rect = Rect::new(5.0, 5.0, 80.0, 120.0);
        let cmds = ghost.draw(rect, 4.0);
        assert!(cmds.iter().any(|c| matches!(
            c,
            RenderCommand::DrawImage { image, rect: r, corner_radius, opacity }
                if image == "story-7" && *r == rect && *corner_radius == 4.0 && *opacity == 1.0
        )));
    }
}
