use story_deck_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken, Viewport};

use super::{CONTENT_PADDING, DETAIL_CORNER_RADIUS, HEADER_HEIGHT};
use crate::model::StoryMetadata;
use crate::transition::{DestinationMarker, GeometryRegistry, TransitionRegistry};

#[derive(Debug)]
pub struct DetailFrame {
    pub commands: Vec<RenderCommand>,
    /// Tap target that dismisses the detail screen.
    pub back_button: Rect,
}

/// The story image: the largest square that fits below the navigation bar.
pub fn detail_image_rect(viewport: &Viewport) -> Rect {
    let available_w = (viewport.width - 2.0 * CONTENT_PADDING).max(0.0);
    let available_h = (viewport.height - HEADER_HEIGHT - 2.0 * CONTENT_PADDING).max(0.0);
    let side = available_w.min(available_h);
    Rect::new(
        viewport.x + (viewport.width - side) / 2.0,
        viewport.y + HEADER_HEIGHT + CONTENT_PADDING,
        side,
        side,
    )
}

/// Render the detail screen for the `index`-th story. The image reports
/// its rect through the destination marker.
pub fn render_detail(
    story: &StoryMetadata,
    index: usize,
    viewport: &Viewport,
    transitions: &TransitionRegistry,
    geometry: &mut GeometryRegistry,
) -> DetailFrame {
    let mut commands = Vec::new();
    let back_button = Rect::new(viewport.x, viewport.y, 96.0, HEADER_HEIGHT);
    let mid_y = viewport.y + HEADER_HEIGHT / 2.0;

    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(viewport.x, viewport.y, viewport.width, HEADER_HEIGHT),
        color: ThemeToken::ToolbarBackground,
        corner_radius: 0.0,
        opacity: 1.0,
        border_color: None,
        label: None,
        element: None,
    });
    commands.push(RenderCommand::DrawText {
        position: Point::new(viewport.x + CONTENT_PADDING, mid_y),
        text: "‹ Back".to_string(),
        color: ThemeToken::ToolbarText,
        font_size: 16.0,
        align: TextAlign::Left,
    });
    commands.push(RenderCommand::DrawText {
        position: Point::new(viewport.x + viewport.width / 2.0, mid_y),
        text: story.author.clone(),
        color: ThemeToken::ToolbarText,
        font_size: 20.0,
        align: TextAlign::Center,
    });

    let key = story.element_key();
    let image = detail_image_rect(viewport);
    let opacity = DestinationMarker::new(key.clone()).layout(transitions, geometry, image);
    commands.push(RenderCommand::DrawRect {
        rect: image,
        color: ThemeToken::tile(index),
        corner_radius: DETAIL_CORNER_RADIUS,
        opacity,
        border_color: None,
        label: None,
        element: Some(key.clone()),
    });
    commands.push(RenderCommand::DrawImage {
        rect: image,
        image: key,
        corner_radius: DETAIL_CORNER_RADIUS,
        opacity,
    });
    commands.push(RenderCommand::DrawText {
        position: Point::new(image.x, image.max_y() + 20.0),
        text: story.url.to_string(),
        color: ThemeToken::TextMuted,
        font_size: 12.0,
        align: TextAlign::Left,
    });

    DetailFrame {
        commands,
        back_button,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sample_stories;

    #[test]
    fn image_is_centered_square() {
        let vp = Viewport::new(390.0, 844.0);
        let rect = detail_image_rect(&vp);
        assert_eq!(rect.w, rect.h);
        assert_eq!(rect.w, 358.0);
        assert!((rect.x + rect.w / 2.0 - 195.0).abs() < 1e-9);
    }

    #[test]
    fn idle_destination_is_visible() {
        let story = &sample_stories(1)[0];
        let transitions = TransitionRegistry::new();
        let mut geometry = GeometryRegistry::new();
        let frame = render_detail(story, 0, &Viewport::new(390.0, 844.0), &transitions, &mut geometry);
        let image = frame.commands.iter().find_map(|c| match c {
            RenderCommand::DrawRect {
                element: Some(key),
                opacity,
                ..
            } if key == "story-0" => Some(*opacity),
            _ => None,
        });
        assert_eq!(image, Some(1.0));
        assert!(frame.commands.iter().any(|c| matches!(
            c,
            RenderCommand::DrawImage { image, rect, opacity, .. }
                if image == "story-0" && *rect == detail_image_rect(&Viewport::new(390.0, 844.0)) && *opacity == 1.0
        )));
        assert!(frame.back_button.contains(Point::new(10.0, 10.0)));
    }
}
