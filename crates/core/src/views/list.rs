use story_deck_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken, Viewport};

use super::{CONTENT_PADDING, HEADER_HEIGHT, HitRegion, TILE_CORNER_RADIUS};
use crate::layout::{LayoutPlanner, content_height};
use crate::model::{FetchStatus, StoryList};
use crate::transition::{GeometryRegistry, SourceMarker, TransitionRegistry};

/// Output of one list render pass.
#[derive(Debug, Default)]
pub struct ListFrame {
    pub commands: Vec<RenderCommand>,
    /// Visible, tappable tiles.
    pub hits: Vec<HitRegion>,
    /// Height of the laid-out content, for scroll clamping.
    pub content_height: f64,
}

/// The scrollable area below the title bar.
pub fn list_content_rect(viewport: &Viewport) -> Rect {
    Rect::new(
        viewport.x,
        viewport.y + HEADER_HEIGHT,
        viewport.width,
        (viewport.height - HEADER_HEIGHT).max(0.0),
    )
}

/// Render the story list.
///
/// Every tile is laid out and reports its rect through its source marker,
/// even when scrolled out of view, so a transition can start from any
/// tile. Only tiles intersecting the viewport produce draw commands.
pub fn render_list(
    list: &StoryList,
    planner: &LayoutPlanner,
    viewport: &Viewport,
    scroll_y: f64,
    transitions: &mut TransitionRegistry,
    geometry: &mut GeometryRegistry,
) -> ListFrame {
    let mut frame = ListFrame::default();
    render_header(&mut frame.commands, viewport, planner);

    let content = list_content_rect(viewport);
    match list.status() {
        FetchStatus::Failure(message) => {
            render_message(&mut frame.commands, &content, "Error", Some(message.as_str()), ThemeToken::StatusError);
            return frame;
        }
        FetchStatus::Fetching if list.is_empty() => {
            render_message(&mut frame.commands, &content, "Loading stories…", None, ThemeToken::TextMuted);
            return frame;
        }
        _ => {}
    }

    let inner_width = (content.w - 2.0 * CONTENT_PADDING).max(0.0);
    let slots = planner.plan(list.heights(), inner_width);
    frame.content_height = content_height(&slots) + 2.0 * CONTENT_PADDING;

    let origin_x = content.x + CONTENT_PADDING;
    let origin_y = content.y + CONTENT_PADDING - scroll_y;

    frame.commands.push(RenderCommand::SetClip { rect: content });
    for slot in &slots {
        let Some(story) = list.get(slot.index) else {
            continue;
        };
        let rect = slot.rect.translate(origin_x, origin_y);
        let key = story.element_key();
        let marker = SourceMarker::new(key.clone());
        marker.appear(transitions);
        let opacity = marker.layout(transitions, geometry, rect);

        if !rect.intersects(&content) {
            continue;
        }
        frame.commands.push(RenderCommand::BeginGroup {
            id: key.to_string(),
            label: Some(story.author.clone()),
        });
        frame.commands.push(RenderCommand::DrawRect {
            rect,
            color: ThemeToken::tile(slot.index),
            corner_radius: TILE_CORNER_RADIUS,
            opacity,
            border_color: None,
            label: Some(story.author.clone()),
            element: Some(key.clone()),
        });
        frame.commands.push(RenderCommand::DrawImage {
            rect,
            image: key.clone(),
            corner_radius: TILE_CORNER_RADIUS,
            opacity,
        });
        frame.commands.push(RenderCommand::EndGroup);
        if opacity > 0.0 {
            frame.hits.push(HitRegion {
                rect,
                key,
                index: slot.index,
            });
        }
    }
    frame.commands.push(RenderCommand::ClearClip);
    frame
}

fn render_header(commands: &mut Vec<RenderCommand>, viewport: &Viewport, planner: &LayoutPlanner) {
    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(viewport.x, viewport.y, viewport.width, HEADER_HEIGHT),
        color: ThemeToken::ToolbarBackground,
        corner_radius: 0.0,
        opacity: 1.0,
        border_color: None,
        label: None,
        element: None,
    });
    let mid_y = viewport.y + HEADER_HEIGHT / 2.0;
    commands.push(RenderCommand::DrawText {
        position: Point::new(viewport.x + CONTENT_PADDING, mid_y),
        text: "Stories".to_string(),
        color: ThemeToken::ToolbarText,
        font_size: 28.0,
        align: TextAlign::Left,
    });
    commands.push(RenderCommand::DrawText {
        position: Point::new(viewport.x + viewport.width - CONTENT_PADDING, mid_y),
        text: planner.kind.to_string(),
        color: ThemeToken::TextMuted,
        font_size: 12.0,
        align: TextAlign::Right,
    });
}

fn render_message(
    commands: &mut Vec<RenderCommand>,
    area: &Rect,
    title: &str,
    detail: Option<&str>,
    color: ThemeToken,
) {
    let center_x = area.x + area.w / 2.0;
    let center_y = area.y + area.h / 2.0;
    commands.push(RenderCommand::DrawText {
        position: Point::new(center_x, center_y),
        text: title.to_string(),
        color,
        font_size: 20.0,
        align: TextAlign::Center,
    });
    if let Some(detail) = detail {
        commands.push(RenderCommand::DrawText {
            position: Point::new(center_x, center_y + 28.0),
            text: detail.to_string(),
            color: ThemeToken::TextSecondary,
            font_size: 13.0,
            align: TextAlign::Center,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sample_stories;

    fn loaded(count: usize) -> StoryList {
        let mut list = StoryList::with_seed(3);
        list.finish::<String>(Ok(sample_stories(count)));
        list
    }

    fn texts(commands: &[RenderCommand]) -> Vec<&str> {
        commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn loading_state_shows_message() {
        let list = StoryList::with_seed(1);
        let mut transitions = TransitionRegistry::new();
        let mut geometry = GeometryRegistry::new();
        let frame = render_list(
            &list,
            &LayoutPlanner::default(),
            &Viewport::new(390.0, 844.0),
            0.0,
            &mut transitions,
            &mut geometry,
        );
        assert!(texts(&frame.commands).contains(&"Loading stories…"));
        assert!(frame.hits.is_empty());
    }

    #[test]
    fn failure_shows_description() {
        let mut list = StoryList::with_seed(1);
        list.finish::<&str>(Err("bad response"));
        let mut transitions = TransitionRegistry::new();
        let mut geometry = GeometryRegistry::new();
        let frame = render_list(
            &list,
            &LayoutPlanner::default(),
            &Viewport::new(390.0, 844.0),
            0.0,
            &mut transitions,
            &mut geometry,
        );
        let texts = texts(&frame.commands);
        assert!(texts.contains(&"Error"));
        assert!(texts.contains(&"bad response"));
    }

    #[test]
    fn tiles_register_records_and_draw_visible_only() {
        let list = loaded(40);
        let mut transitions = TransitionRegistry::new();
        let mut geometry = GeometryRegistry::new();
        geometry.begin_pass();
        let frame = render_list(
            &list,
            &LayoutPlanner::default(),
            &Viewport::new(390.0, 600.0),
            0.0,
            &mut transitions,
            &mut geometry,
        );
        assert_eq!(transitions.len(), 40);
        assert!(!frame.hits.is_empty());
        assert!(frame.hits.len() < 40);
        assert!(frame.content_height > 600.0);
        // Idle records: everything fully visible, nothing reported.
        assert!(frame.commands.iter().all(|c| match c {
            RenderCommand::DrawRect { opacity, .. } => *opacity == 1.0,
            _ => true,
        }));
        assert!(geometry
            .anchor(crate::transition::AnchorRole::Source, "story-0")
            .is_none());
    }

    #[test]
    fn each_visible_tile_paints_its_image_over_the_placeholder() {
        let list = loaded(6);
        let mut transitions = TransitionRegistry::new();
        let mut geometry = GeometryRegistry::new();
        let frame = render_list(
            &list,
            &LayoutPlanner::default(),
            &Viewport::new(390.0, 2000.0),
            0.0,
            &mut transitions,
            &mut geometry,
        );
        for hit in &frame.hits {
            let placeholder = frame.commands.iter().position(|c| c.element() == Some(&hit.key));
            let image = frame.commands.iter().position(|c| {
                matches!(c, RenderCommand::DrawImage { image, rect, .. } if *image == hit.key && *rect == hit.rect)
            });
            assert!(matches!((placeholder, image), (Some(p), Some(i)) if p < i), "{}", hit.key);
        }
    }

    #[test]
    fn scrolling_moves_tiles_up() {
        let list = loaded(10);
        let mut transitions = TransitionRegistry::new();
        let mut geometry = GeometryRegistry::new();
        let vp = Viewport::new(390.0, 844.0);
        let planner = LayoutPlanner::default();
        let top = render_list(&list, &planner, &vp, 0.0, &mut transitions, &mut geometry);
        let scrolled = render_list(&list, &planner, &vp, 50.0, &mut transitions, &mut geometry);
        let first = |f: &ListFrame| f.hits.iter().find(|h| h.index == 0).map(|h| h.rect.y);
        assert_eq!(first(&top).zip(first(&scrolled)).map(|(a, b)| a - b), Some(50.0));
    }
}
