use ratatui::buffer::Buffer;
use ratatui::layout::Rect as CellRect;
use ratatui::style::Color;
use story_deck_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken};

/// Logical units covered by one terminal cell. Cells are roughly twice as
/// tall as wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellScale {
    pub x: f64,
    pub y: f64,
}

impl Default for CellScale {
    fn default() -> Self {
        Self { x: 8.0, y: 16.0 }
    }
}

impl CellScale {
    /// Logical size of a cell area.
    pub fn logical_size(&self, area: CellRect) -> (f64, f64) {
        (f64::from(area.width) * self.x, f64::from(area.height) * self.y)
    }

    /// Logical point at the center of cell (`col`, `row`) relative to the
    /// area origin.
    pub fn cell_center(&self, col: u16, row: u16) -> Point {
        Point::new(
            (f64::from(col) + 0.5) * self.x,
            (f64::from(row) + 0.5) * self.y,
        )
    }

    /// Cells covered by a logical rect, clipped to `area`.
    pub fn to_cells(&self, rect: &Rect, area: CellRect) -> Option<CellRect> {
        let left = (rect.x / self.x).round();
        let top = (rect.y / self.y).round();
        let right = (rect.max_x() / self.x).round();
        let bottom = (rect.max_y() / self.y).round();
        let left = left.clamp(0.0, f64::from(area.width));
        let top = top.clamp(0.0, f64::from(area.height));
        let right = right.clamp(0.0, f64::from(area.width));
        let bottom = bottom.clamp(0.0, f64::from(area.height));
        if right <= left || bottom <= top {
            return None;
        }
        Some(CellRect::new(
            area.x + left as u16,
            area.y + top as u16,
            (right - left) as u16,
            (bottom - top) as u16,
        ))
    }
}

pub fn theme_to_color(token: ThemeToken) -> Color {
    match token {
        ThemeToken::TileRose => Color::Rgb(0xf3, 0x8b, 0xa8),
        ThemeToken::TilePeach => Color::Rgb(0xfa, 0xb3, 0x87),
        ThemeToken::TileSky => Color::Rgb(0x89, 0xdc, 0xeb),
        ThemeToken::TileMauve => Color::Rgb(0xcb, 0xa6, 0xf7),
        ThemeToken::TileTeal => Color::Rgb(0x94, 0xe2, 0xd5),
        ThemeToken::TextPrimary => Color::White,
        ThemeToken::TextSecondary => Color::Gray,
        ThemeToken::TextMuted => Color::DarkGray,
        ThemeToken::Background => Color::Black,
        ThemeToken::Surface => Color::Black,
        ThemeToken::Border => Color::DarkGray,
        ThemeToken::ToolbarBackground => Color::DarkGray,
        ThemeToken::ToolbarText => Color::White,
        ThemeToken::GhostOutline => Color::White,
        ThemeToken::SelectionHighlight => Color::Green,
        ThemeToken::StatusError => Color::Red,
    }
}

/// Paint `commands` into `buf`, mapping logical coordinates onto the cells
/// of `area`. Rects fainter than half opacity are skipped; the overlay
/// layer needs no special handling because it is emitted last.
pub fn render_commands(buf: &mut Buffer, area: CellRect, commands: &[RenderCommand], scale: CellScale) {
    let mut clip_stack: Vec<CellRect> = vec![area];

    for cmd in commands {
        let clip = clip_stack.last().copied().unwrap_or(area);
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                opacity,
                border_color,
                label,
                ..
            } => {
                if *opacity < 0.5 {
                    continue;
                }
                let Some(cells) = scale.to_cells(rect, area) else {
                    continue;
                };
                let cells = cells.intersection(clip);
                if cells.is_empty() {
                    continue;
                }
                let bg = theme_to_color(*color);
                for y in cells.top()..cells.bottom() {
                    for x in cells.left()..cells.right() {
                        buf[(x, y)].set_char(' ').set_bg(bg);
                    }
                }
                if border_color.is_some() && cells.width >= 2 {
                    let fg = border_color.map_or(Color::White, theme_to_color);
                    for x in cells.left()..cells.right() {
                        buf[(x, cells.top())].set_char('▔').set_fg(fg);
                    }
                }
                if let Some(label) = label.as_deref() {
                    let row = cells.bottom().saturating_sub(1);
                    write_clipped(buf, cells.left().saturating_add(1), row, label, Color::Black, cells);
                }
            }

            RenderCommand::DrawText {
                position,
                text,
                color,
                align,
                ..
            } => {
                let col = (position.x / scale.x).floor();
                let row = (position.y / scale.y).floor();
                if row < 0.0 || row >= f64::from(area.height) {
                    continue;
                }
                let len = text.chars().count() as f64;
                let start = match align {
                    TextAlign::Left => col,
                    TextAlign::Center => col - (len / 2.0).floor(),
                    TextAlign::Right => col - len,
                }
                .max(0.0);
                if start >= f64::from(area.width) {
                    continue;
                }
                write_clipped(
                    buf,
                    area.x + start as u16,
                    area.y + row as u16,
                    text,
                    theme_to_color(*color),
                    clip,
                );
            }

            RenderCommand::SetClip { rect } => {
                let next = scale
                    .to_cells(rect, area)
                    .map_or(CellRect::new(area.x, area.y, 0, 0), |cells| cells.intersection(clip));
                clip_stack.push(next);
            }

            RenderCommand::ClearClip => {
                if clip_stack.len() > 1 {
                    clip_stack.pop();
                }
            }

            // Cells cannot show pixels; the placeholder rect stands in.
            RenderCommand::DrawImage { .. }
            | RenderCommand::BeginGroup { .. }
            | RenderCommand::EndGroup
            | RenderCommand::BeginLayer { .. }
            | RenderCommand::EndLayer => {}
        }
    }
}

fn write_clipped(buf: &mut Buffer, x: u16, y: u16, text: &str, fg: Color, clip: CellRect) {
    if y < clip.top() || y >= clip.bottom() {
        return;
    }
    for (i, ch) in text.chars().enumerate() {
        let Some(cx) = x.checked_add(i as u16) else {
            break;
        };
        if cx >= clip.right() {
            break;
        }
        if cx >= clip.left() {
            buf[(cx, y)].set_char(ch).set_fg(fg);
        }
    }
}

/// Outline a logical rect, e.g. the selected tile.
pub fn outline(buf: &mut Buffer, area: CellRect, rect: &Rect, color: Color, scale: CellScale) {
    let Some(cells) = scale.to_cells(rect, area) else {
        return;
    };
    for x in cells.left()..cells.right() {
        buf[(x, cells.top())].set_fg(color).set_char('─');
        buf[(x, cells.bottom() - 1)].set_fg(color).set_char('─');
    }
    for y in cells.top()..cells.bottom() {
        buf[(cells.left(), y)].set_fg(color).set_char('│');
        buf[(cells.right() - 1, y)].set_fg(color).set_char('│');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> CellRect {
        CellRect::new(0, 0, 20, 10)
    }

    fn rect_cmd(rect: Rect, opacity: f32) -> RenderCommand {
        RenderCommand::DrawRect {
            rect,
            color: ThemeToken::TileSky,
            corner_radius: 0.0,
            opacity,
            border_color: None,
            label: None,
            element: None,
        }
    }

    #[test]
    fn rect_maps_to_cells() {
        let scale = CellScale::default();
        let cells = scale.to_cells(&Rect::new(16.0, 32.0, 40.0, 48.0), area());
        assert_eq!(cells, Some(CellRect::new(2, 2, 5, 3)));
        assert_eq!(scale.to_cells(&Rect::new(500.0, 0.0, 10.0, 10.0), area()), None);
    }

    #[test]
    fn hidden_rects_are_not_painted() {
        let mut buf = Buffer::empty(area());
        let scale = CellScale::default();
        render_commands(
            &mut buf,
            area(),
            &[rect_cmd(Rect::new(0.0, 0.0, 16.0, 16.0), 0.0)],
            scale,
        );
        assert_eq!(buf[(0, 0)].bg, Color::Reset);

        render_commands(
            &mut buf,
            area(),
            &[rect_cmd(Rect::new(0.0, 0.0, 16.0, 16.0), 1.0)],
            scale,
        );
        assert_eq!(buf[(0, 0)].bg, theme_to_color(ThemeToken::TileSky));
    }

    #[test]
    fn clip_limits_painting() {
        let mut buf = Buffer::empty(area());
        let commands = vec![
            RenderCommand::SetClip {
                rect: Rect::new(0.0, 0.0, 16.0, 160.0),
            },
            rect_cmd(Rect::new(0.0, 0.0, 160.0, 16.0), 1.0),
            RenderCommand::ClearClip,
        ];
        render_commands(&mut buf, area(), &commands, CellScale::default());
        assert_eq!(buf[(1, 0)].bg, theme_to_color(ThemeToken::TileSky));
        assert_eq!(buf[(2, 0)].bg, Color::Reset);
    }

    #[test]
    fn right_aligned_text_ends_at_position() {
        let mut buf = Buffer::empty(area());
        let commands = vec![RenderCommand::DrawText {
            position: Point::new(80.0, 8.0),
            text: "grid".to_string(),
            color: ThemeToken::TextMuted,
            font_size: 12.0,
            align: TextAlign::Right,
        }];
        render_commands(&mut buf, area(), &commands, CellScale::default());
        assert_eq!(buf[(6, 0)].symbol(), "g");
        assert_eq!(buf[(9, 0)].symbol(), "d");
    }
}
