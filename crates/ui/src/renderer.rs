use egui::epaint::RectShape;
use egui::{Align2, Color32, CornerRadius, FontId, Id, LayerId, Order, Painter, Pos2, Rect, Shape, Stroke, StrokeKind};
use story_deck_protocol::{ElementKey, RenderCommand, TextAlign, ThemeToken};

use crate::images::{ImageStore, cover_uv};
use crate::theme::{self, ThemeMode};

/// A drawn element that can take pointer input.
pub struct HitRegion {
    pub rect: Rect,
    pub element: ElementKey,
}

/// Result of rendering a command list: includes hit regions for interaction.
pub struct RenderResult {
    pub hit_regions: Vec<HitRegion>,
}

/// One painter per open layer. The base painter is the one passed in.
struct LayerState {
    painter: Painter,
    clip_stack: Vec<Rect>,
    hit_testable: bool,
}

fn to_egui(rect: &story_deck_protocol::Rect, offset: Pos2) -> Rect {
    Rect::from_min_size(
        Pos2::new(rect.x as f32 + offset.x, rect.y as f32 + offset.y),
        egui::vec2(rect.w as f32, rect.h as f32),
    )
}

fn corner_radius(radius: f64) -> CornerRadius {
    CornerRadius::same(radius.round().clamp(0.0, f64::from(u8::MAX)) as u8)
}

/// Render a list of `RenderCommand` into an egui `Painter`.
///
/// `offset` is the top-left pixel position of the rendering area.
/// `BeginLayer` opens a foreground layer painted above the rest of the
/// frame; elements inside a non-hit-testable layer never produce hit
/// regions. `DrawImage` paints textures from `images`. Returns hit regions
/// for click/hover interaction.
pub fn render_commands(
    painter: &Painter,
    commands: &[RenderCommand],
    offset: Pos2,
    mode: ThemeMode,
    images: &ImageStore,
) -> RenderResult {
    let mut layers = vec![LayerState {
        painter: painter.clone(),
        clip_stack: Vec::new(),
        hit_testable: true,
    }];
    let mut hit_regions: Vec<HitRegion> = Vec::new();

    for cmd in commands {
        let Some(layer) = layers.last_mut() else {
            break;
        };
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                corner_radius: radius,
                opacity,
                border_color,
                label,
                element,
            } => {
                let egui_rect = to_egui(rect, offset);
                if egui_rect.width() < 0.5 || egui_rect.height() < 0.5 || *opacity <= 0.0 {
                    continue;
                }

                // Cull off-screen
                if !layer.painter.clip_rect().intersects(egui_rect) {
                    continue;
                }

                let rounding = corner_radius(*radius);
                let fill = theme::resolve(*color, mode).gamma_multiply(*opacity);
                layer.painter.rect_filled(egui_rect, rounding, fill);

                if let Some(bc) = border_color {
                    let stroke_color = theme::resolve(*bc, mode).gamma_multiply(*opacity);
                    layer.painter.rect_stroke(
                        egui_rect,
                        rounding,
                        Stroke::new(1.0, stroke_color),
                        StrokeKind::Outside,
                    );
                }

                // Caption along the bottom edge of the rect
                if let Some(label_str) = label.as_deref() {
                    if !label_str.is_empty() && egui_rect.width() > 24.0 && egui_rect.height() > 20.0 {
                        let text_color =
                            theme::resolve(ThemeToken::TextPrimary, mode).gamma_multiply(*opacity);
                        let text_rect = egui_rect.shrink(6.0);
                        let galley = layer.painter.layout_no_wrap(
                            label_str.to_string(),
                            FontId::proportional(11.0),
                            text_color,
                        );
                        // Truncate: only draw if text fits
                        if galley.size().x <= text_rect.width() {
                            let text_pos =
                                Pos2::new(text_rect.left(), text_rect.bottom() - galley.size().y);
                            layer.painter.galley(text_pos, galley, text_color);
                        }
                    }
                }

                if let Some(key) = element {
                    if layer.hit_testable {
                        hit_regions.push(HitRegion {
                            rect: egui_rect,
                            element: key.clone(),
                        });
                    }
                }
            }

            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
            } => {
                let x = position.x as f32 + offset.x;
                let y = position.y as f32 + offset.y;
                let size = *font_size as f32;
                if size < 1.0 {
                    continue;
                }

                let text_color = theme::resolve(*color, mode);
                let anchor = match align {
                    TextAlign::Left => Align2::LEFT_CENTER,
                    TextAlign::Center => Align2::CENTER_CENTER,
                    TextAlign::Right => Align2::RIGHT_CENTER,
                };

                layer.painter.text(
                    Pos2::new(x, y),
                    anchor,
                    text.as_str(),
                    FontId::proportional(size),
                    text_color,
                );
            }

            RenderCommand::DrawImage {
                rect,
                image,
                corner_radius: radius,
                opacity,
            } => {
                let egui_rect = to_egui(rect, offset);
                if *opacity <= 0.0 || !layer.painter.clip_rect().intersects(egui_rect) {
                    continue;
                }
                let Some(texture) = images.get(image) else {
                    continue;
                };
                let uv = cover_uv(texture.size_vec2(), egui_rect.size());
                let tint = Color32::WHITE.gamma_multiply(*opacity);
                let shape = RectShape::filled(egui_rect, corner_radius(*radius), tint)
                    .with_texture(texture.id(), uv);
                layer.painter.add(Shape::Rect(shape));
            }

            RenderCommand::SetClip { rect } => {
                let clip_rect = to_egui(rect, offset);
                let current = layer.painter.clip_rect();
                layer.clip_stack.push(current);
                layer.painter.set_clip_rect(current.intersect(clip_rect));
            }

            RenderCommand::ClearClip => {
                if let Some(prev) = layer.clip_stack.pop() {
                    layer.painter.set_clip_rect(prev);
                }
            }

            RenderCommand::BeginLayer {
                id, hit_testable, ..
            } => {
                // Foreground layers are painted after every panel. The
                // painter never allocates a response, so input falls
                // through to whatever is underneath.
                let painter = layer
                    .painter
                    .clone()
                    .with_layer_id(LayerId::new(Order::Foreground, Id::new(id.as_str())));
                layers.push(LayerState {
                    painter,
                    clip_stack: Vec::new(),
                    hit_testable: *hit_testable,
                });
            }

            RenderCommand::EndLayer => {
                if layers.len() > 1 {
                    layers.pop();
                }
            }

            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {
                // Groups carry no visual effect in egui
            }
        }
    }

    RenderResult { hit_regions }
}
