use serde::{Deserialize, Serialize};

use crate::key::ElementKey;
use crate::theme::ThemeToken;
use crate::types::{Point, Rect};

/// A single, stateless render instruction.
///
/// Views and the transition overlay emit a `Vec<RenderCommand>` per frame.
/// Renderers consume this list sequentially: each command carries all the
/// data it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled, optionally rounded rectangle, optionally with a text
    /// label and the element it belongs to (for hit-testing).
    DrawRect {
        rect: Rect,
        color: ThemeToken,
        corner_radius: f64,
        /// 0.0 (invisible) to 1.0 (opaque). Transition markers drive this.
        opacity: f32,
        border_color: Option<ThemeToken>,
        label: Option<String>,
        element: Option<ElementKey>,
    },

    /// Draw a text string at a position.
    DrawText {
        position: Point,
        text: String,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    },

    /// Paint the fetched image of `image` scaled to fill `rect`, cropped
    /// to its corner radius. Emitted over a placeholder `DrawRect`;
    /// renderers with no decoded image for the key draw nothing.
    DrawImage {
        rect: Rect,
        image: ElementKey,
        corner_radius: f64,
        opacity: f32,
    },

    /// Restrict subsequent drawing to a rectangular region.
    SetClip { rect: Rect },

    /// Remove the active clip region.
    ClearClip,

    /// Begin a logical group (e.g. one story tile).
    BeginGroup { id: String, label: Option<String> },

    /// End the current group.
    EndGroup,

    /// Begin a compositing layer painted above everything with a lower
    /// `z_index`. When `hit_testable` is false, renderers must let pointer
    /// input fall through to the content underneath.
    BeginLayer {
        id: String,
        z_index: i32,
        hit_testable: bool,
    },

    /// End the current layer.
    EndLayer,
}

impl RenderCommand {
    /// The element a command belongs to, if it participates in hit-testing.
    pub fn element(&self) -> Option<&ElementKey> {
        match self {
            RenderCommand::DrawRect { element, .. } => element.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}
