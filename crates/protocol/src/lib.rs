pub mod commands;
pub mod key;
pub mod theme;
pub mod types;

pub use commands::{RenderCommand, TextAlign};
pub use key::ElementKey;
pub use theme::ThemeToken;
pub use types::{Color, Point, Rect, Size, Viewport};
