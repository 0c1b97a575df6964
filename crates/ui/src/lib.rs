mod app;
mod images;
mod renderer;
mod theme;

pub use app::StoryDeckApp;
