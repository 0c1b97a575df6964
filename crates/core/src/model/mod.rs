pub mod list;
pub mod story;

pub use list::{FetchStatus, StoryList};
pub use story::{StoryDecodeError, StoryMetadata, sample_stories, thumbnail_url};
