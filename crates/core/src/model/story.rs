use serde::{Deserialize, Serialize};
use story_deck_protocol::{ElementKey, ThemeToken};
use thiserror::Error;
use url::Url;

use crate::transition::GhostContent;

/// Edge length requested for list thumbnails.
pub const THUMBNAIL_EDGE: u32 = 150;

#[derive(Debug, Error)]
pub enum StoryDecodeError {
    #[error("invalid url {url:?}: {source}")]
    Url {
        url: String,
        source: url::ParseError,
    },
    #[error("download url {0:?} has too few path segments for a thumbnail")]
    ShortPath(String),
}

/// One entry of the metadata listing.
///
/// Decoded from the listing's snake_case JSON. `download_url` is rewritten
/// on decode to request a thumbnail-sized variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawStory")]
pub struct StoryMetadata {
    pub id: String,
    pub author: String,
    pub url: Url,
    pub download_url: Url,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
struct RawStory {
    id: String,
    author: String,
    url: String,
    download_url: String,
}

impl TryFrom<RawStory> for StoryMetadata {
    type Error = StoryDecodeError;

    fn try_from(raw: RawStory) -> Result<Self, Self::Error> {
        let url = parse_url(&raw.url)?;
        let download_url = thumbnail_url(&raw.download_url)?;
        Ok(Self {
            id: raw.id,
            author: raw.author,
            url,
            download_url,
        })
    }
}

fn parse_url(raw: &str) -> Result<Url, StoryDecodeError> {
    Url::parse(raw).map_err(|source| StoryDecodeError::Url {
        url: raw.to_string(),
        source,
    })
}

/// Replace the last two path segments (the full-size width and height)
/// with the thumbnail edge: `.../id/0/5000/3333` becomes `.../id/0/150/150`.
pub fn thumbnail_url(raw: &str) -> Result<Url, StoryDecodeError> {
    let mut url = parse_url(raw)?;
    let segments = url.path_segments().map_or(0, |s| s.count());
    if segments < 2 {
        return Err(StoryDecodeError::ShortPath(raw.to_string()));
    }
    let edge = THUMBNAIL_EDGE.to_string();
    url.path_segments_mut()
        .map_err(|()| StoryDecodeError::ShortPath(raw.to_string()))?
        .pop()
        .pop()
        .extend([edge.as_str(), edge.as_str()]);
    Ok(url)
}

impl StoryMetadata {
    /// Key shared by the story's list tile and its detail view.
    pub fn element_key(&self) -> ElementKey {
        ElementKey::from(format!("story-{}", self.id))
    }

    /// Snapshot floated by the overlay while this story transitions.
    pub fn ghost(&self, color: ThemeToken) -> GhostContent {
        GhostContent::Story {
            id: self.id.clone(),
            author: self.author.clone(),
            color,
            image: self.element_key(),
        }
    }
}

/// Deterministic stand-in listing with ids `0..count`, used offline and in
/// tests.
pub fn sample_stories(count: usize) -> Vec<StoryMetadata> {
    const AUTHORS: [&str; 6] = [
        "Alejandro Escamilla",
        "Paul Jarvis",
        "Aleks Dorohovich",
        "Vadim Sherbakov",
        "Yoni Kaplan-Nadel",
        "Jerry Adney",
    ];
    (0..count)
        .filter_map(|i| {
            let raw = RawStory {
                id: i.to_string(),
                author: AUTHORS[i % AUTHORS.len()].to_string(),
                url: format!("https://unsplash.com/photos/sample-{i}"),
                download_url: format!("https://picsum.photos/id/{i}/5000/3333"),
            };
            StoryMetadata::try_from(raw).ok()
        })
        .collect()
}
