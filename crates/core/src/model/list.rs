use rand::SeedableRng;
use rand::rngs::StdRng;

use super::story::StoryMetadata;
use crate::layout::pinterest::placeholder_heights;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Fetching,
    Success,
    /// Human-readable description of what went wrong.
    Failure(String),
}

/// Stories shown by the list screen and the state of their fetch.
///
/// Every story carries a placeholder height for the pinterest layout,
/// drawn once when the story arrives so the layout is stable across
/// frames.
#[derive(Debug)]
pub struct StoryList {
    status: FetchStatus,
    stories: Vec<StoryMetadata>,
    heights: Vec<u32>,
    rng: StdRng,
}

impl StoryList {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Fixed seed for reproducible placeholder heights.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            status: FetchStatus::Fetching,
            stories: Vec::new(),
            heights: Vec::new(),
            rng,
        }
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn stories(&self) -> &[StoryMetadata] {
        &self.stories
    }

    pub fn heights(&self) -> &[u32] {
        &self.heights
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StoryMetadata> {
        self.stories.get(index)
    }

    pub fn position_by_id(&self, id: &str) -> Option<usize> {
        self.stories.iter().position(|s| s.id == id)
    }

    pub fn position_by_key(&self, key: &str) -> Option<usize> {
        self.stories.iter().position(|s| s.element_key() == key)
    }

    /// A fetch has been (re)issued.
    pub fn begin_fetch(&mut self) {
        self.status = FetchStatus::Fetching;
    }

    /// Apply a fetch result: a batch is appended to what is already
    /// listed; an error becomes a terminal failure status.
    pub fn finish<E: std::fmt::Display>(&mut self, result: Result<Vec<StoryMetadata>, E>) {
        match result {
            Ok(batch) => {
                tracing::info!(count = batch.len(), "stories loaded");
                self.heights
                    .extend(placeholder_heights(batch.len(), &mut self.rng));
                self.stories.extend(batch);
                self.status = FetchStatus::Success;
            }
            Err(e) => {
                tracing::warn!(error = %e, "story fetch failed");
                self.status = FetchStatus::Failure(e.to_string());
            }
        }
    }
}

impl Default for StoryList {
    fn default() -> Self {
        Self::new()
    }
}
