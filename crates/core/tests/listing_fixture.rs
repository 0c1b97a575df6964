//! Integration test: decode a recorded listing response and open a story
//! from it.

use std::time::Duration;

use story_deck_core::layout::LayoutPlanner;
use story_deck_core::model::{FetchStatus, StoryList, StoryMetadata};
use story_deck_core::session::{DeckSession, Route};
use story_deck_core::transition::TransitionTiming;
use story_deck_protocol::Viewport;

#[test]
fn recorded_listing_feeds_the_deck() {
    let data = include_bytes!("fixtures/picsum-list.json");
    let stories: Vec<StoryMetadata> =
        serde_json::from_slice(data).expect("failed to decode listing");
    assert_eq!(stories.len(), 12);
    assert!(stories
        .iter()
        .all(|s| s.download_url.as_str().ends_with("/150/150")));

    let mut list = StoryList::with_seed(7);
    list.begin_fetch();
    assert_eq!(*list.status(), FetchStatus::Fetching);
    list.finish::<String>(Ok(stories));
    assert_eq!(*list.status(), FetchStatus::Success);
    assert_eq!(list.heights().len(), 12);

    let mut session = DeckSession::new(list, LayoutPlanner::default(), TransitionTiming::default());
    session.frame(Viewport::new(800.0, 600.0), Duration::ZERO);
    assert!(session.open_by_id("105", Duration::from_millis(5)).is_some());
    assert_eq!(session.route(), Route::Detail(5));
}
