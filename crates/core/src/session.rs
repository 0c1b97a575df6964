//! One running deck: the story list, the pushed detail screen and the
//! transitions between them.

use std::time::Duration;

use story_deck_protocol::{Point, Rect, RenderCommand, ThemeToken, Viewport};

use crate::layout::{LayoutKind, LayoutPlanner};
use crate::model::StoryList;
use crate::overlay::{OverlayPresenter, ScenePhase};
use crate::transition::{
    GeometryRegistry, TransitionCoordinator, TransitionEvent, TransitionRegistry,
    TransitionRequest, TransitionTiming,
};
use crate::views::detail::render_detail;
use crate::views::list::{list_content_rect, render_list};
use crate::views::{DETAIL_CORNER_RADIUS, HitRegion, TILE_CORNER_RADIUS};

/// Which screen is on top of the navigation stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    List,
    Detail(usize),
}

/// Everything a frontend needs to present one frame.
#[derive(Debug, Default)]
pub struct DeckFrame {
    pub commands: Vec<RenderCommand>,
    pub events: Vec<TransitionEvent>,
}

#[derive(Debug)]
pub struct DeckSession {
    stories: StoryList,
    planner: LayoutPlanner,
    transitions: TransitionRegistry,
    geometry: GeometryRegistry,
    coordinator: TransitionCoordinator,
    overlay: OverlayPresenter,
    route: Route,
    viewport: Viewport,
    scroll_y: f64,
    content_height: f64,
    list_hits: Vec<HitRegion>,
    back_button: Option<Rect>,
}

impl DeckSession {
    pub fn new(stories: StoryList, planner: LayoutPlanner, timing: TransitionTiming) -> Self {
        Self {
            stories,
            planner,
            transitions: TransitionRegistry::new(),
            geometry: GeometryRegistry::new(),
            coordinator: TransitionCoordinator::new(timing),
            overlay: OverlayPresenter::new(),
            route: Route::List,
            viewport: Viewport::new(0.0, 0.0),
            scroll_y: 0.0,
            content_height: 0.0,
            list_hits: Vec::new(),
            back_button: None,
        }
    }

    pub fn stories(&self) -> &StoryList {
        &self.stories
    }

    pub fn stories_mut(&mut self) -> &mut StoryList {
        &mut self.stories
    }

    pub fn transitions(&self) -> &TransitionRegistry {
        &self.transitions
    }

    pub fn coordinator(&self) -> &TransitionCoordinator {
        &self.coordinator
    }

    pub fn overlay(&self) -> &OverlayPresenter {
        &self.overlay
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn layout(&self) -> LayoutKind {
        self.planner.kind
    }

    /// Switch the list arrangement. Scroll position is reset because slot
    /// positions are not comparable across arrangements.
    pub fn set_layout(&mut self, kind: LayoutKind) {
        if self.planner.kind != kind {
            tracing::info!(layout = %kind, "layout changed");
            self.planner.kind = kind;
            self.scroll_y = 0.0;
        }
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Scroll the list by `dy`, clamped to the laid-out content.
    pub fn scroll_by(&mut self, dy: f64) {
        let visible = list_content_rect(&self.viewport).h;
        let max = (self.content_height - visible).max(0.0);
        self.scroll_y = (self.scroll_y + dy).clamp(0.0, max);
    }

    /// Tiles that can be tapped in the last rendered list frame.
    pub fn list_hits(&self) -> &[HitRegion] {
        &self.list_hits
    }

    pub fn on_scene_phase(&mut self, phase: ScenePhase) {
        self.overlay.on_scene_phase(phase, self.viewport.bounds());
    }

    /// Whether any transition is still moving and frames should keep coming.
    pub fn is_animating(&self) -> bool {
        self.transitions.iter().any(|record| {
            record.is_active && !matches!(record.phase, crate::transition::Phase::Settled)
        })
    }

    /// Push the detail screen for the `index`-th story and start its
    /// forward transition. Ignored while a detail screen is already shown.
    pub fn open(&mut self, index: usize, now: Duration) -> Option<TransitionEvent> {
        if self.route != Route::List {
            return None;
        }
        let story = self.stories.get(index)?;
        let key = story.element_key();
        let ghost = story.ghost(ThemeToken::tile(index));
        let completion_key = key.clone();
        let request = TransitionRequest::forward(key, ghost)
            .corner_radii(TILE_CORNER_RADIUS, DETAIL_CORNER_RADIUS)
            // Later transitions paint above earlier ones.
            .z_priority(now.as_secs_f64())
            .on_complete(move |forward| {
                tracing::info!(key = %completion_key, forward, "transition complete");
            });
        let event = self.coordinator.request(&mut self.transitions, request, now);
        self.route = Route::Detail(index);
        event
    }

    pub fn open_by_id(&mut self, id: &str, now: Duration) -> Option<TransitionEvent> {
        let index = self.stories.position_by_id(id)?;
        self.open(index, now)
    }

    /// Pop the detail screen and send the story back to its tile.
    pub fn close(&mut self, now: Duration) -> Option<TransitionEvent> {
        let Route::Detail(index) = self.route else {
            return None;
        };
        self.route = Route::List;
        self.back_button = None;
        let key = self.stories.get(index)?.element_key();
        self.coordinator
            .request(&mut self.transitions, TransitionRequest::reverse(key), now)
    }

    /// Route a tap. The overlay never captures input, so taps always reach
    /// the screen underneath.
    pub fn tap(&mut self, point: Point, now: Duration) -> Option<TransitionEvent> {
        if self.overlay.hit_test(point).is_some() {
            return None;
        }
        match self.route {
            Route::Detail(_) => {
                if self.back_button.is_some_and(|rect| rect.contains(point)) {
                    self.close(now)
                } else {
                    None
                }
            }
            Route::List => {
                let index = self
                    .list_hits
                    .iter()
                    .find(|hit| hit.rect.contains(point))
                    .map(|hit| hit.index)?;
                self.open(index, now)
            }
        }
    }

    /// Advance transitions to `now`, lay out every screen and compose the
    /// overlay on top.
    ///
    /// The list stays laid out underneath a pushed detail screen so its
    /// tiles keep reporting geometry; only its draw commands are dropped.
    pub fn frame(&mut self, viewport: Viewport, now: Duration) -> DeckFrame {
        if self.viewport != viewport {
            self.viewport = viewport;
            self.overlay.resize(viewport.bounds());
        }
        let events = self.coordinator.tick(&mut self.transitions, now);

        self.geometry.begin_pass();
        let list = render_list(
            &self.stories,
            &self.planner,
            &viewport,
            self.scroll_y,
            &mut self.transitions,
            &mut self.geometry,
        );
        self.content_height = list.content_height;

        let mut commands = match self.route {
            Route::List => {
                self.list_hits = list.hits;
                list.commands
            }
            Route::Detail(index) => {
                self.list_hits.clear();
                match self.stories.get(index) {
                    Some(story) => {
                        let detail = render_detail(
                            story,
                            index,
                            &viewport,
                            &self.transitions,
                            &mut self.geometry,
                        );
                        self.back_button = Some(detail.back_button);
                        detail.commands
                    }
                    None => Vec::new(),
                }
            }
        };
        self.geometry.publish(&mut self.transitions);
        commands.extend(self.overlay.compose(&self.transitions));

        DeckFrame { commands, events }
    }
}
