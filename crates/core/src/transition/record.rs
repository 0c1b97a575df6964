use std::time::Duration;

use story_deck_protocol::{ElementKey, Rect};

use super::ghost::GhostContent;

/// Called once per leg when it settles: `true` after the forward leg,
/// `false` after the reverse leg.
pub type Completion = Box<dyn FnMut(bool)>;

/// Where a key is in its transition cycle.
///
/// `Idle -> Armed -> ForwardAnimating -> Settled -> ReverseAnimating -> Idle`.
/// Animating phases remember when the leg started and the ghost position
/// it started from, so a leg can begin mid-flight after a cancellation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    Armed { since: Duration },
    ForwardAnimating { started: Duration, from: f64 },
    Settled,
    ReverseAnimating { started: Duration, from: f64 },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Armed { .. } => "armed",
            Phase::ForwardAnimating { .. } => "forward",
            Phase::Settled => "settled",
            Phase::ReverseAnimating { .. } => "reverse",
        }
    }
}

/// Transition state for one element key.
///
/// Records are created lazily and never removed: a finished cycle resets
/// the record so the same key (e.g. a tile scrolled back into view) can
/// animate again.
pub struct TransitionRecord {
    pub key: ElementKey,
    /// True from the first forward request until the reverse leg resets.
    pub is_active: bool,
    /// Target of the current leg: `true` = destination, `false` = source.
    pub animate: bool,
    /// Present iff `is_active`.
    pub ghost: Option<GhostContent>,
    pub source_rect: Option<Rect>,
    pub destination_rect: Option<Rect>,
    pub source_corner_radius: f64,
    pub destination_corner_radius: f64,
    /// Set once the forward leg has committed its final frame.
    pub hide_ghost: bool,
    pub z_priority: f64,
    pub phase: Phase,
    /// Interpolated ghost position: 0 at the source rect, 1 at the
    /// destination rect.
    pub position: f64,
    pub(crate) completion: Option<Completion>,
}

impl TransitionRecord {
    pub fn new(key: ElementKey) -> Self {
        Self {
            key,
            is_active: false,
            animate: false,
            ghost: None,
            source_rect: None,
            destination_rect: None,
            source_corner_radius: 0.0,
            destination_corner_radius: 0.0,
            hide_ghost: false,
            z_priority: 0.0,
            phase: Phase::Idle,
            position: 0.0,
            completion: None,
        }
    }

    /// Both anchors are known, so the ghost has well-defined endpoints.
    pub fn has_endpoints(&self) -> bool {
        self.source_rect.is_some() && self.destination_rect.is_some()
    }

    /// The ghost frame for the current position, if it should be drawn.
    pub fn ghost_frame(&self) -> Option<(Rect, f64)> {
        if !self.is_active || self.hide_ghost || self.ghost.is_none() {
            return None;
        }
        let (source, destination) = self.source_rect.zip(self.destination_rect)?;
        let t = self.position;
        let radius = self.source_corner_radius
            + (self.destination_corner_radius - self.source_corner_radius) * t;
        Some((source.lerp(&destination, t), radius))
    }

    pub(crate) fn complete(&mut self, forward: bool) {
        if let Some(completion) = self.completion.as_mut() {
            completion(forward);
        }
    }

    /// Return to the inactive state. The completion callback is not
    /// touched; the reverse leg takes it before resetting.
    pub(crate) fn reset(&mut self) {
        self.is_active = false;
        self.animate = false;
        self.ghost = None;
        self.source_corner_radius = 0.0;
        self.destination_corner_radius = 0.0;
        self.source_rect = None;
        self.destination_rect = None;
        self.hide_ghost = false;
        self.z_priority = 0.0;
        self.phase = Phase::Idle;
        self.position = 0.0;
    }
}

impl std::fmt::Debug for TransitionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionRecord")
            .field("key", &self.key)
            .field("is_active", &self.is_active)
            .field("animate", &self.animate)
            .field("ghost", &self.ghost)
            .field("source_rect", &self.source_rect)
            .field("destination_rect", &self.destination_rect)
            .field("hide_ghost", &self.hide_ghost)
            .field("z_priority", &self.z_priority)
            .field("phase", &self.phase)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}
