use std::time::Duration;

use serde::{Deserialize, Serialize};
use story_deck_protocol::ElementKey;

use super::curve::SnappyCurve;
use super::ghost::GhostContent;
use super::record::{Completion, Phase, TransitionRecord};
use super::registry::TransitionRegistry;

/// Fixed timings of a transition leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionTiming {
    /// Wait after arming so a freshly pushed destination gets one render
    /// pass to report its rect.
    pub settle_delay_ms: u64,
    /// Length of each leg.
    pub duration_ms: u64,
}

impl TransitionTiming {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl Default for TransitionTiming {
    fn default() -> Self {
        Self {
            settle_delay_ms: 60,
            duration_ms: 350,
        }
    }
}

/// A change of a key's controlling "animate" flag.
///
/// `animate = true` presents (source to destination), `false` dismisses.
/// Fields other than `key` and `animate` are snapshot into the record when
/// the request activates it.
pub struct TransitionRequest {
    pub key: ElementKey,
    pub animate: bool,
    pub ghost: Option<GhostContent>,
    pub source_corner_radius: f64,
    pub destination_corner_radius: f64,
    pub z_priority: f64,
    pub completion: Option<Completion>,
}

impl TransitionRequest {
    pub fn forward(key: impl Into<ElementKey>, ghost: GhostContent) -> Self {
        Self {
            key: key.into(),
            animate: true,
            ghost: Some(ghost),
            source_corner_radius: 0.0,
            destination_corner_radius: 0.0,
            z_priority: 0.0,
            completion: None,
        }
    }

    pub fn reverse(key: impl Into<ElementKey>) -> Self {
        Self {
            key: key.into(),
            animate: false,
            ghost: None,
            source_corner_radius: 0.0,
            destination_corner_radius: 0.0,
            z_priority: 0.0,
            completion: None,
        }
    }

    pub fn corner_radii(mut self, source: f64, destination: f64) -> Self {
        self.source_corner_radius = source;
        self.destination_corner_radius = destination;
        self
    }

    pub fn z_priority(mut self, z: f64) -> Self {
        self.z_priority = z;
        self
    }

    pub fn on_complete(mut self, completion: impl FnMut(bool) + 'static) -> Self {
        self.completion = Some(Box::new(completion));
        self
    }
}

impl std::fmt::Debug for TransitionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionRequest")
            .field("key", &self.key)
            .field("animate", &self.animate)
            .field("ghost", &self.ghost)
            .field("z_priority", &self.z_priority)
            .finish_non_exhaustive()
    }
}

/// Phase changes reported by [`TransitionCoordinator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionEvent {
    Armed(ElementKey),
    ForwardStarted(ElementKey),
    Settled(ElementKey),
    ReverseStarted(ElementKey),
    Reset(ElementKey),
    /// A reverse leg was abandoned for a new forward request.
    Cancelled(ElementKey),
}

/// Drives every record through
/// `Idle -> Armed -> ForwardAnimating -> Settled -> ReverseAnimating -> Idle`.
///
/// Time is supplied by the caller (`now` since session start) so the frame
/// clock, not the coordinator, decides when animation advances. Keys are
/// independent; z-priority only affects paint order.
#[derive(Debug, Clone, Default)]
pub struct TransitionCoordinator {
    timing: TransitionTiming,
    curve: SnappyCurve,
}

impl TransitionCoordinator {
    pub fn new(timing: TransitionTiming) -> Self {
        Self {
            timing,
            curve: SnappyCurve::new(),
        }
    }

    pub fn timing(&self) -> TransitionTiming {
        self.timing
    }

    pub fn phase(&self, registry: &TransitionRegistry, key: &str) -> Phase {
        registry.get(key).map_or(Phase::Idle, |r| r.phase)
    }

    /// Apply a flip of the key's animate flag.
    ///
    /// Redundant requests (present while already presenting, dismiss while
    /// idle) are ignored. A present during the reverse leg cancels it and
    /// re-arms from the ghost's current position; the cancelled leg never
    /// reports completion.
    pub fn request(
        &self,
        registry: &mut TransitionRegistry,
        request: TransitionRequest,
        now: Duration,
    ) -> Option<TransitionEvent> {
        let index = registry.ensure(&request.key);
        let record = &mut registry[index];
        let key = record.key.clone();

        if request.animate {
            let cancelled = match record.phase {
                Phase::Idle => false,
                Phase::ReverseAnimating { .. } => true,
                Phase::Armed { .. } | Phase::ForwardAnimating { .. } | Phase::Settled => {
                    tracing::debug!(%key, phase = record.phase.name(), "present ignored");
                    return None;
                }
            };
            Self::activate(record, request, cancelled);
            record.animate = true;
            record.hide_ghost = false;
            record.phase = Phase::Armed { since: now };
            if cancelled {
                tracing::debug!(%key, position = record.position, "reverse cancelled, re-armed");
                return Some(TransitionEvent::Cancelled(key));
            }
            tracing::debug!(%key, "armed");
            return Some(TransitionEvent::Armed(key));
        }

        match record.phase {
            Phase::Idle | Phase::ReverseAnimating { .. } => {
                tracing::debug!(%key, phase = record.phase.name(), "dismiss ignored");
                None
            }
            Phase::Armed { .. } | Phase::ForwardAnimating { .. } | Phase::Settled => {
                if let Some(completion) = request.completion {
                    record.completion = Some(completion);
                }
                record.hide_ghost = false;
                record.animate = false;
                record.phase = Phase::ReverseAnimating {
                    started: now,
                    from: record.position,
                };
                tracing::debug!(%key, from = record.position, "reverse started");
                Some(TransitionEvent::ReverseStarted(key))
            }
        }
    }

    /// A fresh cycle always replaces the completion; a restarted one keeps
    /// the cancelled cycle's callback unless the request brings its own.
    fn activate(record: &mut TransitionRecord, request: TransitionRequest, restarted: bool) {
        record.is_active = true;
        if let Some(ghost) = request.ghost {
            record.ghost = Some(ghost);
        }
        record.source_corner_radius = request.source_corner_radius;
        record.destination_corner_radius = request.destination_corner_radius;
        record.z_priority = request.z_priority;
        if !restarted || request.completion.is_some() {
            record.completion = request.completion;
        }
    }

    /// Advance every active record to `now`, invoking completion callbacks
    /// for legs that settle.
    pub fn tick(&self, registry: &mut TransitionRegistry, now: Duration) -> Vec<TransitionEvent> {
        let mut events = Vec::new();
        for record in registry.iter_mut() {
            if let Some(event) = self.advance(record, now) {
                events.push(event);
            }
        }
        events
    }

    fn progress(&self, started: Duration, now: Duration) -> f64 {
        let duration = self.timing.duration().as_secs_f64();
        if duration <= 0.0 {
            return 1.0;
        }
        (now.saturating_sub(started).as_secs_f64() / duration).min(1.0)
    }

    fn advance(&self, record: &mut TransitionRecord, now: Duration) -> Option<TransitionEvent> {
        match record.phase {
            Phase::Idle | Phase::Settled => None,
            Phase::Armed { since } => {
                // Hold at the current position until both endpoints exist.
                if now.saturating_sub(since) < self.timing.settle_delay() || !record.has_endpoints()
                {
                    return None;
                }
                record.phase = Phase::ForwardAnimating {
                    started: now,
                    from: record.position,
                };
                tracing::debug!(key = %record.key, "forward started");
                Some(TransitionEvent::ForwardStarted(record.key.clone()))
            }
            Phase::ForwardAnimating { started, from } => {
                let t = self.progress(started, now);
                record.position = from + (1.0 - from) * self.curve.sample(t);
                if t < 1.0 {
                    return None;
                }
                record.position = 1.0;
                record.hide_ghost = true;
                record.phase = Phase::Settled;
                tracing::debug!(key = %record.key, "settled");
                record.complete(true);
                Some(TransitionEvent::Settled(record.key.clone()))
            }
            Phase::ReverseAnimating { started, from } => {
                let t = self.progress(started, now);
                record.position = from * (1.0 - self.curve.sample(t));
                if t < 1.0 {
                    return None;
                }
                let completion = record.completion.take();
                record.reset();
                tracing::debug!(key = %record.key, "reset");
                if let Some(mut completion) = completion {
                    completion(false);
                }
                Some(TransitionEvent::Reset(record.key.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use story_deck_protocol::{Rect, ThemeToken};

    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn ghost() -> GhostContent {
        GhostContent::Tile {
            color: ThemeToken::TileRose,
            label: None,
        }
    }

    fn with_endpoints(registry: &mut TransitionRegistry, key: &str) {
        let record = registry.get_mut(key).unwrap();
        record.source_rect = Some(Rect::new(0.0, 0.0, 100.0, 100.0));
        record.destination_rect = Some(Rect::new(0.0, 200.0, 300.0, 300.0));
    }

    fn calls() -> (Rc<RefCell<Vec<bool>>>, impl FnMut(bool) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |forward| sink.borrow_mut().push(forward))
    }

    #[test]
    fn forward_request_arms_immediately() {
        let coordinator = TransitionCoordinator::default();
        let mut registry = TransitionRegistry::new();
        let event = coordinator.request(
            &mut registry,
            TransitionRequest::forward("k", ghost()).corner_radii(10.0, 0.0).z_priority(2.0),
            ms(0),
        );
        assert_eq!(event, Some(TransitionEvent::Armed(ElementKey::from("k"))));
        let record = registry.get("k").unwrap();
        assert!(record.is_active);
        assert!(record.ghost.is_some());
        assert_eq!(record.source_corner_radius, 10.0);
        assert_eq!(record.z_priority, 2.0);
    }

    #[test]
    fn waits_for_settle_delay() {
        let coordinator = TransitionCoordinator::default();
        let mut registry = TransitionRegistry::new();
        coordinator.request(&mut registry, TransitionRequest::forward("k", ghost()), ms(0));
        with_endpoints(&mut registry, "k");
        assert!(coordinator.tick(&mut registry, ms(59)).is_empty());
        assert_eq!(
            coordinator.tick(&mut registry, ms(60)),
            vec![TransitionEvent::ForwardStarted(ElementKey::from("k"))]
        );
    }

    #[test]
    fn holds_at_source_until_destination_known() {
        let coordinator = TransitionCoordinator::default();
        let mut registry = TransitionRegistry::new();
        coordinator.request(&mut registry, TransitionRequest::forward("k", ghost()), ms(0));
        registry.get_mut("k").unwrap().source_rect = Some(Rect::new(0.0, 0.0, 1.0, 1.0));

        assert!(coordinator.tick(&mut registry, ms(500)).is_empty());
        assert!(matches!(coordinator.phase(&registry, "k"), Phase::Armed { .. }));
        assert_eq!(registry.get("k").unwrap().position, 0.0);

        registry.get_mut("k").unwrap().destination_rect = Some(Rect::new(5.0, 5.0, 5.0, 5.0));
        coordinator.tick(&mut registry, ms(510));
        assert!(matches!(
            coordinator.phase(&registry, "k"),
            Phase::ForwardAnimating { started, .. } if started == ms(510)
        ));
    }

    #[test]
    fn full_cycle_reports_each_direction_once() {
        let coordinator = TransitionCoordinator::default();
        let mut registry = TransitionRegistry::new();
        let (log, completion) = calls();
        coordinator.request(
            &mut registry,
            TransitionRequest::forward("k", ghost()).on_complete(completion),
            ms(0),
        );
        with_endpoints(&mut registry, "k");
        coordinator.tick(&mut registry, ms(60));
        coordinator.tick(&mut registry, ms(200));
        let mid = registry.get("k").unwrap().position;
        assert!(mid > 0.0 && mid < 1.0);
        coordinator.tick(&mut registry, ms(410));
        coordinator.tick(&mut registry, ms(420));
        assert_eq!(*log.borrow(), vec![true]);
        let record = registry.get("k").unwrap();
        assert!(record.hide_ghost);
        assert_eq!(record.phase, Phase::Settled);

        coordinator.request(&mut registry, TransitionRequest::reverse("k"), ms(1000));
        assert!(!registry.get("k").unwrap().hide_ghost);
        coordinator.tick(&mut registry, ms(1350));
        coordinator.tick(&mut registry, ms(1400));
        assert_eq!(*log.borrow(), vec![true, false]);

        let record = registry.get("k").unwrap();
        assert!(!record.is_active);
        assert!(record.ghost.is_none());
        assert!(record.source_rect.is_none() && record.destination_rect.is_none());
        assert_eq!(record.source_corner_radius, 0.0);
        assert_eq!(record.destination_corner_radius, 0.0);
        assert_eq!(record.z_priority, 0.0);
        assert_eq!(record.phase, Phase::Idle);
    }

    #[test]
    fn completion_does_not_outlive_its_cycle() {
        let coordinator = TransitionCoordinator::default();
        let mut registry = TransitionRegistry::new();
        let (log, completion) = calls();
        coordinator.request(
            &mut registry,
            TransitionRequest::forward("k", ghost()).on_complete(completion),
            ms(0),
        );
        with_endpoints(&mut registry, "k");
        coordinator.tick(&mut registry, ms(60));
        coordinator.tick(&mut registry, ms(410));
        coordinator.request(&mut registry, TransitionRequest::reverse("k"), ms(500));
        coordinator.tick(&mut registry, ms(850));
        assert_eq!(*log.borrow(), vec![true, false]);

        coordinator.request(&mut registry, TransitionRequest::forward("k", ghost()), ms(1000));
        with_endpoints(&mut registry, "k");
        coordinator.tick(&mut registry, ms(1060));
        coordinator.tick(&mut registry, ms(1410));
        assert_eq!(coordinator.phase(&registry, "k"), Phase::Settled);
        coordinator.request(&mut registry, TransitionRequest::reverse("k"), ms(1500));
        coordinator.tick(&mut registry, ms(1850));
        assert_eq!(coordinator.phase(&registry, "k"), Phase::Idle);
        assert_eq!(*log.borrow(), vec![true, false]);
    }

    #[test]
    fn redundant_requests_are_ignored() {
        let coordinator = TransitionCoordinator::default();
        let mut registry = TransitionRegistry::new();
        assert!(coordinator
            .request(&mut registry, TransitionRequest::reverse("k"), ms(0))
            .is_none());
        assert!(!registry.get("k").unwrap().is_active);

        coordinator.request(&mut registry, TransitionRequest::forward("k", ghost()), ms(0));
        assert!(coordinator
            .request(&mut registry, TransitionRequest::forward("k", ghost()), ms(10))
            .is_none());
        assert!(matches!(
            coordinator.phase(&registry, "k"),
            Phase::Armed { since } if since == ms(0)
        ));
    }

    #[test]
    fn forward_during_reverse_cancels_and_rearms() {
        let coordinator = TransitionCoordinator::default();
        let mut registry = TransitionRegistry::new();
        let (log, completion) = calls();
        coordinator.request(
            &mut registry,
            TransitionRequest::forward("k", ghost()).on_complete(completion),
            ms(0),
        );
        with_endpoints(&mut registry, "k");
        coordinator.tick(&mut registry, ms(60));
        coordinator.tick(&mut registry, ms(410));
        coordinator.request(&mut registry, TransitionRequest::reverse("k"), ms(500));
        coordinator.tick(&mut registry, ms(600));
        let position = registry.get("k").unwrap().position;
        assert!(position > 0.0 && position < 1.0);

        let event = coordinator.request(&mut registry, TransitionRequest::forward("k", ghost()), ms(600));
        assert_eq!(event, Some(TransitionEvent::Cancelled(ElementKey::from("k"))));
        let record = registry.get("k").unwrap();
        assert!(record.is_active);
        assert!(record.has_endpoints());
        assert_eq!(record.position, position);

        coordinator.tick(&mut registry, ms(660));
        coordinator.tick(&mut registry, ms(1010));
        assert_eq!(*log.borrow(), vec![true, true]);
        assert_eq!(registry.get("k").unwrap().position, 1.0);
    }

    #[test]
    fn dismiss_while_forward_reverses_from_current_position() {
        let coordinator = TransitionCoordinator::default();
        let mut registry = TransitionRegistry::new();
        coordinator.request(&mut registry, TransitionRequest::forward("k", ghost()), ms(0));
        with_endpoints(&mut registry, "k");
        coordinator.tick(&mut registry, ms(60));
        coordinator.tick(&mut registry, ms(150));
        let position = registry.get("k").unwrap().position;

        coordinator.request(&mut registry, TransitionRequest::reverse("k"), ms(150));
        assert!(matches!(
            coordinator.phase(&registry, "k"),
            Phase::ReverseAnimating { from, .. } if from == position
        ));
        coordinator.tick(&mut registry, ms(500));
        assert_eq!(coordinator.phase(&registry, "k"), Phase::Idle);
    }

    #[test]
    fn keys_animate_independently() {
        let coordinator = TransitionCoordinator::default();
        let mut registry = TransitionRegistry::new();
        coordinator.request(&mut registry, TransitionRequest::forward("a", ghost()), ms(0));
        coordinator.request(&mut registry, TransitionRequest::forward("b", ghost()), ms(100));
        with_endpoints(&mut registry, "a");
        with_endpoints(&mut registry, "b");
        coordinator.tick(&mut registry, ms(60));
        coordinator.tick(&mut registry, ms(160));
        coordinator.tick(&mut registry, ms(410));
        assert_eq!(coordinator.phase(&registry, "a"), Phase::Settled);
        assert!(matches!(
            coordinator.phase(&registry, "b"),
            Phase::ForwardAnimating { .. }
        ));
    }

    #[test]
    fn timing_deserializes_with_defaults() {
        let timing: TransitionTiming = serde_json::from_str(r#"{"duration_ms": 500}"#).unwrap();
        assert_eq!(timing.duration(), ms(500));
        assert_eq!(timing.settle_delay(), ms(60));
    }
}
