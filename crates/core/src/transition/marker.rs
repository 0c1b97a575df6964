use story_deck_protocol::{ElementKey, Rect};

use super::geometry::{AnchorRole, GeometryRegistry};
use super::record::{Phase, TransitionRecord};
use super::registry::TransitionRegistry;

/// Wraps the element a transition starts from (a list tile).
#[derive(Debug, Clone)]
pub struct SourceMarker {
    key: ElementKey,
}

impl SourceMarker {
    pub fn new(key: impl Into<ElementKey>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &ElementKey {
        &self.key
    }

    /// First appearance of the source: make sure the key has a record.
    pub fn appear(&self, registry: &mut TransitionRegistry) {
        registry.ensure(&self.key);
    }

    /// Report this pass's rect (only while the key is active) and return
    /// the opacity the wrapped content should be drawn with.
    pub fn layout(
        &self,
        registry: &TransitionRegistry,
        geometry: &mut GeometryRegistry,
        rect: Rect,
    ) -> f32 {
        if registry.get(&self.key).is_some_and(|r| r.is_active) {
            geometry.record(AnchorRole::Source, self.key.clone(), rect);
        }
        self.opacity(registry)
    }

    /// Hidden once the destination has appeared, in either direction, so
    /// the source and its counterpart are never both visible.
    pub fn opacity(&self, registry: &TransitionRegistry) -> f32 {
        match registry.get(&self.key) {
            Some(record) if record.destination_rect.is_some() => 0.0,
            _ => 1.0,
        }
    }
}

/// Wraps the element a transition lands on (the detail image).
#[derive(Debug, Clone)]
pub struct DestinationMarker {
    key: ElementKey,
}

impl DestinationMarker {
    pub fn new(key: impl Into<ElementKey>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &ElementKey {
        &self.key
    }

    pub fn layout(
        &self,
        registry: &TransitionRegistry,
        geometry: &mut GeometryRegistry,
        rect: Rect,
    ) -> f32 {
        if registry.get(&self.key).is_some_and(|r| r.is_active) {
            geometry.record(AnchorRole::Destination, self.key.clone(), rect);
        }
        self.opacity(registry)
    }

    /// While active the ghost stands in for the destination until the
    /// forward leg has settled.
    pub fn opacity(&self, registry: &TransitionRegistry) -> f32 {
        match registry.get(&self.key) {
            Some(record) if record.is_active && !record.hide_ghost => 0.0,
            _ => 1.0,
        }
    }
}

/// Apply a source anchor. First write wins for the whole cycle, so the
/// ghost's start point stays put even if the list scrolls underneath.
pub(crate) fn publish_source(record: &mut TransitionRecord, rect: Rect) -> bool {
    if !record.is_active || record.source_rect.is_some() {
        return false;
    }
    record.source_rect = Some(rect);
    true
}

/// Apply a destination anchor. Accepted while the forward leg has not
/// completed and the ghost still rests on the source; once the ghost
/// moves the rect is frozen and a later reverse leg starts from it.
pub(crate) fn publish_destination(record: &mut TransitionRecord, rect: Rect) -> bool {
    if !record.is_active || record.hide_ghost {
        return false;
    }
    let at_rest = matches!(record.phase, Phase::Armed { .. }) && record.position == 0.0;
    if record.destination_rect.is_some() && !at_rest {
        return false;
    }
    if record.destination_rect == Some(rect) {
        return false;
    }
    record.destination_rect = Some(rect);
    true
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn active_record() -> TransitionRecord {
        let mut record = TransitionRecord::new(ElementKey::from("k"));
        record.is_active = true;
        record.phase = Phase::Armed {
            since: Duration::ZERO,
        };
        record
    }

    #[test]
    fn unknown_keys_are_fully_visible() {
        let registry = TransitionRegistry::new();
        assert_eq!(SourceMarker::new("k").opacity(&registry), 1.0);
        assert_eq!(DestinationMarker::new("k").opacity(&registry), 1.0);
    }

    #[test]
    fn inactive_markers_do_not_report() {
        let mut registry = TransitionRegistry::new();
        let mut geometry = GeometryRegistry::new();
        let source = SourceMarker::new("k");
        source.appear(&mut registry);
        geometry.begin_pass();
        let opacity = source.layout(&registry, &mut geometry, Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(opacity, 1.0);
        assert!(geometry.anchor(AnchorRole::Source, "k").is_none());
    }

    #[test]
    fn source_first_write_wins() {
        let mut record = active_record();
        let first = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(publish_source(&mut record, first));
        assert!(!publish_source(&mut record, Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert_eq!(record.source_rect, Some(first));
    }

    #[test]
    fn source_ignored_when_inactive() {
        let mut record = TransitionRecord::new(ElementKey::from("k"));
        assert!(!publish_source(&mut record, Rect::new(0.0, 0.0, 1.0, 1.0)));
        assert!(record.source_rect.is_none());
    }

    #[test]
    fn destination_updates_only_while_armed_at_rest() {
        let mut record = active_record();
        let settled_layout = Rect::new(0.0, 100.0, 300.0, 300.0);
        assert!(publish_destination(&mut record, Rect::new(0.0, 90.0, 300.0, 300.0)));
        assert!(publish_destination(&mut record, settled_layout));

        record.phase = Phase::ForwardAnimating {
            started: Duration::ZERO,
            from: 0.0,
        };
        assert!(!publish_destination(&mut record, Rect::new(9.0, 9.0, 9.0, 9.0)));
        assert_eq!(record.destination_rect, Some(settled_layout));
    }

    #[test]
    fn destination_frozen_after_forward_leg() {
        let mut record = active_record();
        record.hide_ghost = true;
        assert!(!publish_destination(&mut record, Rect::new(0.0, 0.0, 1.0, 1.0)));
        assert!(record.destination_rect.is_none());
    }
}
