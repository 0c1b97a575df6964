use std::collections::HashMap;

use story_deck_protocol::{ElementKey, Rect};

use super::marker::{publish_destination, publish_source};
use super::registry::TransitionRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorRole {
    Source,
    Destination,
}

/// A rect reported by a marker, tagged with the render pass that saw it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub rect: Rect,
    pub pass: u64,
}

/// Last-reported on-screen rect for each `(role, key)`.
///
/// Markers write into the current pass while views lay out; at the end of
/// the pass [`publish`](Self::publish) hands the pass's anchors to the
/// transition records. Anchors left over from earlier passes (views that
/// are no longer laid out) are kept for inspection but never published.
#[derive(Debug, Default)]
pub struct GeometryRegistry {
    pass: u64,
    anchors: HashMap<(AnchorRole, ElementKey), Anchor>,
}

impl GeometryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new render pass and return its number.
    pub fn begin_pass(&mut self) -> u64 {
        self.pass += 1;
        self.pass
    }

    pub fn pass(&self) -> u64 {
        self.pass
    }

    /// Latest report within a pass wins.
    pub fn record(&mut self, role: AnchorRole, key: ElementKey, rect: Rect) {
        self.anchors.insert(
            (role, key),
            Anchor {
                rect,
                pass: self.pass,
            },
        );
    }

    pub fn anchor(&self, role: AnchorRole, key: &str) -> Option<Anchor> {
        // Keys borrow as `str`, but tuple keys can't; build a lookup key.
        self.anchors.get(&(role, ElementKey::from(key))).copied()
    }

    /// Apply this pass's anchors to the matching records. Returns how many
    /// record fields changed.
    pub fn publish(&self, registry: &mut TransitionRegistry) -> usize {
        let mut changed = 0;
        for ((role, key), anchor) in &self.anchors {
            if anchor.pass != self.pass {
                continue;
            }
            let Some(record) = registry.get_mut(key) else {
                continue;
            };
            let applied = match role {
                AnchorRole::Source => publish_source(record, anchor.rect),
                AnchorRole::Destination => publish_destination(record, anchor.rect),
            };
            if applied {
                tracing::trace!(%key, ?role, rect = ?anchor.rect, "anchor published");
                changed += 1;
            }
        }
        changed
    }
}
