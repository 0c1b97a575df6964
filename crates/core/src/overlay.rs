use story_deck_protocol::{ElementKey, Point, Rect, RenderCommand};

use crate::transition::TransitionRegistry;

/// Lifecycle of the hosting application scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePhase {
    Active,
    Inactive,
    Background,
}

/// The full-bounds, input-transparent surface ghosts are drawn on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySurface {
    pub bounds: Rect,
}

/// Hosts the floating ghosts above all regular content.
///
/// The surface is mounted the first time the scene becomes active and
/// kept for the rest of the session. If the host drops it (the app was
/// backgrounded) the next activation mounts a fresh one.
#[derive(Debug, Default)]
pub struct OverlayPresenter {
    surface: Option<OverlaySurface>,
    mounts: u32,
}

impl OverlayPresenter {
    pub const LAYER_ID: &'static str = "transition-overlay";
    /// Above every regular layer.
    pub const Z_INDEX: i32 = i32::MAX;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_scene_phase(&mut self, phase: ScenePhase, bounds: Rect) {
        match phase {
            ScenePhase::Active if self.surface.is_none() => {
                self.surface = Some(OverlaySurface { bounds });
                self.mounts += 1;
                tracing::debug!(mounts = self.mounts, ?bounds, "overlay surface mounted");
            }
            ScenePhase::Active | ScenePhase::Inactive => {}
            ScenePhase::Background => {
                if self.surface.take().is_some() {
                    tracing::debug!("overlay surface lost");
                }
            }
        }
    }

    /// Track window size changes without remounting.
    pub fn resize(&mut self, bounds: Rect) {
        if let Some(surface) = self.surface.as_mut() {
            surface.bounds = bounds;
        }
    }

    pub fn surface(&self) -> Option<&OverlaySurface> {
        self.surface.as_ref()
    }

    pub fn mount_count(&self) -> u32 {
        self.mounts
    }

    /// Draw one ghost per record that has both endpoints and has not
    /// finished its forward leg, lowest `z_priority` first.
    pub fn compose(&self, registry: &TransitionRegistry) -> Vec<RenderCommand> {
        let Some(surface) = self.surface else {
            return Vec::new();
        };

        let mut ghosts: Vec<_> = registry
            .iter()
            .filter_map(|record| {
                let (rect, radius) = record.ghost_frame()?;
                let ghost = record.ghost.as_ref()?;
                Some((record.z_priority, ghost, rect, radius))
            })
            .collect();
        if ghosts.is_empty() {
            return Vec::new();
        }
        // Stable: equal priorities keep registry order.
        ghosts.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut commands = vec![
            RenderCommand::BeginLayer {
                id: Self::LAYER_ID.to_string(),
                z_index: Self::Z_INDEX,
                hit_testable: false,
            },
            RenderCommand::SetClip {
                rect: surface.bounds,
            },
        ];
        for (_, ghost, rect, radius) in ghosts {
            commands.extend(ghost.draw(rect, radius));
        }
        commands.push(RenderCommand::ClearClip);
        commands.push(RenderCommand::EndLayer);
        commands
    }

    /// The overlay never takes input: every point falls through to the
    /// content underneath.
    pub fn hit_test(&self, _point: Point) -> Option<ElementKey> {
        None
    }
}

#[cfg(test)]
mod tests {
    use story_deck_protocol::ThemeToken;

    use super::*;
    use crate::transition::GhostContent;

    fn screen() -> Rect {
        Rect::new(0.0, 0.0, 400.0, 800.0)
    }

    fn ghost_record(registry: &mut TransitionRegistry, key: &str, z: f64, color: ThemeToken) {
        let idx = registry.ensure(&ElementKey::from(key));
        let record = &mut registry[idx];
        record.is_active = true;
        record.ghost = Some(GhostContent::Tile { color, label: None });
        record.source_rect = Some(Rect::new(0.0, 0.0, 10.0, 10.0));
        record.destination_rect = Some(Rect::new(0.0, 100.0, 100.0, 100.0));
        record.z_priority = z;
    }

    fn drawn_colors(commands: &[RenderCommand]) -> Vec<ThemeToken> {
        commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawRect { color, .. } => Some(*color),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn mounts_once_per_session() {
        let mut overlay = OverlayPresenter::new();
        assert!(overlay.surface().is_none());
        overlay.on_scene_phase(ScenePhase::Active, screen());
        overlay.on_scene_phase(ScenePhase::Inactive, screen());
        overlay.on_scene_phase(ScenePhase::Active, screen());
        assert_eq!(overlay.mount_count(), 1);
    }

    #[test]
    fn remounts_after_background() {
        let mut overlay = OverlayPresenter::new();
        overlay.on_scene_phase(ScenePhase::Active, screen());
        overlay.on_scene_phase(ScenePhase::Background, screen());
        assert!(overlay.surface().is_none());
        overlay.on_scene_phase(ScenePhase::Active, screen());
        assert_eq!(overlay.mount_count(), 2);
    }

    #[test]
    fn nothing_drawn_without_surface() {
        let mut registry = TransitionRegistry::new();
        ghost_record(&mut registry, "a", 0.0, ThemeToken::TileRose);
        assert!(OverlayPresenter::new().compose(&registry).is_empty());
    }

    #[test]
    fn ghosts_painted_in_z_order() {
        let mut overlay = OverlayPresenter::new();
        overlay.on_scene_phase(ScenePhase::Active, screen());
        let mut registry = TransitionRegistry::new();
        ghost_record(&mut registry, "top", 5.0, ThemeToken::TileRose);
        ghost_record(&mut registry, "bottom", 1.0, ThemeToken::TileSky);
        ghost_record(&mut registry, "tie", 5.0, ThemeToken::TileTeal);

        let cmds = overlay.compose(&registry);
        assert!(matches!(
            cmds.first(),
            Some(RenderCommand::BeginLayer { hit_testable: false, .. })
        ));
        assert_eq!(
            drawn_colors(&cmds),
            vec![ThemeToken::TileSky, ThemeToken::TileRose, ThemeToken::TileTeal]
        );
    }

    #[test]
    fn skips_hidden_and_incomplete_records() {
        let mut overlay = OverlayPresenter::new();
        overlay.on_scene_phase(ScenePhase::Active, screen());
        let mut registry = TransitionRegistry::new();
        ghost_record(&mut registry, "settled", 0.0, ThemeToken::TileRose);
        if let Some(r) = registry.get_mut("settled") {
            r.hide_ghost = true;
        }
        ghost_record(&mut registry, "waiting", 0.0, ThemeToken::TileSky);
        if let Some(r) = registry.get_mut("waiting") {
            r.destination_rect = None;
        }
        assert!(overlay.compose(&registry).is_empty());
    }

    #[test]
    fn hit_test_always_passes_through() {
        let mut overlay = OverlayPresenter::new();
        overlay.on_scene_phase(ScenePhase::Active, screen());
        assert!(overlay.hit_test(Point::new(5.0, 5.0)).is_none());
    }
}
