use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context as _, Result};
use eframe::egui;
use story_deck_core::model::{FetchStatus, StoryList, sample_stories};
use story_deck_core::overlay::ScenePhase;
use story_deck_core::session::{DeckSession, Route};
use story_deck_loader::{AppConfig, FetchResult, Fetcher, ResourceLoader};
use story_deck_protocol::{Point, ThemeToken, Viewport};

use crate::images::ImageStore;
use crate::renderer;
use crate::theme::{self, ThemeMode};

/// Size of the offline sample listing.
const SAMPLE_COUNT: usize = 100;

/// Format a byte count to human-readable string.
fn format_bytes(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Main application state.
pub struct StoryDeckApp {
    session: DeckSession,
    /// Dropped before the runtime so in-flight fetches are aborted first.
    fetcher: Fetcher,
    _runtime: tokio::runtime::Runtime,
    endpoint: String,
    offline: bool,
    theme_mode: ThemeMode,
    started: Instant,
    /// Last scene phase reported to the session.
    scene: Option<ScenePhase>,
    images: ImageStore,
}

impl StoryDeckApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Result<Self> {
        let theme_mode = ThemeMode::Dark;
        cc.egui_ctx.set_visuals(theme_mode.visuals());
        theme::apply_typography(&cc.egui_ctx);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("failed to start async runtime")?;
        let loader = ResourceLoader::from_config(&config.loader)?;
        let ctx = cc.egui_ctx.clone();
        let fetcher = Fetcher::new(runtime.handle().clone(), Arc::new(loader))
            .with_waker(move || ctx.request_repaint());

        let session = DeckSession::new(StoryList::new(), config.layout, config.timing);

        let mut app = Self {
            session,
            fetcher,
            _runtime: runtime,
            endpoint: config.loader.metadata_endpoint,
            offline: config.offline,
            theme_mode,
            started: Instant::now(),
            scene: None,
            images: ImageStore::default(),
        };
        app.load_listing();
        Ok(app)
    }

    /// Start loading the listing, or retry after a failure. A loaded
    /// listing is kept as is.
    fn load_listing(&mut self) {
        if *self.session.stories().status() == FetchStatus::Success {
            tracing::debug!("listing already loaded");
            return;
        }
        let stories = self.session.stories_mut();
        stories.begin_fetch();
        if self.offline {
            stories.finish::<String>(Ok(sample_stories(SAMPLE_COUNT)));
            tracing::info!(count = SAMPLE_COUNT, "loaded sample stories");
        } else {
            self.fetcher.fetch_metadata(self.endpoint.clone());
        }
    }

    fn apply_results(&mut self, ctx: &egui::Context) {
        for result in self.fetcher.drain() {
            match result {
                FetchResult::Metadata(result) => {
                    if let Err(err) = &result {
                        tracing::error!(%err, "story listing failed");
                    }
                    self.session.stories_mut().finish(result);
                }
                FetchResult::Image { key, result } => match result {
                    Ok(bytes) => self.images.insert(ctx, key, &bytes),
                    Err(err) => {
                        tracing::warn!(%key, %err, "thumbnail fetch failed");
                        self.images.mark_failed(key);
                    }
                },
            }
        }
    }

    /// Kick off thumbnail fetches for tiles on screen.
    fn request_visible_images(&mut self, ctx: &egui::Context) {
        let wanted: Vec<_> = self
            .session
            .list_hits()
            .iter()
            .filter(|hit| {
                self.images.wants(&hit.key) && !self.fetcher.is_fetching_image(&hit.key)
            })
            .filter_map(|hit| {
                let story = self.session.stories().get(hit.index)?;
                Some((hit.key.clone(), story.download_url.clone()))
            })
            .collect();
        for (key, url) in wanted {
            if let Some(bytes) = self.fetcher.fetch_image(key.clone(), &url) {
                self.images.insert(ctx, key, &bytes);
                ctx.request_repaint();
            }
        }
    }

    fn track_scene(&mut self, ctx: &egui::Context) {
        let (focused, minimized) =
            ctx.input(|i| (i.focused, i.viewport().minimized.unwrap_or(false)));
        let scene = if minimized {
            ScenePhase::Background
        } else if focused {
            ScenePhase::Active
        } else {
            ScenePhase::Inactive
        };
        // The first frame counts as active even before focus arrives.
        let scene = match (self.scene, scene) {
            (None, ScenePhase::Inactive) => ScenePhase::Active,
            (_, scene) => scene,
        };
        if self.scene != Some(scene) {
            tracing::debug!(?scene, "scene phase changed");
            self.scene = Some(scene);
            self.session.on_scene_phase(scene);
        }
    }
}

impl eframe::App for StoryDeckApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_results(ctx);
        let now = self.started.elapsed();

        // Top toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.session.route() != Route::List && ui.button("‹ Back").clicked() {
                    self.session.close(now);
                }
                ui.heading("Stories");
                ui.separator();
                let layout = self.session.layout();
                if ui.button(format!("Layout: {layout}")).clicked() {
                    self.session.set_layout(layout.next());
                }
                if matches!(self.session.stories().status(), FetchStatus::Failure(_))
                    && ui.button("⟳ Retry").clicked()
                {
                    self.load_listing();
                }
                let theme_label = match self.theme_mode {
                    ThemeMode::Dark => "🌙 Dark",
                    ThemeMode::Light => "☀ Light",
                };
                if ui.button(theme_label).clicked() {
                    self.theme_mode = self.theme_mode.toggled();
                    ctx.set_visuals(self.theme_mode.visuals());
                }
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let stories = self.session.stories();
                if let FetchStatus::Failure(message) = stories.status() {
                    ui.colored_label(ui.visuals().error_fg_color, message);
                    ui.separator();
                }
                ui.label(format!(
                    "Stories: {} | Thumbnails: {} ({}) | Transitions: {}",
                    stories.len(),
                    self.images.len(),
                    format_bytes(self.images.source_bytes()),
                    self.session.transitions().active_keys().count(),
                ));
            });
        });

        // Central panel: the deck
        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_rect_before_wrap();
            self.track_scene(ctx);

            let response = ui.allocate_rect(available, egui::Sense::click());
            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let point = Point::new(
                        f64::from(pos.x - available.left()),
                        f64::from(pos.y - available.top()),
                    );
                    self.session.tap(point, now);
                }
            }

            let scroll = ui.input(|i| i.smooth_scroll_delta);
            if scroll.y.abs() > 0.1 && self.session.route() == Route::List {
                self.session.scroll_by(-f64::from(scroll.y));
            }

            ui.input(|i| {
                if i.key_pressed(egui::Key::Escape) || i.key_pressed(egui::Key::Backspace) {
                    self.session.close(now);
                }
                if i.key_pressed(egui::Key::L) {
                    self.session.set_layout(self.session.layout().next());
                }
                if i.key_pressed(egui::Key::ArrowDown) {
                    self.session.scroll_by(60.0);
                }
                if i.key_pressed(egui::Key::ArrowUp) {
                    self.session.scroll_by(-60.0);
                }
            });

            let viewport = Viewport {
                x: 0.0,
                y: 0.0,
                width: f64::from(available.width()),
                height: f64::from(available.height()),
                dpr: f64::from(ctx.pixels_per_point()),
            };
            let frame = self.session.frame(viewport, now);
            for event in &frame.events {
                tracing::debug!(?event, "transition event");
            }

            let painter = ui.painter_at(available);
            let bg = theme::resolve(ThemeToken::Background, self.theme_mode);
            painter.rect_filled(available, egui::CornerRadius::ZERO, bg);
            let result = renderer::render_commands(
                &painter,
                &frame.commands,
                available.min,
                self.theme_mode,
                &self.images,
            );

            if let Some(pos) = response.hover_pos() {
                if result.hit_regions.iter().any(|hit| hit.rect.contains(pos)) {
                    ctx.set_cursor_icon(egui::CursorIcon::PointingHand);
                }
            }
        });

        self.request_visible_images(ctx);
        if self.session.is_animating() {
            ctx.request_repaint();
        }
    }
}
