use std::io::{Stdout, stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Paragraph},
};
use story_deck_core::model::{FetchStatus, StoryList, sample_stories};
use story_deck_core::overlay::ScenePhase;
use story_deck_core::session::{DeckSession, Route};
use story_deck_loader::{AppConfig, FetchResult, Fetcher, ResourceLoader};
use story_deck_protocol::Viewport;
use tokio::runtime::Handle;

use crate::renderer::{self, CellScale};

const SAMPLE_COUNT: usize = 100;
const IDLE_POLL: Duration = Duration::from_millis(100);
const ANIMATION_POLL: Duration = Duration::from_millis(16);

struct TuiApp {
    session: DeckSession,
    fetcher: Fetcher,
    config: AppConfig,
    started: Instant,
    /// Position of the selected tile among the visible ones.
    selected: usize,
    scale: CellScale,
    quit: bool,
}

impl TuiApp {
    fn new(config: &AppConfig, runtime: Handle) -> Result<Self> {
        let loader = ResourceLoader::from_config(&config.loader)?;
        let mut app = Self {
            session: DeckSession::new(StoryList::new(), config.layout, config.timing),
            fetcher: Fetcher::new(runtime, Arc::new(loader)),
            config: config.clone(),
            started: Instant::now(),
            selected: 0,
            scale: CellScale::default(),
            quit: false,
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
        if self.config.offline {
            stories.finish::<String>(Ok(sample_stories(SAMPLE_COUNT)));
        } else {
            self.fetcher.fetch_metadata(self.config.loader.metadata_endpoint.clone());
        }
    }

    fn apply_results(&mut self) {
        for result in self.fetcher.drain() {
            if let FetchResult::Metadata(result) = result {
                if let Err(err) = &result {
                    tracing::error!(%err, "story listing failed");
                }
                self.session.stories_mut().finish(result);
            }
        }
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn open_selected(&mut self) {
        let Some(index) = self.session.list_hits().get(self.selected).map(|hit| hit.index) else {
            return;
        };
        let now = self.now();
        self.session.open(index, now);
    }

    fn move_selection(&mut self, delta: isize) {
        let count = self.session.list_hits().len();
        if count == 0 {
            self.selected = 0;
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(count - 1);
    }

    fn handle_event(&mut self, event: Event, content: Rect) {
        let now = self.now();
        let step = self.scale.y * 2.0;
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') => self.quit = true,
                KeyCode::Esc | KeyCode::Backspace => {
                    if self.session.route() == Route::List {
                        if key.code == KeyCode::Esc {
                            self.quit = true;
                        }
                    } else {
                        self.session.close(now);
                    }
                }
                KeyCode::Enter => self.open_selected(),
                KeyCode::Left | KeyCode::BackTab => self.move_selection(-1),
                KeyCode::Right | KeyCode::Tab => self.move_selection(1),
                KeyCode::Up => self.session.scroll_by(-step),
                KeyCode::Down => self.session.scroll_by(step),
                KeyCode::Char('l') => {
                    self.session.set_layout(self.session.layout().next());
                    self.selected = 0;
                }
                KeyCode::Char('r') => self.load_listing(),
                _ => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => self.session.scroll_by(step),
                MouseEventKind::ScrollUp => self.session.scroll_by(-step),
                MouseEventKind::Down(MouseButton::Left) => {
                    if mouse.row >= content.y && mouse.column >= content.x {
                        let point = self
                            .scale
                            .cell_center(mouse.column - content.x, mouse.row - content.y);
                        self.session.tap(point, now);
                    }
                }
                _ => {}
            },
            Event::FocusGained => self.session.on_scene_phase(ScenePhase::Active),
            Event::FocusLost => self.session.on_scene_phase(ScenePhase::Inactive),
            _ => {}
        }
    }

    fn status_line(&self) -> String {
        let stories = self.session.stories();
        let state = match stories.status() {
            FetchStatus::Fetching => "loading",
            FetchStatus::Success => "ready",
            FetchStatus::Failure(_) => "error",
        };
        format!(
            " {} stories ({state}) | {} | ←→ select ⏎ open esc back | ↑↓ scroll | l layout | r retry | q quit ",
            stories.len(),
            self.session.layout(),
        )
    }

    fn draw(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<Rect> {
        let size = terminal.size()?;
        let content = Rect::new(0, 0, size.width, size.height.saturating_sub(1));
        let (width, height) = self.scale.logical_size(content);
        let viewport = Viewport {
            x: 0.0,
            y: 0.0,
            width,
            height,
            dpr: 1.0,
        };
        let now = self.now();
        let frame = self.session.frame(viewport, now);
        for event in &frame.events {
            tracing::debug!(?event, "transition event");
        }
        let hits = self.session.list_hits();
        self.selected = self.selected.min(hits.len().saturating_sub(1));
        let selected = hits.get(self.selected).map(|hit| hit.rect);
        let status = self.status_line();

        terminal.draw(|f| {
            let area = f.area();
            f.render_widget(Block::default().style(Style::default().bg(Color::Black)), content);
            renderer::render_commands(f.buffer_mut(), content, &frame.commands, self.scale);
            if let Some(rect) = selected {
                renderer::outline(f.buffer_mut(), content, &rect, Color::Green, self.scale);
            }
            let status_area = Rect::new(0, area.height.saturating_sub(1), area.width, 1);
            f.render_widget(
                Paragraph::new(status).style(Style::default().fg(Color::White).bg(Color::DarkGray)),
                status_area,
            );
        })?;
        Ok(content)
    }
}

pub fn run(config: &AppConfig, runtime: Handle) -> Result<()> {
    let mut app = TuiApp::new(config, runtime)?;

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    app.session.on_scene_phase(ScenePhase::Active);

    let result = event_loop(&mut app, &mut terminal);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop(app: &mut TuiApp, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    while !app.quit {
        app.apply_results();
        let content = app.draw(terminal)?;

        let poll = if app.session.is_animating() {
            ANIMATION_POLL
        } else {
            IDLE_POLL
        };
        if event::poll(poll)? {
            let event = event::read()?;
            app.handle_event(event, content);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> TuiApp {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let mut config = AppConfig {
            offline: true,
            ..AppConfig::default()
        };
        config.loader.disk_capacity = 0;
        TuiApp::new(&config, runtime.handle().clone()).unwrap()
    }

    #[test]
    fn offline_listing_is_loaded_immediately() {
        let app = app();
        assert_eq!(app.session.stories().len(), SAMPLE_COUNT);
        assert_eq!(*app.session.stories().status(), FetchStatus::Success);
    }

    #[test]
    fn selection_stays_in_range() {
        let mut app = app();
        app.move_selection(5);
        assert_eq!(app.selected, 0);
        app.move_selection(-1);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn escape_on_list_quits() {
        let mut app = app();
        let key = crossterm::event::KeyEvent::new(KeyCode::Esc, crossterm::event::KeyModifiers::NONE);
        app.handle_event(Event::Key(key), Rect::new(0, 0, 80, 24));
        assert!(app.quit);
    }
}
