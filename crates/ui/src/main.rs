use anyhow::Result;
use story_deck_loader::AppConfig;
use story_deck_ui::StoryDeckApp;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_args(std::env::args().skip(1))?;
    tracing::info!(layout = %config.layout.kind, offline = config.offline, "starting");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Stories")
            .with_inner_size([420.0, 860.0]),
        ..Default::default()
    };
    eframe::run_native(
        "story-deck",
        options,
        Box::new(move |cc| Ok(Box::new(StoryDeckApp::new(cc, config)?))),
    )
    .map_err(|e| anyhow::anyhow!("failed to run eframe: {e}"))
}
