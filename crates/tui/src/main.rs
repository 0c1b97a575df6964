mod app;
mod renderer;

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use story_deck_loader::AppConfig;
use tracing_subscriber::EnvFilter;

/// Logs go to a file so they never draw over the terminal UI.
fn init_logging() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("story-deck");
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join("story-deck.log");
    let file = File::create(&path).with_context(|| format!("failed to open {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(path)
}

fn main() -> Result<()> {
    let config = match AppConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            eprintln!(
                "Usage: story-deck [--layout pinterest|grid|compositional] [--config <file.json>] [--offline]"
            );
            std::process::exit(2);
        }
    };
    let log_path = init_logging()?;
    tracing::info!(log = %log_path.display(), layout = %config.layout.kind, offline = config.offline, "starting");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let result = app::run(&config, runtime.handle().clone());
    if let Err(err) = &result {
        tracing::error!(%err, "exited with error");
    }
    result
}
