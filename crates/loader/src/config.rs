use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use story_deck_core::layout::{LayoutKind, LayoutPlanner, UnknownLayout};
use story_deck_core::transition::TransitionTiming;
use thiserror::Error;

/// Listing the deck opens with: page 2 of the picsum catalogue, 100 items.
pub const DEFAULT_METADATA_ENDPOINT: &str = "https://picsum.photos/v2/list?page=2&limit=100";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub metadata_endpoint: String,
    /// Memory tier budget in bytes.
    pub memory_capacity: usize,
    /// Disk tier budget in bytes. Zero disables the disk tier.
    pub disk_capacity: u64,
    /// Overrides the platform cache directory.
    pub cache_dir: Option<PathBuf>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            metadata_endpoint: DEFAULT_METADATA_ENDPOINT.to_string(),
            memory_capacity: 50_000_000,
            disk_capacity: 100_000_000,
            cache_dir: None,
        }
    }
}

impl LoaderConfig {
    /// Where the disk tier lives: the configured directory, or
    /// `<platform cache dir>/story-deck/Resources`.
    pub fn resolved_cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("story-deck").join("Resources")))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Layout(#[from] UnknownLayout),
    #[error("missing value for {0}")]
    MissingValue(&'static str),
    #[error("unknown argument {0:?}")]
    UnknownArgument(String),
}

/// Everything a frontend needs to start a deck. Every section may be
/// omitted from the JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub layout: LayoutPlanner,
    pub timing: TransitionTiming,
    pub loader: LoaderConfig,
    /// Use the built-in sample listing instead of the network.
    pub offline: bool,
}

impl AppConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build from command-line arguments (without the program name):
    /// `[--layout <kind>] [--config <file.json>] [--offline]`. Flags
    /// override the file.
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut layout: Option<LayoutKind> = None;
        let mut config_path: Option<PathBuf> = None;
        let mut offline = false;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--layout" => {
                    let value = args.next().ok_or(ConfigError::MissingValue("--layout"))?;
                    layout = Some(value.parse()?);
                }
                "--config" => {
                    let value = args.next().ok_or(ConfigError::MissingValue("--config"))?;
                    config_path = Some(PathBuf::from(value));
                }
                "--offline" => offline = true,
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }

        let mut config = match config_path {
            Some(path) => Self::from_json_file(&path)?,
            None => Self::default(),
        };
        if let Some(kind) = layout {
            config.layout.kind = kind;
        }
        config.offline |= offline;
        Ok(config)
    }
}
