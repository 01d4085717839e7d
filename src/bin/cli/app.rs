use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use spaced_lib::config::Config;
use spaced_lib::flashcards::JsonDeckStore;

/// Shared application state for CLI commands
pub struct App {
    pub config: Config,
    pub store: JsonDeckStore,
}

impl App {
    /// Load configuration and open the deck directory
    pub fn new(config_path: Option<&Path>, decks_dir: Option<PathBuf>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::load().context("Failed to load config")?,
        };

        let decks_dir = match decks_dir {
            Some(dir) => dir,
            None => config.decks_dir().context("Failed to get deck directory")?,
        };
        log::debug!("Using deck directory {:?}", decks_dir);

        Ok(Self {
            config,
            store: JsonDeckStore::new(decks_dir),
        })
    }
}
