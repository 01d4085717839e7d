//! Configuration file handling
//!
//! Settings come from `<config dir>/spaced/config.toml` when present,
//! otherwise built-in defaults. Example:
//! ```toml
//! decks_dir = "/home/me/decks"
//!
//! [scheduler]
//! initial_ease_factor = 2.5
//! minimum_ease_factor = 1.3
//!
//! [scheduler.scores]
//! again = 0
//! hard = 3
//! good = 4
//! easy = 5
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::flashcards::algorithm::{SchedulerConfig, MIN_EASE_FACTOR, PASSING_SCORE};

const APP_DIR: &str = "spaced";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Could not determine data directory")]
    DataDirNotFound,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding deck files; defaults to the platform data dir
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decks_dir: Option<PathBuf>,
    pub scheduler: SchedulerConfig,
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join("config.toml"))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load and validate a config file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Check the scheduler settings keep SM-2 meaningful
    pub fn validate(&self) -> Result<()> {
        let scheduler = &self.scheduler;
        if !scheduler.minimum_ease_factor.is_finite()
            || scheduler.minimum_ease_factor < MIN_EASE_FACTOR
        {
            return Err(ConfigError::Invalid(format!(
                "minimum_ease_factor must be a number of at least {}, got {}",
                MIN_EASE_FACTOR, scheduler.minimum_ease_factor
            )));
        }
        if !scheduler.initial_ease_factor.is_finite()
            || scheduler.initial_ease_factor < scheduler.minimum_ease_factor
        {
            return Err(ConfigError::Invalid(format!(
                "initial_ease_factor must be a number of at least minimum_ease_factor {}, got {}",
                scheduler.minimum_ease_factor, scheduler.initial_ease_factor
            )));
        }

        let scores = &scheduler.scores;
        if [scores.again, scores.hard, scores.good, scores.easy]
            .iter()
            .any(|&s| s > 5)
        {
            return Err(ConfigError::Invalid("scores must be between 0 and 5".to_string()));
        }
        if scores.again >= PASSING_SCORE {
            return Err(ConfigError::Invalid(format!(
                "'again' must score below {}, got {}",
                PASSING_SCORE, scores.again
            )));
        }
        for (name, score) in [("hard", scores.hard), ("good", scores.good), ("easy", scores.easy)] {
            if score < PASSING_SCORE {
                return Err(ConfigError::Invalid(format!(
                    "'{}' must score at least {}, got {}",
                    name, PASSING_SCORE, score
                )));
            }
        }

        Ok(())
    }

    /// Resolve the deck directory: explicit setting or platform data dir
    pub fn decks_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.decks_dir {
            return Ok(dir.clone());
        }
        dirs::data_local_dir()
            .map(|p| p.join(APP_DIR).join("decks"))
            .ok_or(ConfigError::DataDirNotFound)
    }
}
