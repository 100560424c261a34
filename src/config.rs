//! Client configuration.
//!
//! Read from `<config dir>/chordbook/config.yaml` when present. Every key is
//! optional:
//!
//! ```yaml
//! api_base: https://chords.example.com/api
//! fret_count: 5
//! max_starting_fret: 19
//! default_numerator: 3
//! default_denominator: 4
//! default_measures_per_line: 4
//! default_measure_count: 8
//! token_file: /home/me/.chordbook-token
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use chordbook_core::{
    Sequence, DEFAULT_DENOMINATOR, DEFAULT_MEASURES_PER_LINE, DEFAULT_MEASURE_COUNT,
    DEFAULT_NUMERATOR, FRET_COUNT, MAX_STARTING_FRET,
};

use crate::error::AppError;

pub const CONFIG_DIR_NAME: &str = "chordbook";
pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const TOKEN_FILE_NAME: &str = "refresh_token";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix of every endpoint path
    pub api_base: String,
    /// Frets shown by the chord editor's window
    pub fret_count: u8,
    /// Upper bound of the editor's starting-fret stepper
    pub max_starting_fret: u8,
    pub default_numerator: u8,
    pub default_denominator: u8,
    pub default_measures_per_line: u8,
    pub default_measure_count: usize,
    /// Where the refresh token is persisted; defaults next to the config file
    pub token_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: "/api".to_string(),
            fret_count: FRET_COUNT,
            max_starting_fret: MAX_STARTING_FRET,
            default_numerator: DEFAULT_NUMERATOR,
            default_denominator: DEFAULT_DENOMINATOR,
            default_measures_per_line: DEFAULT_MEASURES_PER_LINE,
            default_measure_count: DEFAULT_MEASURE_COUNT,
            token_file: None,
        }
    }
}

impl ClientConfig {
    pub fn from_yaml(path: &Path, content: &str) -> Result<Self, AppError> {
        // An empty file is a valid, all-default config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| AppError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
        debug!(path = %path.display(), "loaded config");
        Self::from_yaml(path, &content)
    }

    /// Load the default config file, falling back to defaults when it is missing
    pub fn load_or_default() -> Result<Self, AppError> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// The sequence a song starts with before one is saved
    pub fn default_sequence(&self) -> Sequence {
        Sequence::with_empty_measures(
            self.default_numerator,
            self.default_denominator,
            self.default_measures_per_line,
            self.default_measure_count,
        )
    }

    pub fn token_path(&self) -> Option<PathBuf> {
        self.token_file
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(TOKEN_FILE_NAME)))
    }

    /// Join `path` (starting with `/`) onto `api_base`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
