//! Game configuration and difficulty presets
//!
//! Configuration is read from TOML. Every field has a default, so an empty
//! file (or no file at all) yields a playable setup:
//!
//! ```toml
//! board_size = 15
//! agent_timeout_ms = 2000
//! default_level = "hard"
//! records_path = "data/games.jsonl"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::board::{Player, DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::error::ConfigError;

/// Opponent strength selected when a game is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Hard,
    Insane,
}

/// Search-effort / exploration / noise parameters for one difficulty.
/// Opaque to the session core; only the agents read them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelPreset {
    pub sims: u32,
    pub explore: f32,
    /// Probability that the heuristic agent shuffles its candidate list
    pub noise: f64,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Hard,
        Difficulty::Insane,
    ];

    pub fn preset(self) -> LevelPreset {
        match self {
            Difficulty::Beginner => LevelPreset { sims: 40, explore: 1.2, noise: 0.30 },
            Difficulty::Intermediate => LevelPreset { sims: 120, explore: 1.1, noise: 0.15 },
            Difficulty::Hard => LevelPreset { sims: 400, explore: 1.0, noise: 0.05 },
            Difficulty::Insane => LevelPreset { sims: 1200, explore: 1.0, noise: 0.0 },
        }
    }

    /// Insane is played by the model-backed agent, the rest by the heuristic one
    pub fn uses_model(self) -> bool {
        self == Difficulty::Insane
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Hard => "hard",
            Difficulty::Insane => "insane",
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_size: usize,
    /// Upper bound on one agent proposal before the raster fallback kicks in
    pub agent_timeout_ms: u64,
    /// Ask agents to pre-filter forbidden cells
    pub agent_ensure_legal: bool,
    pub default_level: Difficulty,
    /// Color the agent takes when enabled without an explicit color
    pub default_ai_color: Player,
    /// Append-only archive of finished games
    pub records_path: PathBuf,
    /// Supervised samples for the training collaborator; `None` disables extraction
    pub samples_path: Option<PathBuf>,
    pub model_version: String,
    /// Fixed RNG seed for reproducible agents
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            agent_timeout_ms: 2_000,
            agent_ensure_legal: true,
            default_level: Difficulty::Beginner,
            default_ai_color: Player::White,
            records_path: PathBuf::from("data/games.jsonl"),
            samples_path: Some(PathBuf::from("data/samples.jsonl")),
            model_version: "v0-heuristic".to_string(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig =
            toml::from_str(text).map_err(|source| ConfigError::Parse { source })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io { source })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&self.board_size) {
            return Err(ConfigError::InvalidSize {
                size: self.board_size,
                min: MIN_BOARD_SIZE,
                max: MAX_BOARD_SIZE,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn agent_timeout(&self) -> Duration {
        Duration::from_millis(self.agent_timeout_ms)
    }
}
