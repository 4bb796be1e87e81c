use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::Difficulty;
use crate::error::GameError;
use crate::game_storage::DEFAULT_SAVE_FILE;
use crate::rules::Side;
use crate::timer::DEFAULT_SECONDS;

/// Session settings. Every field has a default so a config file only
/// needs the keys it changes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub initial_seconds: f64,
    pub difficulty: Difficulty,
    pub human_vs_human: bool,
    /// The human's color when playing the computer.
    pub human_side: Side,
    pub save_path: PathBuf,
    /// Fixed seed for the computer's random choices.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_seconds: DEFAULT_SECONDS,
            difficulty: Difficulty::Medium,
            human_vs_human: false,
            human_side: Side::White,
            save_path: PathBuf::from(DEFAULT_SAVE_FILE),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Read a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GameError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: GameConfig = serde_json::from_str(r#"{"difficulty": "Hard", "seed": 9}"#).unwrap();
        assert_eq!(
            config,
            GameConfig {
                difficulty: Difficulty::Hard,
                seed: Some(9),
                ..GameConfig::default()
            }
        );
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("chess_session_config_{}.json", std::process::id()));
        fs::write(&path, r#"{"human_vs_human": true, "initial_seconds": 300.0}"#).unwrap();
        let config = GameConfig::from_file(&path).unwrap();
        assert!(config.human_vs_human);
        assert_eq!(config.initial_seconds, 300.0);
        assert_eq!(config.human_side, Side::White);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_invalid_json_is_a_config_error() {
        let err: GameError = serde_json::from_str::<GameConfig>("{not json")
            .map_err(GameError::from)
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));
    }
}
