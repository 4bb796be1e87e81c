use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::Difficulty;
use crate::error::GameError;
use crate::rules::Move;

pub const DEFAULT_SAVE_FILE: &str = "saved_game.txt";

const RECORD_LINES: usize = 5;

/// The flat five-line save record:
///
/// ```text
/// <position encoding>
/// <difficulty 1|2|3>
/// <comma-separated moves>
/// <white seconds>,<black seconds>
/// <0|1 human-vs-human flag>
/// ```
///
/// Captures, scores and status are not stored; they are re-derived from
/// the position on load.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SaveRecord {
    pub position: String,
    pub difficulty: Difficulty,
    pub move_history: Vec<Move>,
    pub white_seconds: f64,
    pub black_seconds: f64,
    pub human_vs_human: bool,
}

impl SaveRecord {
    pub fn encode(&self) -> String {
        let history: Vec<&str> = self.move_history.iter().map(Move::as_str).collect();
        format!(
            "{}\n{}\n{}\n{},{}\n{}\n",
            self.position,
            self.difficulty.token(),
            history.join(","),
            self.white_seconds,
            self.black_seconds,
            u8::from(self.human_vs_human),
        )
    }

    pub fn parse(text: &str) -> Result<Self, GameError> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        if lines.len() < RECORD_LINES {
            return Err(GameError::InvalidSaveFormat(format!(
                "expected {} lines, found {}",
                RECORD_LINES,
                lines.len()
            )));
        }

        let position = lines[0].to_string();
        if position.is_empty() {
            return Err(GameError::InvalidSaveFormat("empty position line".to_string()));
        }

        let difficulty = Difficulty::from_token(lines[1])?;

        let move_history = if lines[2].is_empty() {
            Vec::new()
        } else {
            lines[2]
                .split(',')
                .map(|token| {
                    Move::parse(token).map_err(|_| {
                        GameError::InvalidSaveFormat(format!("bad move in history: {:?}", token))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        let (white_seconds, black_seconds) = parse_timers(lines[3])?;

        let human_vs_human = match lines[4] {
            "0" => false,
            "1" => true,
            other => return Err(GameError::InvalidModeFlag(other.to_string())),
        };

        Ok(Self {
            position,
            difficulty,
            move_history,
            white_seconds,
            black_seconds,
            human_vs_human,
        })
    }
}

fn parse_timers(line: &str) -> Result<(f64, f64), GameError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 2 {
        return Err(GameError::InvalidTimer(line.to_string()));
    }
    let parse = |field: &str| -> Result<f64, GameError> {
        match field.parse::<f64>() {
            Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => Ok(seconds),
            _ => Err(GameError::InvalidTimer(line.to_string())),
        }
    };
    Ok((parse(fields[0])?, parse(fields[1])?))
}

/// A save slot on disk holding one `SaveRecord`.
pub struct GameStorage {
    path: PathBuf,
}

impl GameStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn save(&self, record: &str) -> Result<(), GameError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, record)?;
        info!("game saved to {}", self.path.display());
        Ok(())
    }

    /// Raw record text; `NothingToLoad` when no save exists yet.
    pub fn load(&self) -> Result<String, GameError> {
        if !self.exists() {
            return Err(GameError::NothingToLoad(self.path.display().to_string()));
        }
        Ok(fs::read_to_string(&self.path)?)
    }
}

impl Default for GameStorage {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_FILE)
    }
}
