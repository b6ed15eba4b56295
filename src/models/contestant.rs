use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Contestant {
    pub id: i32,
    pub name: String,
    pub score: i32,
}

impl Contestant {
    /// Name used when the admin leaves a contestant's name blank
    pub fn placeholder_name(id: i32) -> String {
        format!("Contestant {}", i64::from(id) + 1)
    }
}

/// How many contestants the displays show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GameMode {
    #[default]
    Two,
    Three,
}

impl GameMode {
    pub fn contestant_count(self) -> usize {
        match self {
            GameMode::Two => 2,
            GameMode::Three => 3,
        }
    }
}

impl TryFrom<u8> for GameMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(GameMode::Two),
            3 => Ok(GameMode::Three),
            other => Err(format!("mode must be 2 or 3, got {}", other)),
        }
    }
}

impl From<GameMode> for u8 {
    fn from(mode: GameMode) -> Self {
        mode.contestant_count() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub round: i32,
    pub mode: GameMode,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            round: 1,
            mode: GameMode::Two,
        }
    }
}

/// Row shape of the `game_settings` table
#[derive(Debug, Clone, FromRow)]
pub struct GameSettingsRecord {
    pub mode: i16,
    pub current_round: i32,
}

impl GameSettingsRecord {
    /// Falls back to the default mode if the stored value is out of range
    pub fn into_settings(self) -> GameSettings {
        let mode = u8::try_from(self.mode)
            .ok()
            .and_then(|m| GameMode::try_from(m).ok())
            .unwrap_or_default();
        GameSettings {
            round: self.current_round,
            mode,
        }
    }
}

/// The complete scoreboard: every contestant plus the game settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreboardData {
    pub contestants: Vec<Contestant>,
    pub round: i32,
    pub mode: GameMode,
}

impl ScoreboardData {
    pub fn settings(&self) -> GameSettings {
        GameSettings {
            round: self.round,
            mode: self.mode,
        }
    }

    /// Contestants the displays should render for the current mode
    pub fn visible_contestants(&self) -> Vec<Contestant> {
        self.contestants
            .iter()
            .take(self.mode.contestant_count())
            .cloned()
            .collect()
    }

    pub fn visible(&self) -> ScoreboardData {
        ScoreboardData {
            contestants: self.visible_contestants(),
            round: self.round,
            mode: self.mode,
        }
    }
}

/// Contestant entry as sent by the admin console, where name and score may be missing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContestantInput {
    pub id: i32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub score: Option<i32>,
}

impl ContestantInput {
    pub fn normalize(self) -> Contestant {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| Contestant::placeholder_name(self.id));

        Contestant {
            id: self.id,
            name,
            score: self.score.unwrap_or(0),
        }
    }
}

/// Full scoreboard replacement sent by the admin console
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreboardUpdate {
    pub contestants: Vec<ContestantInput>,
    pub round: i32,
    pub mode: GameMode,
}
