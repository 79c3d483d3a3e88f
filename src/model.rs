use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric team id. This is the one key used for filtering, end to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub i64);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub abbreviation: String,
    pub full_name: String,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamesResponse {
    pub games: Vec<Game>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub game_id: String,
    pub game_time: String,
    pub status: Status,
    pub home_team: GameTeam,
    pub visitor_team: GameTeam,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameTeam {
    pub id: TeamId,
    pub name: String,
    pub abbreviation: String,
    pub score: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    pub id: u8, // 1 scheduled, 2 in progress, 3 final
    pub text: String,
}

impl Status {
    pub fn has_started(&self) -> bool {
        self.id > 1
    }
}
