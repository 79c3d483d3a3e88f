use std::fmt;

use crate::model::{Game, GameTeam, TeamId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamBlock {
    pub name: String,
    pub abbreviation: String,
}

impl From<&GameTeam> for TeamBlock {
    fn from(team: &GameTeam) -> Self {
        Self {
            name: team.name.clone(),
            abbreviation: team.abbreviation.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBlock {
    Score { visitor: u32, home: u32 },
    Versus,
}

impl fmt::Display for ScoreBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreBlock::Score { visitor, home } => write!(f, "{} - {}", visitor, home),
            ScoreBlock::Versus => write!(f, "VS"),
        }
    }
}

/// One rendered game. Team ids ride along so filtering never reads display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameCard {
    pub game_id: String,
    pub home_team_id: TeamId,
    pub visitor_team_id: TeamId,
    pub status_line: String,
    pub visitor: TeamBlock,
    pub home: TeamBlock,
    pub score: ScoreBlock,
    pub visible: bool,
}

impl GameCard {
    pub fn involves(&self, team: TeamId) -> bool {
        self.home_team_id == team || self.visitor_team_id == team
    }
}

pub fn render(game: &Game) -> GameCard {
    let started = game.status.has_started();

    let status_line = if started {
        game.status.text.clone()
    } else {
        game.game_time.clone()
    };

    let score = match (started, game.visitor_team.score, game.home_team.score) {
        (true, Some(visitor), Some(home)) => ScoreBlock::Score { visitor, home },
        _ => ScoreBlock::Versus,
    };

    GameCard {
        game_id: game.game_id.clone(),
        home_team_id: game.home_team.id,
        visitor_team_id: game.visitor_team.id,
        status_line,
        visitor: TeamBlock::from(&game.visitor_team),
        home: TeamBlock::from(&game.home_team),
        score,
        visible: true,
    }
}
