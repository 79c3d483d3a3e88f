use std::fmt;

use crate::card::GameCard;
use crate::model::TeamId;

pub const NO_MATCHES_TEXT: &str = "No games match your filters.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TeamFilter {
    #[default]
    All,
    Team(TeamId),
}

impl TeamFilter {
    pub fn matches(&self, card: &GameCard) -> bool {
        match self {
            TeamFilter::All => true,
            TeamFilter::Team(id) => card.involves(*id),
        }
    }
}

/// Reserved for prediction confidence. Every level passes every game for now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfidenceLevel {
    #[default]
    All,
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn next(self) -> Self {
        match self {
            ConfidenceLevel::All => ConfidenceLevel::High,
            ConfidenceLevel::High => ConfidenceLevel::Medium,
            ConfidenceLevel::Medium => ConfidenceLevel::Low,
            ConfidenceLevel::Low => ConfidenceLevel::All,
        }
    }

    pub fn passes(&self, _card: &GameCard) -> bool {
        true
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfidenceLevel::All => "All",
            ConfidenceLevel::High => "High",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::Low => "Low",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterState {
    pub team: TeamFilter,
    pub confidence: ConfidenceLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GridStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    NoGamesScheduled,
    Failed(String),
}

/// The games area: cards, the counter readout and the single no-matches slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameGrid {
    pub cards: Vec<GameCard>,
    pub status: GridStatus,
    pub counter: String,
    pub no_matches: Option<&'static str>,
}

impl Default for GameGrid {
    fn default() -> Self {
        Self {
            cards: Vec::new(),
            status: GridStatus::Idle,
            counter: counter_label(0),
            no_matches: None,
        }
    }
}

impl GameGrid {
    pub fn visible_cards(&self) -> impl Iterator<Item = &GameCard> {
        self.cards.iter().filter(|c| c.visible)
    }

    pub fn start_loading(&mut self) {
        self.cards.clear();
        self.no_matches = None;
        self.status = GridStatus::Loading;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.cards.clear();
        self.no_matches = None;
        self.counter = counter_label(0);
        self.status = GridStatus::Failed(message.into());
    }
}

pub fn counter_label(count: usize) -> String {
    format!("{} game{}", count, if count == 1 { "" } else { "s" })
}

/// Recomputes card visibility and the readouts. Returns the visible count.
pub fn apply_filters(grid: &mut GameGrid, filters: &FilterState) -> usize {
    let mut visible = 0;
    for card in grid.cards.iter_mut() {
        card.visible = filters.team.matches(card) && filters.confidence.passes(card);
        if card.visible {
            visible += 1;
        }
    }

    grid.counter = counter_label(visible);
    grid.no_matches = if visible == 0 && !grid.cards.is_empty() {
        Some(NO_MATCHES_TEXT)
    } else {
        None
    };

    visible
}
