use std::collections::{HashMap, HashSet};

use crossterm::event::KeyCode;
use image::DynamicImage;
use ratatui::widgets::ListState;
use tracing::{debug, info, warn};

use crate::card::{self, GameCard};
use crate::data::FetchResult;
use crate::dates::{self, CalendarDate};
use crate::filter::{self, ConfidenceLevel, FilterState, GameGrid, GridStatus, TeamFilter};
use crate::model::{Game, Team};
use crate::week::{compute_week, DateSelected, WeekView};

pub const LOAD_FAILED_TEXT: &str = "Failed to load games. Please try again later.";
pub const NO_GAMES_TEXT: &str = "No games scheduled for this date.";
const MAX_DATE_INPUT_LEN: usize = 10;

/// Results coming back from background tasks.
#[derive(Debug)]
pub enum AppEvent {
    TeamsLoaded(FetchResult<Vec<Team>>),
    GamesLoaded {
        generation: u64,
        date_input: String,
        result: FetchResult<Vec<Game>>,
    },
    LogoLoaded {
        abbreviation: String,
        image: Option<DynamicImage>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub date_input: String,
    pub api_date: String,
}

/// Work the UI loop hands off to background tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchGames(FetchRequest),
    FetchLogo(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Week,
    Filters,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamOption {
    pub label: String,
    pub filter: TeamFilter,
}

impl TeamOption {
    fn all() -> Self {
        Self {
            label: "All teams".to_string(),
            filter: TeamFilter::All,
        }
    }
}

impl From<&Team> for TeamOption {
    fn from(team: &Team) -> Self {
        Self {
            label: team.full_name.clone(),
            filter: TeamFilter::Team(team.id),
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub should_quit: bool,
    pub today: CalendarDate,
    pub date_input: String,
    pub date_edit: Option<String>,
    pub displayed_date: String,
    pub week: WeekView,
    pub team_options: Vec<TeamOption>,
    pub team_state: ListState,
    pub confidence: ConfidenceLevel,
    pub grid: GameGrid,
    pub focus: Focus,
    pub logos: HashMap<String, DynamicImage>,
    pub show_logos: bool,
    requested_logos: HashSet<String>,
    latest_generation: u64,
}

impl App {
    pub fn new(date_input: Option<String>, today: CalendarDate, show_logos: bool) -> Self {
        let date_input = date_input.unwrap_or_else(|| dates::to_input_string(today));
        let selected = dates::date_from_input(&date_input, today);

        let mut team_state = ListState::default();
        team_state.select(Some(0));

        Self {
            should_quit: false,
            today,
            displayed_date: dates::to_display_string(&date_input),
            date_input,
            date_edit: None,
            week: WeekView::new(selected),
            team_options: vec![TeamOption::all()],
            team_state,
            confidence: ConfidenceLevel::default(),
            grid: GameGrid::default(),
            focus: Focus::Week,
            logos: HashMap::new(),
            show_logos,
            requested_logos: HashSet::new(),
            latest_generation: 0,
        }
    }

    /// Fetch for whatever the date control currently holds.
    pub fn refresh(&mut self) -> FetchRequest {
        let input = self.date_input.clone();
        self.issue_fetch(input)
    }

    fn issue_fetch(&mut self, date_input: String) -> FetchRequest {
        self.latest_generation += 1;
        self.grid.start_loading();
        let api_date = dates::to_api_string_with_today(&date_input, self.today);
        debug!(generation = self.latest_generation, api_date = %api_date, "requesting games");
        FetchRequest {
            generation: self.latest_generation,
            date_input,
            api_date,
        }
    }

    /// The date control was changed and committed.
    pub fn commit_date_input(&mut self, value: String) -> FetchRequest {
        let DateSelected(date) = self.week.select_day(dates::date_from_input(&value, self.today));
        debug!(input = %value, selected = %date, "date input committed");
        self.displayed_date = dates::to_display_string(&value);
        self.date_input = value.clone();
        self.issue_fetch(value)
    }

    /// A week cell was chosen.
    pub fn select_day(&mut self, date: CalendarDate) -> FetchRequest {
        let DateSelected(date) = self.week.select_day(date);
        let input = dates::to_input_string(date);
        self.displayed_date = dates::to_display_string(&input);
        self.date_input = input.clone();
        self.issue_fetch(input)
    }

    /// Display date of the week on screen when it no longer holds the selected day.
    pub fn browsing_week_of(&self) -> Option<String> {
        let week = compute_week(self.week.nav_center());
        if week.contains(&self.week.selected()) {
            return None;
        }
        Some(dates::to_display_string(&dates::to_input_string(week[0])))
    }

    pub fn filter_state(&self) -> FilterState {
        let team = self
            .team_state
            .selected()
            .and_then(|i| self.team_options.get(i))
            .map(|option| option.filter)
            .unwrap_or_default();
        FilterState {
            team,
            confidence: self.confidence,
        }
    }

    pub fn apply_filters(&mut self) -> usize {
        let filters = self.filter_state();
        let visible = filter::apply_filters(&mut self.grid, &filters);
        debug!(?filters, visible, "filters applied");
        visible
    }

    pub fn on_event(&mut self, event: AppEvent) -> Vec<Command> {
        match event {
            AppEvent::TeamsLoaded(result) => {
                self.on_teams_loaded(result);
                Vec::new()
            }
            AppEvent::GamesLoaded {
                generation,
                date_input,
                result,
            } => self.on_games_loaded(generation, &date_input, result),
            AppEvent::LogoLoaded {
                abbreviation,
                image,
            } => {
                if let Some(img) = image {
                    self.logos.insert(abbreviation, img);
                }
                Vec::new()
            }
        }
    }

    fn on_teams_loaded(&mut self, result: FetchResult<Vec<Team>>) {
        // The boundary already logged the failure; the sentinel option stays usable.
        let Ok(teams) = result else { return };
        self.team_options = std::iter::once(TeamOption::all())
            .chain(teams.iter().map(TeamOption::from))
            .collect();
        if self.team_state.selected().map_or(true, |i| i >= self.team_options.len()) {
            self.team_state.select(Some(0));
        }
    }

    fn on_games_loaded(
        &mut self,
        generation: u64,
        date_input: &str,
        result: FetchResult<Vec<Game>>,
    ) -> Vec<Command> {
        if generation != self.latest_generation {
            info!(generation, latest = self.latest_generation, "discarding stale games response");
            return Vec::new();
        }

        let games = match result {
            Ok(games) => games,
            Err(e) => {
                warn!(error = %e, "showing load failure");
                self.grid.fail(LOAD_FAILED_TEXT);
                return Vec::new();
            }
        };

        self.displayed_date = dates::to_display_string(date_input);

        if games.is_empty() {
            self.grid.cards.clear();
            self.grid.no_matches = None;
            self.grid.counter = filter::counter_label(0);
            self.grid.status = GridStatus::NoGamesScheduled;
            return Vec::new();
        }

        self.grid.cards = games.iter().map(card::render).collect();
        self.grid.counter = filter::counter_label(self.grid.cards.len());
        self.grid.status = GridStatus::Loaded;
        self.apply_filters();

        self.logo_requests()
    }

    fn logo_requests(&mut self) -> Vec<Command> {
        let abbreviations: Vec<String> = self
            .grid
            .cards
            .iter()
            .flat_map(|c: &GameCard| [c.visitor.abbreviation.clone(), c.home.abbreviation.clone()])
            .filter(|abbr| !abbr.is_empty())
            .collect();

        let mut commands = Vec::new();
        for abbr in abbreviations {
            if self.requested_logos.insert(abbr.clone()) {
                commands.push(Command::FetchLogo(abbr));
            }
        }
        commands
    }

    fn next_team(&mut self) {
        let len = self.team_options.len();
        let i = match self.team_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.team_state.select(Some(i));
    }

    fn previous_team(&mut self) {
        let len = self.team_options.len();
        let i = match self.team_state.selected() {
            Some(0) | None => len.saturating_sub(1),
            Some(i) => i - 1,
        };
        self.team_state.select(Some(i));
    }

    fn on_edit_key(&mut self, code: KeyCode) -> Vec<Command> {
        let Some(buffer) = self.date_edit.as_mut() else {
            return Vec::new();
        };
        match code {
            KeyCode::Char(c) if buffer.len() < MAX_DATE_INPUT_LEN => buffer.push(c),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Esc => self.date_edit = None,
            KeyCode::Enter => {
                if let Some(value) = self.date_edit.take() {
                    return vec![Command::FetchGames(self.commit_date_input(value))];
                }
            }
            _ => {}
        }
        Vec::new()
    }

    pub fn on_key(&mut self, code: KeyCode) -> Vec<Command> {
        if self.date_edit.is_some() {
            return self.on_edit_key(code);
        }

        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('d') => self.date_edit = Some(self.date_input.clone()),
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Week => Focus::Filters,
                    Focus::Filters => Focus::Week,
                }
            }
            KeyCode::Char('[') => self.week.navigate(-7),
            KeyCode::Char(']') => self.week.navigate(7),
            KeyCode::Char('t') => return vec![Command::FetchGames(self.select_day(self.today))],
            KeyCode::Char('r') => return vec![Command::FetchGames(self.refresh())],
            KeyCode::Char('a') => {
                self.apply_filters();
            }
            KeyCode::Char('c') => self.confidence = self.confidence.next(),
            KeyCode::Char('L') => self.show_logos = !self.show_logos,
            _ => match self.focus {
                Focus::Week => match code {
                    KeyCode::Left | KeyCode::Char('h') => self.week.move_cursor(-1),
                    KeyCode::Right | KeyCode::Char('l') => self.week.move_cursor(1),
                    KeyCode::Enter => {
                        let date = self.week.cursor_date();
                        return vec![Command::FetchGames(self.select_day(date))];
                    }
                    _ => {}
                },
                Focus::Filters => match code {
                    KeyCode::Down | KeyCode::Char('j') => self.next_team(),
                    KeyCode::Up | KeyCode::Char('k') => self.previous_team(),
                    KeyCode::Enter => {
                        self.apply_filters();
                    }
                    _ => {}
                },
            },
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FetchError;
    use crate::model::{GamesResponse, TeamId};

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::from_ymd(y, m, d).unwrap()
    }

    fn fixture_games() -> Vec<Game> {
        let data: GamesResponse = serde_json::from_str(include_str!("../fixtures/games.json")).unwrap();
        data.games
    }

    fn fixture_teams() -> Vec<Team> {
        serde_json::from_str(include_str!("../fixtures/teams.json")).unwrap()
    }

    fn decode_error() -> FetchError {
        serde_json::from_str::<GamesResponse>("not json").unwrap_err().into()
    }

    fn app() -> App {
        App::new(Some("2024-01-31".to_string()), date(2024, 2, 2), true)
    }

    fn fetch_of(commands: Vec<Command>) -> FetchRequest {
        match commands.as_slice() {
            [Command::FetchGames(request)] => request.clone(),
            other => panic!("expected a single fetch, got {:?}", other),
        }
    }

    fn loaded(app: &mut App, request: &FetchRequest, result: FetchResult<Vec<Game>>) -> Vec<Command> {
        app.on_event(AppEvent::GamesLoaded {
            generation: request.generation,
            date_input: request.date_input.clone(),
            result,
        })
    }

    #[test]
    fn test_initial_state_reads_date_input() {
        let app = app();
        assert_eq!(app.week.selected(), date(2024, 1, 31));
        assert_eq!(app.displayed_date, "Jan 31, 2024");
        assert_eq!(app.grid.counter, "0 games");
    }

    #[test]
    fn test_missing_date_input_defaults_to_today() {
        let app = App::new(None, date(2024, 2, 2), true);
        assert_eq!(app.date_input, "2024-02-02");
        assert_eq!(app.week.selected(), date(2024, 2, 2));
    }

    #[test]
    fn test_successful_load_builds_cards() {
        let mut app = app();
        let request = app.refresh();
        assert_eq!(request.api_date, "01/31/2024");
        assert_eq!(app.grid.status, GridStatus::Loading);

        let commands = loaded(&mut app, &request, Ok(fixture_games()));
        assert_eq!(app.grid.status, GridStatus::Loaded);
        assert_eq!(app.grid.cards.len(), 3);
        assert_eq!(app.grid.counter, "3 games");
        assert_eq!(commands.len(), 6);
        assert!(commands.contains(&Command::FetchLogo("LAL".to_string())));
    }

    #[test]
    fn test_logos_are_requested_once() {
        let mut app = app();
        let first = app.refresh();
        loaded(&mut app, &first, Ok(fixture_games()));
        let second = app.refresh();
        assert!(loaded(&mut app, &second, Ok(fixture_games())).is_empty());
    }

    #[test]
    fn test_failed_load_clears_previous_cards() {
        let mut app = app();
        let first = app.refresh();
        loaded(&mut app, &first, Ok(fixture_games()));
        assert_eq!(app.grid.cards.len(), 3);

        let second = app.refresh();
        loaded(&mut app, &second, Err(decode_error()));
        assert!(app.grid.cards.is_empty());
        assert_eq!(app.grid.counter, "0 games");
        assert_eq!(app.grid.status, GridStatus::Failed(LOAD_FAILED_TEXT.to_string()));
        assert_eq!(app.grid.no_matches, None);
    }

    #[test]
    fn test_empty_day_shows_no_games() {
        let mut app = app();
        let request = app.refresh();
        loaded(&mut app, &request, Ok(Vec::new()));
        assert_eq!(app.grid.status, GridStatus::NoGamesScheduled);
        assert_eq!(app.grid.counter, "0 games");
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut app = app();
        let older = app.select_day(date(2024, 1, 29));
        let newer = app.select_day(date(2024, 1, 30));
        assert!(newer.generation > older.generation);

        loaded(&mut app, &newer, Ok(Vec::new()));
        assert_eq!(app.grid.status, GridStatus::NoGamesScheduled);

        loaded(&mut app, &older, Ok(fixture_games()));
        assert!(app.grid.cards.is_empty());
        assert_eq!(app.grid.status, GridStatus::NoGamesScheduled);
        assert_eq!(app.displayed_date, "Jan 30, 2024");
    }

    #[test]
    fn test_week_navigation_does_not_fetch() {
        let mut app = app();
        assert!(app.on_key(KeyCode::Char(']')).is_empty());
        assert_eq!(app.week.nav_center(), date(2024, 2, 7));
        assert!(app.on_key(KeyCode::Char('[')).is_empty());
        assert_eq!(app.week.nav_center(), date(2024, 1, 31));
        assert_eq!(app.week.selected(), date(2024, 1, 31));
        assert_eq!(app.grid.status, GridStatus::Idle);
    }

    #[test]
    fn test_browsing_hint_follows_navigation() {
        let mut app = app();
        assert_eq!(app.browsing_week_of(), None);

        app.on_key(KeyCode::Char(']'));
        assert_eq!(app.browsing_week_of().as_deref(), Some("Feb 4, 2024"));

        app.on_key(KeyCode::Char('['));
        assert_eq!(app.browsing_week_of(), None);
    }

    #[test]
    fn test_selecting_cursor_day_fetches() {
        let mut app = app();
        app.on_key(KeyCode::Char(']'));
        app.on_key(KeyCode::Left);

        let request = fetch_of(app.on_key(KeyCode::Enter));
        assert_eq!(request.date_input, "2024-02-06");
        assert_eq!(request.api_date, "02/06/2024");
        assert_eq!(app.week.selected(), date(2024, 2, 6));
        assert_eq!(app.displayed_date, "Feb 6, 2024");
    }

    #[test]
    fn test_editing_date_input() {
        let mut app = app();
        app.on_key(KeyCode::Char('d'));
        for _ in 0..10 {
            app.on_key(KeyCode::Backspace);
        }
        for c in "2023-12-25".chars() {
            assert!(app.on_key(KeyCode::Char(c)).is_empty());
        }

        let request = fetch_of(app.on_key(KeyCode::Enter));
        assert_eq!(request.api_date, "12/25/2023");
        assert_eq!(app.date_edit, None);
        assert_eq!(app.week.selected(), date(2023, 12, 25));
        assert_eq!(app.week.week()[0], date(2023, 12, 24));
    }

    #[test]
    fn test_escape_cancels_edit() {
        let mut app = app();
        app.on_key(KeyCode::Char('d'));
        app.on_key(KeyCode::Backspace);
        assert!(app.on_key(KeyCode::Esc).is_empty());
        assert_eq!(app.date_input, "2024-01-31");
        assert_eq!(app.date_edit, None);
    }

    #[test]
    fn test_malformed_date_input_falls_back_to_today() {
        let mut app = app();
        let request = app.commit_date_input("bad-input".to_string());
        assert_eq!(request.api_date, "02/02/2024");
        assert_eq!(app.week.selected(), date(2024, 2, 2));
        assert_eq!(app.displayed_date, "bad-input");
    }

    #[test]
    fn test_today_key_selects_today() {
        let mut app = app();
        let request = fetch_of(app.on_key(KeyCode::Char('t')));
        assert_eq!(request.date_input, "2024-02-02");
        assert_eq!(app.week.selected(), date(2024, 2, 2));
    }

    #[test]
    fn test_team_filter_uses_team_id() {
        let mut app = app();
        app.on_event(AppEvent::TeamsLoaded(Ok(fixture_teams())));
        assert_eq!(app.team_options.len(), 5);
        assert_eq!(app.team_options[0].filter, TeamFilter::All);

        let request = app.refresh();
        loaded(&mut app, &request, Ok(fixture_games()));

        app.on_key(KeyCode::Tab);
        app.on_key(KeyCode::Char('j'));
        assert_eq!(app.filter_state().team, TeamFilter::Team(TeamId(1610612737)));
        // Moving the selection alone does not filter.
        assert_eq!(app.grid.counter, "3 games");

        app.on_key(KeyCode::Char('a'));
        assert_eq!(app.grid.counter, "1 game");

        app.on_key(KeyCode::Char('j'));
        app.on_key(KeyCode::Char('j'));
        app.on_key(KeyCode::Enter);
        assert_eq!(app.filter_state().team, TeamFilter::Team(TeamId(1610612744)));
        assert_eq!(app.grid.counter, "1 game");
    }

    #[test]
    fn test_filter_survives_refetch() {
        let mut app = app();
        let teams = vec![Team {
            id: TeamId(1),
            abbreviation: "NOP".to_string(),
            full_name: "New Orleans Pelicans".to_string(),
            city: None,
        }];
        app.on_event(AppEvent::TeamsLoaded(Ok(teams)));
        app.focus = Focus::Filters;
        app.on_key(KeyCode::Char('j'));
        app.on_key(KeyCode::Char('a'));

        let request = app.refresh();
        loaded(&mut app, &request, Ok(fixture_games()));
        assert_eq!(app.grid.counter, "0 games");
        assert!(app.grid.no_matches.is_some());
        assert_eq!(app.grid.visible_cards().count(), 0);
    }

    #[test]
    fn test_failed_teams_keep_sentinel() {
        let mut app = app();
        app.on_event(AppEvent::TeamsLoaded(Err(decode_error())));
        assert_eq!(app.team_options, vec![TeamOption::all()]);
        assert_eq!(app.filter_state(), FilterState::default());
    }

    #[test]
    fn test_team_list_wraps() {
        let mut app = app();
        app.on_event(AppEvent::TeamsLoaded(Ok(fixture_teams())));
        app.focus = Focus::Filters;
        app.on_key(KeyCode::Up);
        assert_eq!(app.team_state.selected(), Some(4));
        app.on_key(KeyCode::Down);
        assert_eq!(app.team_state.selected(), Some(0));
    }

    #[test]
    fn test_quit_and_toggles() {
        let mut app = app();
        app.on_key(KeyCode::Char('L'));
        assert!(!app.show_logos);
        app.on_key(KeyCode::Char('c'));
        assert_eq!(app.confidence, ConfidenceLevel::High);
        app.on_key(KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
