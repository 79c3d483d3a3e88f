use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::app::{AppEvent, FetchRequest};
use crate::model::{Game, GamesResponse, Team};

/// Anything that goes wrong between sending a request and holding typed records.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Source of teams and games, implemented by the HTTP client and by test fakes.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn fetch_teams(&self) -> FetchResult<Vec<Team>>;

    /// `api_date` is already in `MM/DD/YYYY` form.
    async fn fetch_games(&self, api_date: &str) -> FetchResult<Vec<Game>>;
}

pub struct DataClient {
    client: Client,
    base_url: String,
}

impl DataClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn teams_url(&self) -> String {
        format!("{}/api/teams", self.base_url)
    }

    pub fn games_url(&self) -> String {
        format!("{}/api/games", self.base_url)
    }

    /// The body is returned whatever the status code; only transport errors fail here.
    async fn get_body(&self, request: reqwest::RequestBuilder) -> FetchResult<String> {
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            debug!(status = %status, url = %resp.url(), "non-success status, decoding body anyway");
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl ScheduleSource for DataClient {
    async fn fetch_teams(&self) -> FetchResult<Vec<Team>> {
        let body = self.get_body(self.client.get(self.teams_url())).await?;
        let teams: Vec<Team> = serde_json::from_str(&body)?;
        Ok(teams)
    }

    async fn fetch_games(&self, api_date: &str) -> FetchResult<Vec<Game>> {
        let request = self.client.get(self.games_url()).query(&[("date", api_date)]);
        let body = self.get_body(request).await?;
        let data: GamesResponse = serde_json::from_str(&body)?;
        if let Some(reason) = &data.error {
            warn!(api_date, error = %reason, "games endpoint reported an error");
        }
        Ok(data.games)
    }
}

/// Fetches teams once and reports the outcome to the UI loop.
pub async fn load_teams(source: Arc<dyn ScheduleSource>, tx: mpsc::Sender<AppEvent>) {
    let result = source.fetch_teams().await;
    match &result {
        Ok(teams) => info!(count = teams.len(), "teams loaded"),
        Err(e) => error!(error = %e, "Error fetching teams"),
    }
    let _ = tx.send(AppEvent::TeamsLoaded(result)).await;
}

/// Fetches one day of games. No retry; the generation travels with the result.
pub async fn load_games(
    source: Arc<dyn ScheduleSource>,
    request: FetchRequest,
    tx: mpsc::Sender<AppEvent>,
) {
    let result = source.fetch_games(&request.api_date).await;
    match &result {
        Ok(games) => info!(
            date = %request.api_date,
            generation = request.generation,
            count = games.len(),
            "games loaded"
        ),
        Err(e) => error!(date = %request.api_date, error = %e, "Error fetching games"),
    }
    let _ = tx
        .send(AppEvent::GamesLoaded {
            generation: request.generation,
            date_input: request.date_input,
            result,
        })
        .await;
}
