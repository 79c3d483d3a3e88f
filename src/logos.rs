use image::{DynamicImage, ImageFormat};
use reqwest::Client;
use tokio::sync::mpsc;
use tracing::debug;

use crate::app::AppEvent;

/// One place a logo can come from, with the format its body is decoded as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoSource {
    pub url: String,
    pub format: ImageFormat,
}

/// ESPN's logo paths use its own short codes for a handful of teams.
pub fn espn_code(abbreviation: &str) -> String {
    match abbreviation.to_uppercase().as_str() {
        "GSW" => "gs".to_string(),
        "NYK" => "ny".to_string(),
        "NOP" => "no".to_string(),
        "SAS" => "sa".to_string(),
        "UTA" => "utah".to_string(),
        "WAS" => "wsh".to_string(),
        other => other.to_lowercase(),
    }
}

/// Candidate sources in the order they are tried: a small resized PNG first,
/// then the full-size one.
pub fn logo_sources(abbreviation: &str) -> Vec<LogoSource> {
    let code = espn_code(abbreviation);
    vec![
        LogoSource {
            url: format!(
                "https://a.espncdn.com/combiner/i?img=/i/teamlogos/nba/500/{}.png&h=100&w=100",
                code
            ),
            format: ImageFormat::Png,
        },
        LogoSource {
            url: format!("https://a.espncdn.com/i/teamlogos/nba/500/{}.png", code),
            format: ImageFormat::Png,
        },
    ]
}

/// What to draw when no source produced an image.
pub fn fallback_label(abbreviation: &str) -> String {
    abbreviation.to_uppercase()
}

async fn fetch_image(client: &Client, source: &LogoSource) -> Option<DynamicImage> {
    let resp = client.get(&source.url).send().await.ok()?.error_for_status().ok()?;
    let bytes = resp.bytes().await.ok()?;
    image::load_from_memory_with_format(&bytes, source.format).ok()
}

/// First source whose body decodes wins.
pub async fn fetch_logo(client: &Client, abbreviation: &str) -> Option<DynamicImage> {
    for source in logo_sources(abbreviation) {
        if let Some(img) = fetch_image(client, &source).await {
            return Some(img);
        }
        debug!(abbreviation, url = %source.url, "logo source unavailable");
    }
    None
}

pub async fn load_logo(client: Client, abbreviation: String, tx: mpsc::Sender<AppEvent>) {
    let image = fetch_logo(&client, &abbreviation).await;
    let _ = tx.send(AppEvent::LogoLoaded { abbreviation, image }).await;
}
