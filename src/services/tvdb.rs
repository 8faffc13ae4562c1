//! TheTVDB v4 API client
//!
//! Base URL: https://api4.thetvdb.com/v4
//!
//! Authentication is a single `POST /login` with the project API key (and the
//! subscriber PIN for user-supported keys) returning a bearer token, fetched
//! lazily on the first request and reused for the rest of the run.
//!
//! Episodes are read from the `default` season type, which is TheTVDB's aired
//! order. Results are paginated; pages are followed until `links.next` is null.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::metadata::{EpisodeCandidate, MetadataProvider, SeriesCandidate, sort_aired_order};
use super::rate_limiter::RateLimitedClient;
use crate::config::TvdbCredentials;

/// Season type holding the aired order
const AIRED_ORDER_SEASON_TYPE: &str = "default";

/// Guard against a server that never stops returning `links.next`
const MAX_EPISODE_PAGES: u32 = 50;

/// TheTVDB API client
pub struct TvdbClient {
    client: RateLimitedClient,
    base_url: String,
    credentials: TvdbCredentials,
    token: OnceCell<String>,
}

/// Envelope around every v4 response
#[derive(Debug, Clone, Deserialize)]
pub struct TvdbResponse<T> {
    pub status: Option<String>,
    pub data: T,
    pub links: Option<TvdbLinks>,
}

impl<T> TvdbResponse<T> {
    /// Whether `links.next` points at another page
    pub fn has_next_page(&self) -> bool {
        self.links.as_ref().is_some_and(|links| links.next.is_some())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TvdbLinks {
    pub next: Option<String>,
    pub total_items: Option<u32>,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    apikey: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pin: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TvdbToken {
    pub token: String,
}

/// Series hit from `/search`
#[derive(Debug, Clone, Deserialize)]
pub struct TvdbSearchResult {
    pub tvdb_id: String,
    pub name: String,
    pub year: Option<String>,
    #[serde(rename = "type")]
    pub result_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TvdbSeriesEpisodes {
    pub episodes: Vec<TvdbEpisode>,
}

/// Episode record in a season-type listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TvdbEpisode {
    pub id: u64,
    pub name: Option<String>,
    pub season_number: u32,
    pub number: u32,
    pub aired: Option<String>,
}

impl TvdbClient {
    pub fn new(credentials: TvdbCredentials) -> Result<Self> {
        Self::with_base_url(credentials, "https://api4.thetvdb.com/v4")
    }

    pub fn with_base_url(credentials: TvdbCredentials, base_url: &str) -> Result<Self> {
        Ok(Self {
            client: RateLimitedClient::for_tvdb()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            token: OnceCell::new(),
        })
    }

    async fn token(&self) -> Result<&str> {
        let token = self
            .token
            .get_or_try_init(|| async {
                info!("Logging in to TheTVDB");
                let url = format!("{}/login", self.base_url);
                let body = LoginRequest {
                    apikey: &self.credentials.api_key,
                    pin: self.credentials.pin.as_deref(),
                };
                let response: TvdbResponse<TvdbToken> = self
                    .client
                    .post_json(&url, &body)
                    .await
                    .context("TheTVDB login failed")?;
                Ok::<_, anyhow::Error>(response.data.token)
            })
            .await?;
        Ok(token.as_str())
    }

    /// Search for series by name
    pub async fn search(&self, query: &str) -> Result<Vec<TvdbSearchResult>> {
        info!(query = %query, "Searching TheTVDB for series");

        let token = self.token().await?;
        let url = format!("{}/search", self.base_url);
        let response: TvdbResponse<Vec<TvdbSearchResult>> = self
            .client
            .get_json(&url, &[("query", query), ("type", "series")], Some(token))
            .await?;

        debug!(count = response.data.len(), "TheTVDB search returned results");
        Ok(response.data)
    }

    /// Fetch every aired-order episode of a series, following pagination
    pub async fn series_episodes(&self, series_id: &str) -> Result<Vec<TvdbEpisode>> {
        info!(series_id = %series_id, "Fetching episodes from TheTVDB");

        let token = self.token().await?;
        let url = format!(
            "{}/series/{}/episodes/{}",
            self.base_url, series_id, AIRED_ORDER_SEASON_TYPE
        );

        let mut episodes = Vec::new();
        let mut exhausted = false;
        for page in 0..MAX_EPISODE_PAGES {
            let page_param = page.to_string();
            let response: TvdbResponse<TvdbSeriesEpisodes> = self
                .client
                .get_json(&url, &[("page", page_param.as_str())], Some(token))
                .await?;

            let has_next = response.has_next_page();
            episodes.extend(response.data.episodes);
            if !has_next {
                exhausted = true;
                break;
            }
        }

        if !exhausted {
            warn!(
                series_id = %series_id,
                pages = MAX_EPISODE_PAGES,
                count = episodes.len(),
                "TheTVDB still reports more episode pages, list truncated"
            );
        }

        debug!(count = episodes.len(), "TheTVDB returned episodes");
        Ok(episodes)
    }
}

impl TvdbSearchResult {
    pub fn year(&self) -> Option<i32> {
        self.year.as_deref().and_then(|y| y.parse().ok())
    }
}

impl TvdbEpisode {
    pub fn to_candidate(&self) -> EpisodeCandidate {
        let name = self
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| EpisodeCandidate::fallback_name(self.number));
        EpisodeCandidate::new(self.season_number, self.number, name)
    }
}

#[async_trait]
impl MetadataProvider for TvdbClient {
    fn name(&self) -> &str {
        "tvdb"
    }

    async fn search_series(&self, name: &str) -> Result<Vec<SeriesCandidate>> {
        let results = self.search(name).await?;
        Ok(results
            .into_iter()
            .filter(|r| r.result_type.as_deref().is_none_or(|t| t == "series"))
            .map(|r| SeriesCandidate {
                year: r.year(),
                id: r.tvdb_id,
                name: r.name,
            })
            .collect())
    }

    async fn get_episodes(&self, series_id: &str) -> Result<Vec<EpisodeCandidate>> {
        let episodes = self.series_episodes(series_id).await?;
        Ok(sort_aired_order(
            episodes.iter().map(TvdbEpisode::to_candidate).collect(),
        ))
    }
}
