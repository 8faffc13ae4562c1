//! TVMaze API client for TV show metadata
//!
//! TVMaze is a free API that doesn't require authentication.
//! Base URL: https://api.tvmaze.com
//!
//! The `/shows/{id}/episodes` endpoint already returns the aired order without
//! specials, which is the ordering the resolvers expect.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::metadata::{EpisodeCandidate, MetadataProvider, SeriesCandidate, sort_aired_order};
use super::rate_limiter::RateLimitedClient;

/// TVMaze API client
pub struct TvMazeClient {
    client: RateLimitedClient,
    base_url: String,
}

/// Show search result from TVMaze
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvMazeSearchResult {
    pub score: f64,
    pub show: TvMazeShow,
}

/// Show details from TVMaze
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvMazeShow {
    pub id: u32,
    pub name: String,
    pub premiered: Option<String>,
    pub status: Option<String>,
}

/// Episode from TVMaze
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvMazeEpisode {
    pub id: u32,
    pub name: Option<String>,
    pub season: u32,
    pub number: Option<u32>,
    #[serde(rename = "type")]
    pub episode_type: Option<String>,
}

impl TvMazeClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url("https://api.tvmaze.com")
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: RateLimitedClient::for_tvmaze()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search for shows by name
    pub async fn search_shows(&self, query: &str) -> Result<Vec<TvMazeSearchResult>> {
        info!(query = %query, "Searching TVMaze for shows");

        let url = format!("{}/search/shows", self.base_url);
        let results: Vec<TvMazeSearchResult> =
            self.client.get_json(&url, &[("q", query)], None).await?;

        debug!(count = results.len(), "TVMaze search returned results");
        Ok(results)
    }

    /// Get all regular episodes for a show
    pub async fn get_show_episodes(&self, tvmaze_id: &str) -> Result<Vec<TvMazeEpisode>> {
        info!(tvmaze_id = %tvmaze_id, "Fetching episodes from TVMaze");

        let url = format!("{}/shows/{}/episodes", self.base_url, tvmaze_id);
        let episodes: Vec<TvMazeEpisode> = self.client.get_json(&url, &(), None).await?;

        debug!(count = episodes.len(), "TVMaze returned episodes");
        Ok(episodes)
    }
}

impl TvMazeShow {
    /// Get the premiere year from the premiered date
    pub fn premiere_year(&self) -> Option<i32> {
        self.premiered
            .as_ref()
            .and_then(|p| p.split('-').next().and_then(|y| y.parse().ok()))
    }
}

impl TvMazeEpisode {
    /// Convert to a candidate, skipping entries without an episode number
    pub fn to_candidate(&self) -> Option<EpisodeCandidate> {
        let number = self.number?;
        let name = self
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| EpisodeCandidate::fallback_name(number));
        Some(EpisodeCandidate::new(self.season, number, name))
    }
}

#[async_trait]
impl MetadataProvider for TvMazeClient {
    fn name(&self) -> &str {
        "tvmaze"
    }

    async fn search_series(&self, name: &str) -> Result<Vec<SeriesCandidate>> {
        let results = self.search_shows(name).await?;
        Ok(results
            .into_iter()
            .map(|r| SeriesCandidate {
                id: r.show.id.to_string(),
                year: r.show.premiere_year(),
                name: r.show.name,
            })
            .collect())
    }

    async fn get_episodes(&self, series_id: &str) -> Result<Vec<EpisodeCandidate>> {
        let episodes = self.get_show_episodes(series_id).await?;
        Ok(sort_aired_order(
            episodes
                .iter()
                .filter(|e| e.episode_type.as_deref().is_none_or(|t| t == "regular"))
                .filter_map(TvMazeEpisode::to_candidate)
                .collect(),
        ))
    }
}
