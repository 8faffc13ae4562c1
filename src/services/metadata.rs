//! Metadata provider abstraction
//!
//! Resolvers only see [MetadataProvider]. Concrete clients (TheTVDB, TVMaze)
//! are responsible for returning episodes in aired order, already sorted by
//! season and episode number.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ranker::Candidate;
use super::tvdb::TvdbClient;
use super::tvmaze::TvMazeClient;
use crate::config::{MetadataConfig, ProviderKind};

/// A series returned by a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesCandidate {
    /// Provider-specific identifier, opaque to the resolvers
    pub id: String,
    pub name: String,
    pub year: Option<i32>,
}

impl Candidate for SeriesCandidate {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for SeriesCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({}) [id {}]", self.name, year, self.id),
            None => write!(f, "{} [id {}]", self.name, self.id),
        }
    }
}

/// One episode of a series in aired order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeCandidate {
    pub season: u32,
    pub number: u32,
    pub name: String,
}

impl EpisodeCandidate {
    pub fn new(season: u32, number: u32, name: impl Into<String>) -> Self {
        Self {
            season,
            number,
            name: name.into(),
        }
    }

    /// `S{season:02}E{episode:02}`
    pub fn episode_id(&self) -> String {
        format!("S{:02}E{:02}", self.season, self.number)
    }

    /// Title to use when the provider has none
    pub fn fallback_name(number: u32) -> String {
        format!("Episode {}", number)
    }
}

impl Candidate for EpisodeCandidate {
    fn id(&self) -> String {
        self.episode_id()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Remote source of series and episode metadata.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Search series by (directory) name.
    async fn search_series(&self, name: &str) -> Result<Vec<SeriesCandidate>>;

    /// Episodes of `series_id` in aired order, sorted by season then episode.
    async fn get_episodes(&self, series_id: &str) -> Result<Vec<EpisodeCandidate>>;
}

/// Sort episodes by season then episode number and drop duplicate slots.
pub fn sort_aired_order(mut episodes: Vec<EpisodeCandidate>) -> Vec<EpisodeCandidate> {
    episodes.sort_by_key(|e| (e.season, e.number));
    episodes.dedup_by_key(|e| (e.season, e.number));
    episodes
}

/// Build the provider selected in `config`.
pub fn create_metadata_provider(config: &MetadataConfig) -> Result<Arc<dyn MetadataProvider>> {
    let provider: Arc<dyn MetadataProvider> = match config.provider {
        ProviderKind::Tvdb => Arc::new(TvdbClient::new(config.tvdb_credentials()?)?),
        ProviderKind::TvMaze => Arc::new(TvMazeClient::new()?),
    };
    info!(provider = provider.name(), "Metadata provider initialized");
    Ok(provider)
}
