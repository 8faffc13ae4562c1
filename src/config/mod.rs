//! Application configuration management
//!
//! Provider credentials come from the environment (optionally a `.env` file).
//! Filesystem roots and the plan path are required CLI arguments and have no
//! built-in defaults.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Default number of ranked episodes shown when a file is ambiguous
pub const DEFAULT_EPISODE_PROMPT_CAP: usize = 10;

/// Which remote database to query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Tvdb,
    TvMaze,
}

impl ProviderKind {
    pub fn from_arg(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "tvdb" | "thetvdb" => Some(ProviderKind::Tvdb),
            "tvmaze" => Some(ProviderKind::TvMaze),
            _ => None,
        }
    }
}

/// TheTVDB v4 credentials
#[derive(Clone)]
pub struct TvdbCredentials {
    pub api_key: String,
    /// Subscriber PIN, only needed for user-supported keys
    pub pin: Option<String>,
}

impl std::fmt::Debug for TvdbCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TvdbCredentials")
            .field("api_key", &"...")
            .field("pin", &self.pin.as_ref().map(|_| "..."))
            .finish()
    }
}

/// Metadata provider configuration
#[derive(Debug, Clone)]
pub struct MetadataConfig {
    pub provider: ProviderKind,
    /// TheTVDB API key
    pub tvdb_api_key: Option<String>,
    /// TheTVDB subscriber PIN
    pub tvdb_pin: Option<String>,
}

impl MetadataConfig {
    /// Load provider settings from environment variables
    pub fn from_env(provider: ProviderKind) -> Self {
        Self {
            provider,
            tvdb_api_key: env::var("TVDB_API_KEY").ok().filter(|v| !v.is_empty()),
            tvdb_pin: env::var("TVDB_PIN").ok().filter(|v| !v.is_empty()),
        }
    }

    pub fn tvdb_credentials(&self) -> Result<TvdbCredentials> {
        let api_key = self
            .tvdb_api_key
            .clone()
            .context("TVDB_API_KEY is required for the tvdb provider")?;
        Ok(TvdbCredentials {
            api_key,
            pin: self.tvdb_pin.clone(),
        })
    }
}

/// Settings for the planning phase
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Directory holding one sub-directory per series
    pub source_root: PathBuf,
    /// Root of the canonical library
    pub dest_root: PathBuf,
    /// Ranked episodes offered when a file has no exact match
    pub episode_prompt_cap: usize,
    /// Series offered when a search is ambiguous; `None` shows them all
    pub series_prompt_cap: Option<usize>,
    /// Only consider files with a known video extension
    pub video_only: bool,
}

impl PlannerConfig {
    pub fn new(source_root: impl Into<PathBuf>, dest_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            dest_root: dest_root.into(),
            episode_prompt_cap: DEFAULT_EPISODE_PROMPT_CAP,
            series_prompt_cap: None,
            video_only: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.episode_prompt_cap == 0 {
            bail!("Episode prompt cap must be at least 1");
        }
        if self.series_prompt_cap == Some(0) {
            bail!("Series prompt cap must be at least 1");
        }
        if self.source_root == self.dest_root {
            bail!(
                "Source and destination roots must differ ({})",
                self.source_root.display()
            );
        }
        // Plan records are JSON strings
        for root in [&self.source_root, &self.dest_root] {
            if root.to_str().is_none() {
                bail!("Root path {} is not valid UTF-8", root.display());
            }
        }
        Ok(())
    }
}

/// Settings for the execution phase
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// JSON Lines plan produced by the planner
    pub plan_path: PathBuf,
    /// Number of leading records already processed by an earlier run
    pub skip: usize,
    /// Log what would be copied without touching the filesystem
    pub dry_run: bool,
}
