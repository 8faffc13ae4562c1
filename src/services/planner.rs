//! Plan generation
//!
//! Walks the source root, one directory per series:
//! 1. Resolve the directory name to a series (skip the directory on failure)
//! 2. Fetch the series' episodes once
//! 3. Discover the episode files (season folders win over loose files)
//! 4. Resolve each file to a mapping or a reject
//!
//! Provider failures and a matched series without episodes abort the run.
//! [PlannerService::plan_into] keeps whatever was confirmed before the abort.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::episode_resolver::{EpisodeOutcome, EpisodeResolver};
use super::file_utils::is_hidden_file;
use super::filesystem::{Filesystem, discover_episode_files};
use super::metadata::MetadataProvider;
use super::plan_store::{Mapping, Reject};
use super::prompt::Prompter;
use super::resolution::Resolution;
use super::series_resolver::SeriesResolver;
use crate::config::PlannerConfig;

/// Why a series directory produced no mappings at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The provider returned no series for the directory name
    NotFound,
    /// The operator chose "none of the above"
    Rejected,
    /// The directory name is not valid UTF-8 and cannot be searched
    InvalidName,
}

/// A directory left out of the plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSeries {
    pub directory: PathBuf,
    pub reason: SkipReason,
}

/// Result of a planning run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub mappings: Vec<Mapping>,
    pub rejects: Vec<Reject>,
    pub skipped: Vec<SkippedSeries>,
    /// Mappings confirmed without operator input
    pub auto_confirmed: usize,
}

impl Plan {
    pub fn summary(&self) -> String {
        format!(
            "{} mapped ({} automatically), {} rejected, {} series skipped",
            self.mappings.len(),
            self.auto_confirmed,
            self.rejects.len(),
            self.skipped.len()
        )
    }
}

/// Orchestrates resolution across the whole source root
pub struct PlannerService<'a> {
    config: &'a PlannerConfig,
    provider: &'a dyn MetadataProvider,
    fs: &'a dyn Filesystem,
}

impl<'a> PlannerService<'a> {
    pub fn new(
        config: &'a PlannerConfig,
        provider: &'a dyn MetadataProvider,
        fs: &'a dyn Filesystem,
    ) -> Self {
        Self {
            config,
            provider,
            fs,
        }
    }

    /// Build the plan for every series directory under the source root.
    pub async fn plan(&self, prompter: &mut dyn Prompter) -> Result<Plan> {
        let mut plan = Plan::default();
        self.plan_into(prompter, &mut plan).await?;
        Ok(plan)
    }

    /// Like [plan](Self::plan), but accumulates into `plan` so the caller
    /// still holds every mapping confirmed before an error.
    pub async fn plan_into(&self, prompter: &mut dyn Prompter, plan: &mut Plan) -> Result<()> {
        self.config.validate()?;
        let root = &self.config.source_root;
        info!(source = %root.display(), dest = %self.config.dest_root.display(), "Planning");

        let mut destinations: HashSet<PathBuf> =
            plan.mappings.iter().map(|m| m.dest.clone()).collect();
        for name in self.fs.list_directory(root).await? {
            let directory = root.join(&name);
            if is_hidden_file(&name.to_string_lossy()) || !self.fs.is_directory(&directory).await {
                continue;
            }
            let Some(dir_name) = name.to_str() else {
                warn!(directory = %directory.display(), "Skipping directory, name is not valid UTF-8");
                plan.skipped.push(SkippedSeries {
                    directory,
                    reason: SkipReason::InvalidName,
                });
                continue;
            };
            self.plan_series(dir_name, &directory, prompter, plan, &mut destinations)
                .await
                .with_context(|| format!("Planning failed for series directory '{}'", dir_name))?;
        }

        info!(summary = %plan.summary(), "Planning complete");
        Ok(())
    }

    async fn plan_series(
        &self,
        dir_name: &str,
        directory: &Path,
        prompter: &mut dyn Prompter,
        plan: &mut Plan,
        destinations: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        let series_resolver = SeriesResolver::new(self.provider, self.config.series_prompt_cap);
        let series = match series_resolver.resolve(dir_name, prompter).await? {
            Resolution::AutoConfirmed(series) | Resolution::Confirmed(series) => series,
            Resolution::NotFound => {
                warn!(directory = %directory.display(), "Skipping directory, no series found");
                plan.skipped.push(SkippedSeries {
                    directory: directory.to_path_buf(),
                    reason: SkipReason::NotFound,
                });
                return Ok(());
            }
            Resolution::Rejected => {
                warn!(directory = %directory.display(), "Skipping directory, series rejected");
                plan.skipped.push(SkippedSeries {
                    directory: directory.to_path_buf(),
                    reason: SkipReason::Rejected,
                });
                return Ok(());
            }
        };

        let episodes = self
            .provider
            .get_episodes(&series.id)
            .await
            .with_context(|| format!("Fetching episodes for '{}' failed", series.name))?;
        info!(series = %series.name, count = episodes.len(), "Episodes loaded");

        let resolver = EpisodeResolver::new(
            &series,
            &episodes,
            &self.config.dest_root,
            self.config.episode_prompt_cap,
        )?;

        let files = discover_episode_files(self.fs, directory, self.config.video_only).await?;
        info!(series = %series.name, files = files.len(), "Matching files");

        for file in files {
            // Plan records are JSON strings
            if file.to_str().is_none() {
                warn!(file = %file.display(), "Rejecting file, path is not valid UTF-8");
                plan.rejects.push(Reject { src: file });
                continue;
            }

            match resolver.resolve(&file, prompter)? {
                EpisodeOutcome::Mapped(resolution) => {
                    let automatic = matches!(resolution, Resolution::AutoConfirmed(_));
                    let Some(mapping) = resolution.into_value() else {
                        continue;
                    };
                    if !destinations.insert(mapping.dest.clone()) {
                        warn!(
                            file = %mapping.src.display(),
                            dest = %mapping.dest.display(),
                            "Episode already planned from another file, rejecting"
                        );
                        plan.rejects.push(Reject { src: mapping.src });
                        continue;
                    }
                    if automatic {
                        plan.auto_confirmed += 1;
                    }
                    plan.mappings.push(mapping);
                }
                EpisodeOutcome::Rejected(reject) => plan.rejects.push(reject),
            }
        }
        Ok(())
    }
}
