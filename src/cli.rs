//! Command-line interface
//!
//! `plan` resolves a source tree into a JSON Lines plan; `execute` copies the
//! files a plan describes. Paths have no defaults and must be given either as
//! flags or through the matching environment variables.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{DEFAULT_EPISODE_PROMPT_CAP, ExecutorConfig, PlannerConfig, ProviderKind};

#[derive(Parser, Debug)]
#[command(name = "tv-transformer")]
#[command(about = "Rename TV episode files into a canonical library layout")]
#[command(version)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Match files against metadata and write a plan
    Plan(PlanArgs),
    /// Copy files according to a plan
    Execute(ExecuteArgs),
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Directory holding one sub-directory per series
    #[arg(long, env = "TV_SOURCE_ROOT")]
    pub source_root: PathBuf,

    /// Root of the canonical library
    #[arg(long, env = "TV_DEST_ROOT")]
    pub dest_root: PathBuf,

    /// Plan file to write (JSON Lines)
    #[arg(long, env = "TV_PLAN_FILE")]
    pub plan_file: PathBuf,

    /// Metadata provider: tvdb or tvmaze
    #[arg(long, env = "TV_METADATA_PROVIDER", default_value = "tvdb", value_parser = parse_provider)]
    pub provider: ProviderKind,

    /// Ranked episodes offered when a file has no exact match
    #[arg(long, default_value_t = DEFAULT_EPISODE_PROMPT_CAP)]
    pub episode_choices: usize,

    /// Series offered when a search is ambiguous (all when omitted)
    #[arg(long)]
    pub series_choices: Option<usize>,

    /// Only consider files with a known video extension
    #[arg(long)]
    pub video_only: bool,
}

#[derive(Args, Debug)]
pub struct ExecuteArgs {
    /// Plan file produced by `plan`
    #[arg(long, env = "TV_PLAN_FILE")]
    pub plan_file: PathBuf,

    /// Number of leading records to skip (already processed)
    #[arg(long, default_value_t = 0)]
    pub skip: usize,

    /// Report what would be copied without copying
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_provider(value: &str) -> Result<ProviderKind, String> {
    ProviderKind::from_arg(value).ok_or_else(|| format!("unknown provider '{}'", value))
}

impl PlanArgs {
    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            source_root: self.source_root.clone(),
            dest_root: self.dest_root.clone(),
            episode_prompt_cap: self.episode_choices,
            series_prompt_cap: self.series_choices,
            video_only: self.video_only,
        }
    }
}

impl ExecuteArgs {
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            plan_path: self.plan_file.clone(),
            skip: self.skip,
            dry_run: self.dry_run,
        }
    }
}
