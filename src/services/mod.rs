//! Matching engine, metadata clients and the planning/execution services

pub mod episode_resolver;
pub mod executor;
pub mod file_utils;
pub mod filesystem;
pub mod logging;
pub mod metadata;
pub mod plan_store;
pub mod planner;
pub mod prompt;
pub mod ranker;
pub mod rate_limiter;
pub mod resolution;
pub mod series_resolver;
pub mod text_utils;
pub mod tvdb;
pub mod tvmaze;

pub use episode_resolver::{EpisodeOutcome, EpisodeResolver, destination_path};
pub use executor::{ExecutionReport, ExecutorService};
pub use filesystem::{Filesystem, LocalFilesystem, discover_episode_files};
pub use logging::{LogFormat, init_tracing};
pub use metadata::{
    EpisodeCandidate, MetadataProvider, SeriesCandidate, create_metadata_provider,
};
pub use plan_store::{Mapping, Reject, partial_plan_path, read_plan, write_plan};
pub use planner::{Plan, PlannerService, SkipReason, SkippedSeries};
pub use prompt::{ConsolePrompter, Prompter};
pub use ranker::{Candidate, CandidateRanker, ScoredCandidate};
pub use resolution::Resolution;
pub use series_resolver::SeriesResolver;
pub use text_utils::{Histogram, canonicalize_text, histogram_similarity};
pub use tvdb::TvdbClient;
pub use tvmaze::TvMazeClient;
