//! Error types for the resolvers
//!
//! Most failures travel as `anyhow::Error` with context. [ResolveError] covers
//! the cases callers need to tell apart.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// A matched series has no episodes to match files against
    #[error("Series '{series}' (id {series_id}) has no known episodes")]
    NoEpisodes { series: String, series_id: String },
}

pub type ResolveResult<T> = Result<T, ResolveError>;
