//! Candidate ranking
//!
//! Scores a free-form query against an ordered list of candidates (episodes
//! of a series, or series returned by a search) and returns them best first.
//! Candidate histograms are built once per [CandidateRanker] so a series'
//! episode list can be queried once per local file without re-tokenizing.

use std::cmp::Ordering;

use super::text_utils::{Histogram, histogram_similarity};

/// Anything that can be ranked by its display name.
pub trait Candidate {
    /// Opaque identifier shown to the operator (e.g. `S01E03`).
    fn id(&self) -> String;

    /// Display name the query is compared against.
    fn name(&self) -> &str;
}

/// A candidate with its score against a query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a, C> {
    pub candidate: &'a C,
    /// Position of the candidate in the caller's original ordering
    pub rank: usize,
    /// Similarity in `[0, 1]`
    pub score: f64,
}

impl<C> ScoredCandidate<'_, C> {
    pub fn is_exact(&self) -> bool {
        self.score == 1.0
    }
}

/// Ranks queries against a fixed candidate set.
pub struct CandidateRanker<'a, C> {
    candidates: &'a [C],
    histograms: Vec<Histogram>,
}

impl<'a, C: Candidate> CandidateRanker<'a, C> {
    pub fn new(candidates: &'a [C]) -> Self {
        let histograms = candidates
            .iter()
            .map(|c| Histogram::from_text(c.name()))
            .collect();
        Self {
            candidates,
            histograms,
        }
    }

    /// Score every candidate against `query`, highest score first.
    ///
    /// Ties keep the caller's original order (the sort is stable and falls
    /// back to the original index).
    pub fn rank(&self, query: &str) -> Vec<ScoredCandidate<'a, C>> {
        let query = Histogram::from_text(query);

        let mut scored: Vec<ScoredCandidate<'a, C>> = self
            .candidates
            .iter()
            .zip(&self.histograms)
            .enumerate()
            .map(|(rank, (candidate, histogram))| ScoredCandidate {
                candidate,
                rank,
                score: histogram_similarity(&query, histogram),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.rank.cmp(&b.rank))
        });
        scored
    }
}
