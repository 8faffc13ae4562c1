//! Shared text normalization and comparison utilities
//!
//! Titles are compared as bags of words: each string is canonicalized into a
//! term-frequency [Histogram] and two histograms are scored by
//! intersection-over-union of their counts.

use std::collections::HashMap;

/// Canonicalize a title into its space-separated token form.
///
/// Lowercases, replaces everything outside `[a-z0-9]` with a space and
/// collapses whitespace runs. Applying it twice yields the same string.
///
/// # Example
/// ```
/// use tv_transformer::services::text_utils::canonicalize_text;
/// assert_eq!(canonicalize_text("Olive-Oil_final cut"), "olive oil final cut");
/// ```
pub fn canonicalize_text(text: &str) -> String {
    tokens(text).join(" ")
}

fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Term-frequency histogram of a canonicalized string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histogram {
    counts: HashMap<String, u32>,
}

impl Histogram {
    /// Build the histogram for `text`. The empty string yields an empty histogram.
    pub fn from_text(text: &str) -> Self {
        let mut counts = HashMap::new();
        for token in tokens(text) {
            *counts.entry(token).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Occurrences of `term`, zero if absent
    pub fn count(&self, term: &str) -> u32 {
        self.counts.get(term).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct terms
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(term, count)| (term.as_str(), *count))
    }
}

/// Intersection-over-union similarity between two histograms (0.0 to 1.0).
///
/// Every term present in either side contributes `min` of the two counts to
/// the intersection and `max` to the union. When both histograms are empty the
/// union is zero and the score is defined as 0.0 so that empty titles rank last.
pub fn histogram_similarity(a: &Histogram, b: &Histogram) -> f64 {
    let mut intersection: u64 = 0;
    let mut union: u64 = 0;

    for (term, count_a) in a.terms() {
        let count_b = b.count(term);
        intersection += u64::from(count_a.min(count_b));
        union += u64::from(count_a.max(count_b));
    }

    // Terms only in `b` add to the union alone
    for (term, count_b) in b.terms() {
        if a.count(term) == 0 {
            union += u64::from(count_b);
        }
    }

    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}
