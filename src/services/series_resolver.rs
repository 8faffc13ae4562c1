//! Series resolution
//!
//! Maps a local directory name to one series from the metadata provider.
//! An empty search is reported as [Resolution::NotFound] so the caller can
//! skip the directory; a single hit is taken as is; several hits go to the
//! operator, ordered by similarity to the directory name.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::metadata::{MetadataProvider, SeriesCandidate};
use super::prompt::Prompter;
use super::ranker::CandidateRanker;
use super::resolution::{Resolution, await_selection};

pub struct SeriesResolver<'a> {
    provider: &'a dyn MetadataProvider,
    /// Maximum number of series offered to the operator; `None` offers all
    prompt_cap: Option<usize>,
}

impl<'a> SeriesResolver<'a> {
    pub fn new(provider: &'a dyn MetadataProvider, prompt_cap: Option<usize>) -> Self {
        Self {
            provider,
            prompt_cap,
        }
    }

    /// Resolve `dir_name` to a series.
    ///
    /// Provider failures are returned as errors; they are not retried.
    pub async fn resolve(
        &self,
        dir_name: &str,
        prompter: &mut dyn Prompter,
    ) -> Result<Resolution<SeriesCandidate>> {
        let candidates = self
            .provider
            .search_series(dir_name)
            .await
            .with_context(|| format!("Series search for '{}' failed", dir_name))?;

        debug!(
            directory = %dir_name,
            provider = self.provider.name(),
            count = candidates.len(),
            "Series search complete"
        );

        match candidates.len() {
            0 => {
                warn!(directory = %dir_name, "No series found");
                Ok(Resolution::NotFound)
            }
            1 => {
                let series = candidates.into_iter().next().context("Empty candidate list")?;
                info!(directory = %dir_name, series = %series.name, id = %series.id, "Series matched");
                Ok(Resolution::AutoConfirmed(series))
            }
            _ => self.ask(dir_name, &candidates, prompter),
        }
    }

    fn ask(
        &self,
        dir_name: &str,
        candidates: &[SeriesCandidate],
        prompter: &mut dyn Prompter,
    ) -> Result<Resolution<SeriesCandidate>> {
        let ranked = CandidateRanker::new(candidates).rank(dir_name);
        let cap = self.prompt_cap.unwrap_or(ranked.len());
        let choices: Vec<&SeriesCandidate> =
            ranked.iter().take(cap).map(|s| s.candidate).collect();

        let prompt = format!(
            "{} series match directory '{}', which one is it?",
            candidates.len(),
            dir_name
        );
        let resolution = await_selection(prompter, &prompt, &choices, |c| c.to_string())?
            .map(|series| series.clone());

        match &resolution {
            Resolution::Confirmed(series) => {
                info!(directory = %dir_name, series = %series.name, id = %series.id, "Series selected")
            }
            _ => warn!(directory = %dir_name, "Series rejected by operator"),
        }
        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::metadata::EpisodeCandidate;
    use assert_matches::assert_matches;
    use async_trait::async_trait;

    struct StaticProvider(Vec<SeriesCandidate>);

    #[async_trait]
    impl MetadataProvider for StaticProvider {
        fn name(&self) -> &str {
            "static"
        }

        async fn search_series(&self, _name: &str) -> Result<Vec<SeriesCandidate>> {
            Ok(self.0.clone())
        }

        async fn get_episodes(&self, _series_id: &str) -> Result<Vec<EpisodeCandidate>> {
            Ok(Vec::new())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl MetadataProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn search_series(&self, _name: &str) -> Result<Vec<SeriesCandidate>> {
            anyhow::bail!("connection refused")
        }

        async fn get_episodes(&self, _series_id: &str) -> Result<Vec<EpisodeCandidate>> {
            anyhow::bail!("connection refused")
        }
    }

    /// Records every prompt and answers from a script
    struct Scripted {
        answers: Vec<Option<usize>>,
        seen: Vec<Vec<String>>,
    }

    impl Prompter for Scripted {
        fn select(&mut self, _prompt: &str, options: &[String]) -> Result<Option<usize>> {
            self.seen.push(options.to_vec());
            Ok(self.answers.remove(0))
        }
    }

    fn series(id: &str, name: &str) -> SeriesCandidate {
        SeriesCandidate {
            id: id.to_string(),
            name: name.to_string(),
            year: None,
        }
    }

    fn scripted(answers: Vec<Option<usize>>) -> Scripted {
        Scripted {
            answers,
            seen: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_no_candidates_is_not_found() {
        let provider = StaticProvider(Vec::new());
        let mut prompter = scripted(Vec::new());
        let resolution = SeriesResolver::new(&provider, None)
            .resolve("Foodography", &mut prompter)
            .await
            .unwrap();
        assert_eq!(resolution, Resolution::NotFound);
        assert!(prompter.seen.is_empty());
    }

    #[tokio::test]
    async fn test_single_candidate_auto_confirms() {
        let provider = StaticProvider(vec![series("1", "Foodography")]);
        let mut prompter = scripted(Vec::new());
        let resolution = SeriesResolver::new(&provider, None)
            .resolve("Foodography", &mut prompter)
            .await
            .unwrap();
        assert_eq!(resolution, Resolution::AutoConfirmed(series("1", "Foodography")));
        assert!(prompter.seen.is_empty());
    }

    #[tokio::test]
    async fn test_multiple_candidates_prompt_ranked() {
        let provider = StaticProvider(vec![
            series("10", "30 Minute Meals with Jamie Oliver"),
            series("11", "30 Minute Meals"),
        ]);
        let mut prompter = scripted(vec![Some(0)]);
        let resolution = SeriesResolver::new(&provider, None)
            .resolve("30 Minute Meals", &mut prompter)
            .await
            .unwrap();

        // The exact title is ranked first and offered as option 1
        assert_eq!(resolution, Resolution::Confirmed(series("11", "30 Minute Meals")));
        assert_eq!(prompter.seen.len(), 1);
        assert_eq!(prompter.seen[0].len(), 2);
        assert!(prompter.seen[0][0].starts_with("30 Minute Meals [id 11]"));
    }

    #[tokio::test]
    async fn test_none_of_the_above_rejects() {
        let provider = StaticProvider(vec![series("1", "A"), series("2", "B")]);
        let mut prompter = scripted(vec![None]);
        let resolution = SeriesResolver::new(&provider, None)
            .resolve("C", &mut prompter)
            .await
            .unwrap();
        assert_eq!(resolution, Resolution::Rejected);
    }

    #[tokio::test]
    async fn test_prompt_cap_limits_options() {
        let provider = StaticProvider((0..8).map(|i| series(&i.to_string(), "Show")).collect());
        let mut prompter = scripted(vec![Some(2)]);
        let resolution = SeriesResolver::new(&provider, Some(3))
            .resolve("Show", &mut prompter)
            .await
            .unwrap();
        assert_eq!(prompter.seen[0].len(), 3);
        assert_matches!(resolution, Resolution::Confirmed(s) if s.id == "2");
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let mut prompter = scripted(Vec::new());
        let result = SeriesResolver::new(&FailingProvider, None)
            .resolve("Foodography", &mut prompter)
            .await;
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("connection refused"));
    }
}
