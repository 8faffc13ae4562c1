//! Episode resolution
//!
//! Matches local files of one series against that series' episode list. A
//! file whose stem canonicalizes to exactly an episode title is mapped
//! without asking; anything else is put to the operator with the best ranked
//! episodes and a "none of the above" escape that rejects the file.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};

use super::file_utils::{dotted_extension, file_stem, sanitize_for_filename};
use super::metadata::{EpisodeCandidate, SeriesCandidate};
use super::plan_store::{Mapping, Reject};
use super::prompt::Prompter;
use super::ranker::{CandidateRanker, ScoredCandidate};
use super::resolution::{Resolution, await_selection};
use crate::error::{ResolveError, ResolveResult};

/// What became of one source file
#[derive(Debug, Clone, PartialEq)]
pub enum EpisodeOutcome {
    /// Confirmed automatically (exact title) or by the operator
    Mapped(Resolution<Mapping>),
    Rejected(Reject),
}

/// Build `{dest_root}/{series}/{series} - {episode_id} - {episode_name}{extension}`.
///
/// Series and episode names are sanitized so a title containing a path
/// separator cannot escape the series folder. `extension` includes its dot.
pub fn destination_path(
    dest_root: &Path,
    series_name: &str,
    episode_id: &str,
    episode_name: &str,
    extension: &str,
) -> PathBuf {
    let series = sanitize_for_filename(series_name);
    let episode = sanitize_for_filename(episode_name);
    dest_root
        .join(&series)
        .join(format!("{} - {} - {}{}", series, episode_id, episode, extension))
}

pub struct EpisodeResolver<'a> {
    series: &'a SeriesCandidate,
    dest_root: &'a Path,
    ranker: CandidateRanker<'a, EpisodeCandidate>,
    /// Number of ranked episodes offered on an ambiguous match
    prompt_cap: usize,
}

impl<'a> EpisodeResolver<'a> {
    /// Prepare matching against `episodes`.
    ///
    /// A series without episodes cannot be matched at all and is an error
    /// rather than a silent empty result.
    pub fn new(
        series: &'a SeriesCandidate,
        episodes: &'a [EpisodeCandidate],
        dest_root: &'a Path,
        prompt_cap: usize,
    ) -> ResolveResult<Self> {
        if episodes.is_empty() {
            return Err(ResolveError::NoEpisodes {
                series: series.name.clone(),
                series_id: series.id.clone(),
            });
        }
        Ok(Self {
            series,
            dest_root,
            ranker: CandidateRanker::new(episodes),
            prompt_cap: prompt_cap.max(1),
        })
    }

    /// Destination for `source` if it is `episode`
    pub fn destination_for(&self, source: &Path, episode: &EpisodeCandidate) -> PathBuf {
        destination_path(
            self.dest_root,
            &self.series.name,
            &episode.episode_id(),
            &episode.name,
            &dotted_extension(source),
        )
    }

    /// Resolve one source file.
    pub fn resolve(&self, source: &Path, prompter: &mut dyn Prompter) -> Result<EpisodeOutcome> {
        let query = file_stem(source);
        let ranked = self.ranker.rank(&query);

        if let Some(top) = ranked.first().filter(|top| top.is_exact()) {
            let mapping = self.mapping(source, top.candidate);
            info!(
                file = %source.display(),
                episode = %top.candidate.episode_id(),
                "Exact episode match"
            );
            return Ok(EpisodeOutcome::Mapped(Resolution::AutoConfirmed(mapping)));
        }

        debug!(
            file = %source.display(),
            best_score = ranked.first().map(|s| s.score).unwrap_or(0.0),
            "No exact episode match, asking operator"
        );

        let shortlist: Vec<&ScoredCandidate<'_, EpisodeCandidate>> =
            ranked.iter().take(self.prompt_cap).collect();
        let prompt = format!(
            "No exact match for '{}' in {}, which episode is it?",
            query, self.series.name
        );
        let choice = await_selection(prompter, &prompt, &shortlist, |scored| {
            format!(
                "{} - {} ({:.0}%)",
                scored.candidate.episode_id(),
                scored.candidate.name,
                scored.score * 100.0
            )
        })?;

        Ok(match choice {
            Resolution::Confirmed(scored) => {
                let mapping = self.mapping(source, scored.candidate);
                info!(
                    file = %source.display(),
                    episode = %scored.candidate.episode_id(),
                    "Episode selected"
                );
                EpisodeOutcome::Mapped(Resolution::Confirmed(mapping))
            }
            _ => {
                warn!(file = %source.display(), "File rejected, leaving it untouched");
                EpisodeOutcome::Rejected(Reject {
                    src: source.to_path_buf(),
                })
            }
        })
    }

    fn mapping(&self, source: &Path, episode: &EpisodeCandidate) -> Mapping {
        Mapping {
            src: source.to_path_buf(),
            dest: self.destination_for(source, episode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

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

    fn scripted(answers: Vec<Option<usize>>) -> Scripted {
        Scripted {
            answers,
            seen: Vec::new(),
        }
    }

    fn foodography() -> SeriesCandidate {
        SeriesCandidate {
            id: "77".to_string(),
            name: "Foodography".to_string(),
            year: Some(2009),
        }
    }

    fn episodes() -> Vec<EpisodeCandidate> {
        vec![
            EpisodeCandidate::new(1, 1, "Bread"),
            EpisodeCandidate::new(1, 2, "Salt"),
            EpisodeCandidate::new(1, 3, "Olive Oil"),
            EpisodeCandidate::new(2, 5, "Olive Oil Revisited"),
        ]
    }

    #[test]
    fn test_destination_path_format() {
        let dest = destination_path(
            Path::new("/library"),
            "Foodography",
            "S02E05",
            "Olive Oil",
            ".mp4",
        );
        assert_eq!(
            dest,
            PathBuf::from("/library/Foodography/Foodography - S02E05 - Olive Oil.mp4")
        );
    }

    #[test]
    fn test_destination_path_sanitizes_names() {
        let dest = destination_path(Path::new("/library"), "Who/What", "S01E01", "Why?", ".mkv");
        assert_eq!(dest.parent().unwrap().parent().unwrap(), Path::new("/library"));
        let name = dest.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with(" - S01E01 - Why.mkv"), "{}", name);
    }

    #[test]
    fn test_exact_match_skips_prompt() {
        let series = foodography();
        let eps = episodes();
        let resolver = EpisodeResolver::new(&series, &eps, Path::new("/library"), 10).unwrap();
        let mut prompter = scripted(Vec::new());

        let outcome = resolver
            .resolve(Path::new("/tv/Foodography/Olive Oil.mp4"), &mut prompter)
            .unwrap();

        assert_eq!(
            outcome,
            EpisodeOutcome::Mapped(Resolution::AutoConfirmed(Mapping {
                src: PathBuf::from("/tv/Foodography/Olive Oil.mp4"),
                dest: PathBuf::from("/library/Foodography/Foodography - S01E03 - Olive Oil.mp4"),
            }))
        );
        assert!(prompter.seen.is_empty());
    }

    #[test]
    fn test_exact_match_ignores_punctuation() {
        let series = foodography();
        let eps = episodes();
        let resolver = EpisodeResolver::new(&series, &eps, Path::new("/library"), 10).unwrap();
        let mut prompter = scripted(Vec::new());

        let outcome = resolver
            .resolve(Path::new("/tv/Foodography/olive_oil.m4v"), &mut prompter)
            .unwrap();
        assert_matches!(
            outcome,
            EpisodeOutcome::Mapped(Resolution::AutoConfirmed(m))
                if m.dest.to_string_lossy().ends_with("S01E03 - Olive Oil.m4v")
        );
    }

    #[test]
    fn test_ambiguous_match_operator_picks() {
        let series = foodography();
        let eps = episodes();
        let resolver = EpisodeResolver::new(&series, &eps, Path::new("/library"), 10).unwrap();
        let mut prompter = scripted(vec![Some(0)]);

        let outcome = resolver
            .resolve(Path::new("/tv/Foodography/Olive_Oil_final_cut.mp4"), &mut prompter)
            .unwrap();

        assert_eq!(prompter.seen.len(), 1);
        assert_eq!(prompter.seen[0][0], "S01E03 - Olive Oil (50%)");
        assert_matches!(
            outcome,
            EpisodeOutcome::Mapped(Resolution::Confirmed(m))
                if m.dest == Path::new("/library/Foodography/Foodography - S01E03 - Olive Oil.mp4")
        );
    }

    #[test]
    fn test_ambiguous_match_reject_keeps_source() {
        let series = foodography();
        let eps = episodes();
        let resolver = EpisodeResolver::new(&series, &eps, Path::new("/library"), 10).unwrap();
        let mut prompter = scripted(vec![None]);
        let source = Path::new("/tv/Foodography/Los Angeles Bridge.avi");

        let outcome = resolver.resolve(source, &mut prompter).unwrap();

        assert_eq!(
            outcome,
            EpisodeOutcome::Rejected(Reject {
                src: source.to_path_buf()
            })
        );
        assert_eq!(prompter.seen.len(), 1);
    }

    #[test]
    fn test_prompt_is_capped() {
        let series = foodography();
        let eps: Vec<_> = (1..=25)
            .map(|n| EpisodeCandidate::new(1, n, format!("Part {}", n)))
            .collect();
        let resolver = EpisodeResolver::new(&series, &eps, Path::new("/library"), 10).unwrap();
        let mut prompter = scripted(vec![None]);

        resolver
            .resolve(Path::new("/tv/Foodography/part.mp4"), &mut prompter)
            .unwrap();
        assert_eq!(prompter.seen[0].len(), 10);
        // Equal scores keep aired order
        assert!(prompter.seen[0][0].starts_with("S01E01 - Part 1"));
        assert!(prompter.seen[0][9].starts_with("S01E10 - Part 10"));
    }

    #[test]
    fn test_no_episodes_is_an_error() {
        let series = foodography();
        let result = EpisodeResolver::new(&series, &[], Path::new("/library"), 10);
        assert_matches!(
            result.err(),
            Some(ResolveError::NoEpisodes { series, .. }) if series == "Foodography"
        );
    }
}
