//! Persisted relocation plan
//!
//! A plan is a JSON Lines file: one `{"src": ..., "dest": ...}` object per
//! line, in the order the mappings were confirmed. Each line parses on its
//! own, so the executor can resume by skipping already-processed records.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// A confirmed relocation of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub src: PathBuf,
    pub dest: PathBuf,
}

/// A source file that could not be matched and is left untouched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reject {
    pub src: PathBuf,
}

/// Encode mappings as JSON Lines
pub fn encode_plan(mappings: &[Mapping]) -> Result<String> {
    let mut out = String::new();
    for mapping in mappings {
        out.push_str(&serde_json::to_string(mapping).context("Failed to encode mapping")?);
        out.push('\n');
    }
    Ok(out)
}

/// Decode JSON Lines, ignoring blank lines
pub fn decode_plan(contents: &str) -> Result<Vec<Mapping>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Malformed plan record on line {}", i + 1))
        })
        .collect()
}

/// Where the mappings of an aborted planning run are saved: the plan path
/// with `.partial` appended, so a complete plan is never mistaken for it.
pub fn partial_plan_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

/// Write `mappings` to `path`, replacing any previous plan
pub async fn write_plan(path: &Path, mappings: &[Mapping]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create plan directory {}", parent.display()))?;
    }

    let mut file = fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create plan file {}", path.display()))?;
    file.write_all(encode_plan(mappings)?.as_bytes()).await?;
    file.flush().await?;

    info!(path = %path.display(), count = mappings.len(), "Plan written");
    Ok(())
}

/// Read every mapping from the plan at `path`
pub async fn read_plan(path: &Path) -> Result<Vec<Mapping>> {
    let contents = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read plan file {}", path.display()))?;
    let mappings = decode_plan(&contents)
        .with_context(|| format!("Invalid plan file {}", path.display()))?;

    info!(path = %path.display(), count = mappings.len(), "Plan loaded");
    Ok(mappings)
}
