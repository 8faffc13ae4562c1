//! Filesystem access used by planning and execution
//!
//! Planning only reads directory structure; execution copies files. Both go
//! through [Filesystem] so the orchestration can be exercised against
//! temporary directories.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;

use super::file_utils::{is_hidden_file, is_video_file};

#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Entry names directly under `path`, sorted. Names are returned as the
    /// OS gives them and need not be valid UTF-8.
    async fn list_directory(&self, path: &Path) -> Result<Vec<OsString>>;

    async fn is_directory(&self, path: &Path) -> bool;

    async fn exists(&self, path: &Path) -> bool;

    /// Create `path` and any missing parents
    async fn create_directory(&self, path: &Path) -> Result<()>;

    /// Copy `src` to `dest`, returning the number of bytes copied
    async fn copy_file(&self, src: &Path, dest: &Path) -> Result<u64>;
}

/// [Filesystem] backed by the local disk
#[derive(Debug, Clone, Default)]
pub struct LocalFilesystem;

#[async_trait]
impl Filesystem for LocalFilesystem {
    async fn list_directory(&self, path: &Path) -> Result<Vec<OsString>> {
        let mut entries = fs::read_dir(path)
            .await
            .with_context(|| format!("Failed to list directory {}", path.display()))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("Failed to read entry in {}", path.display()))?
        {
            names.push(entry.file_name());
        }
        names.sort();
        Ok(names)
    }

    async fn is_directory(&self, path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn create_directory(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create directory {}", path.display()))
    }

    async fn copy_file(&self, src: &Path, dest: &Path) -> Result<u64> {
        fs::copy(src, dest)
            .await
            .with_context(|| format!("Failed to copy {} to {}", src.display(), dest.display()))
    }
}

/// Sub-directories directly under `path`, sorted by name
pub async fn list_subdirectories(fs: &dyn Filesystem, path: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for name in fs.list_directory(path).await? {
        if is_hidden_file(&name.to_string_lossy()) {
            continue;
        }
        let child = path.join(&name);
        if fs.is_directory(&child).await {
            dirs.push(child);
        }
    }
    Ok(dirs)
}

/// Regular files directly under `path`, sorted by name. Hidden files are
/// skipped, and with `video_only` so is anything without a video extension.
pub async fn list_files(fs: &dyn Filesystem, path: &Path, video_only: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for name in fs.list_directory(path).await? {
        let display = name.to_string_lossy();
        if is_hidden_file(&display) || (video_only && !is_video_file(&display)) {
            continue;
        }
        let child = path.join(&name);
        if !fs.is_directory(&child).await {
            files.push(child);
        }
    }
    Ok(files)
}

/// Discover the episode files of a series directory.
///
/// When the directory has any sub-directories (season folders) the files are
/// taken from those sub-directories only and loose top-level files are
/// ignored. Otherwise the top-level files are used.
pub async fn discover_episode_files(
    fs: &dyn Filesystem,
    series_dir: &Path,
    video_only: bool,
) -> Result<Vec<PathBuf>> {
    let season_dirs = list_subdirectories(fs, series_dir).await?;
    if season_dirs.is_empty() {
        return list_files(fs, series_dir, video_only).await;
    }

    let mut files = Vec::new();
    for dir in season_dirs {
        files.extend(list_files(fs, &dir, video_only).await?);
    }
    Ok(files)
}
