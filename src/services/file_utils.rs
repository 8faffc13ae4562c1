//! Shared file utility functions
//!
//! File extension checks and filename sanitization used when discovering
//! episode files and building destination paths.

use std::path::Path;

/// Video file extensions (lowercase)
pub const VIDEO_EXTENSIONS: &[&str] = &[
    ".mkv", ".mp4", ".avi", ".mov", ".wmv", ".flv", ".webm", ".m4v", ".ts", ".m2ts", ".mpg",
    ".mpeg",
];

/// Check if a file is a video file based on extension
///
/// # Example
/// ```
/// use tv_transformer::services::file_utils::is_video_file;
/// assert!(is_video_file("movie.mkv"));
/// assert!(is_video_file("/path/to/video.mp4"));
/// assert!(!is_video_file("music.mp3"));
/// ```
pub fn is_video_file(path: &str) -> bool {
    let lower = path.to_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Dot-files such as `.DS_Store` are never episodes
pub fn is_hidden_file(name: &str) -> bool {
    name.starts_with('.')
}

/// File stem used as the matching query (`Olive_Oil.mp4` → `Olive_Oil`)
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Extension including the leading dot, or empty when there is none
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

/// Sanitize a string for use as a filename
///
/// Uses the `sanitize_filename` crate which handles:
/// - Invalid characters for the current OS
/// - Reserved filenames (CON, PRN, etc. on Windows)
/// - Leading/trailing spaces and dots
pub fn sanitize_for_filename(name: &str) -> String {
    sanitize_filename::sanitize(name)
}
