//! Input resolution
//!
//! Works out which video and which torrent file an invocation operates on,
//! either from explicit paths or by scanning a directory.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::UploadError;

/// Extensions treated as release videos
pub const VIDEO_EXTENSIONS: &[&str] = &["mkv", "mp4"];

/// Extension of torrent files
pub const TORRENT_EXTENSION: &str = "torrent";

/// Suffix appended to a video path to name its torrent in explicit mode
pub const TORRENT_SUFFIX: &str = ".torrent";

/// The video/torrent pair an invocation operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInputs {
    /// Video the torrent was built for
    pub video: PathBuf,
    /// Torrent file to upload
    pub torrent: PathBuf,
}

/// Resolve inputs from an explicit video path.
///
/// Without an override the torrent is expected next to the video as
/// `<video>.torrent`; the path is not checked here.
pub fn resolve_explicit(video: &Path, torrent_override: Option<&Path>) -> ResolvedInputs {
    let torrent = match torrent_override {
        Some(t) => t.to_path_buf(),
        None => append_suffix(video, TORRENT_SUFFIX),
    };
    debug!("Explicit inputs: video={}, torrent={}", video.display(), torrent.display());
    ResolvedInputs {
        video: video.to_path_buf(),
        torrent,
    }
}

/// Resolve inputs by scanning `dir` for exactly one video and one torrent.
///
/// An explicit torrent override skips the torrent count check.
pub fn resolve_local(dir: &Path, torrent_override: Option<&Path>) -> Result<ResolvedInputs, UploadError> {
    info!("Scanning {} for release files", dir.display());

    let entries = list_files(dir)?;
    let videos: Vec<&PathBuf> = entries
        .iter()
        .filter(|p| has_extension(p, VIDEO_EXTENSIONS))
        .collect();
    let torrents: Vec<&PathBuf> = entries
        .iter()
        .filter(|p| has_extension(p, &[TORRENT_EXTENSION]))
        .collect();

    debug!("Found {} video(s) and {} torrent(s)", videos.len(), torrents.len());

    let video = match videos.as_slice() {
        [only] => (*only).clone(),
        _ => {
            return Err(UploadError::input_error_with_path(
                "Need to have exactly one video in this folder",
                dir.display().to_string(),
            ))
        }
    };

    let torrent = match (torrent_override, torrents.as_slice()) {
        (Some(t), _) => t.to_path_buf(),
        (None, [only]) => (*only).clone(),
        (None, _) => {
            return Err(UploadError::input_error_with_path(
                "Need to have exactly one torrent in this folder",
                dir.display().to_string(),
            ))
        }
    };

    Ok(ResolvedInputs { video, torrent })
}

/// Append a literal suffix to a path's final component
pub fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>, UploadError> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| {
        UploadError::storage_error_full("Failed to list directory", dir.display().to_string(), e.to_string())
    })?;

    let mut files = Vec::new();
    for entry in read_dir {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| extensions.contains(&ext))
        .unwrap_or(false)
}
