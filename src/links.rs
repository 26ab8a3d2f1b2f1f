//! Link record
//!
//! A small `Label: value` text file kept next to each video, named
//! `<video>.link.txt`. A fresh upload rewrites it; a cross-post appends to it.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::UploadError;
use crate::release::inputs::append_suffix;

/// Suffix appended to the video path to name its record
pub const LINK_RECORD_SUFFIX: &str = ".link.txt";

/// Label of the Nyaa download URL line
pub const DOWNLOAD_URL_LABEL: &str = "Nyaa Download URL";

/// Label of the Nyaa view URL line
pub const VIEW_URL_LABEL: &str = "Nyaa View URL";

/// Label of the TokyoTosho status line
pub const TT_STATUS_LABEL: &str = "TT Status";

/// Per-video record of the URLs an upload produced
#[derive(Debug, Clone)]
pub struct LinkRecord {
    path: PathBuf,
}

impl LinkRecord {
    /// Record for the given video
    pub fn for_video(video: &Path) -> Self {
        Self {
            path: Self::path_for(video),
        }
    }

    /// `<video>.link.txt`
    pub fn path_for(video: &Path) -> PathBuf {
        append_suffix(video, LINK_RECORD_SUFFIX)
    }

    /// Location of the record file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace any previous content with the URLs of a fresh upload
    pub fn write_upload(&self, download_url: &str, view_url: &str) -> Result<(), UploadError> {
        info!("Writing links to {}", self.path.display());
        let content = format!(
            "{}\n{}\n",
            format_line(DOWNLOAD_URL_LABEL, download_url),
            format_line(VIEW_URL_LABEL, view_url)
        );
        std::fs::write(&self.path, content).map_err(|e| self.storage_error("Failed to write link record", e))
    }

    /// Append one `Label: value` line, leaving earlier lines untouched
    pub fn append(&self, label: &str, value: &str) -> Result<(), UploadError> {
        debug!("Appending '{}' to {}", label, self.path.display());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.storage_error("Failed to open link record", e))?;
        writeln!(file, "{}", format_line(label, value))
            .map_err(|e| self.storage_error("Failed to append to link record", e))
    }

    /// Read back the download URL of an earlier upload
    pub fn read_download_url(&self) -> Result<String, UploadError> {
        let text = std::fs::read_to_string(&self.path).map_err(|_| {
            UploadError::missing_precondition(
                format!(
                    "Failed to open {}. Are you sure you uploaded this video's torrent?",
                    self.path.display()
                ),
                self.path.display().to_string(),
            )
        })?;

        find_value(&text, DOWNLOAD_URL_LABEL).ok_or_else(|| {
            UploadError::missing_precondition(
                format!(
                    "Can't find {} in {}. Did you edit it out?",
                    DOWNLOAD_URL_LABEL,
                    self.path.display()
                ),
                self.path.display().to_string(),
            )
        })
    }

    fn storage_error(&self, message: &str, err: std::io::Error) -> UploadError {
        UploadError::storage_error_full(message, self.path.display().to_string(), err.to_string())
    }
}

fn format_line(label: &str, value: &str) -> String {
    format!("{}: {}", label, value)
}

/// Value of the first `label: value` line, trimmed
pub fn find_value(text: &str, label: &str) -> Option<String> {
    text.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim() == label)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
