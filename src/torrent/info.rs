//! Torrent summary structures
//!
//! The handful of metainfo fields worth showing before an upload.

use sha1::{Digest, Sha1};

/// Summary of a .torrent file about to be uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentSummary {
    /// Torrent name from the info dictionary
    pub name: String,
    /// Primary tracker announce URL
    pub announce: Option<String>,
    /// Every announce URL, primary first, duplicates removed
    pub announce_list: Vec<String>,
    /// SHA1 hash of the info dictionary
    pub info_hash: [u8; 20],
    /// Total payload size in bytes
    pub total_size: u64,
    /// Number of files in the payload
    pub file_count: usize,
}

impl TorrentSummary {
    /// Whether the torrent names at least one tracker
    pub fn has_announce(&self) -> bool {
        !self.announce_list.is_empty()
    }

    /// Get info hash as a hex string
    pub fn info_hash_hex(&self) -> String {
        hex::encode(self.info_hash)
    }

    /// Generate info hash from info dictionary bytes
    pub fn generate_info_hash(info_dict_bytes: &[u8]) -> [u8; 20] {
        let mut hasher = Sha1::new();
        hasher.update(info_dict_bytes);
        let result = hasher.finalize();
        result.into()
    }

    /// Format bytes to human readable string
    pub fn format_bytes(bytes: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = bytes as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
