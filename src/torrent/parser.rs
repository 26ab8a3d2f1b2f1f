//! Torrent file inspection
//!
//! Decodes a .torrent before upload so obvious problems show up locally
//! instead of as a tracker rejection.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_bencode::value::Value;
use tracing::{debug, error, info, trace, warn};

use crate::error::UploadError;
use crate::torrent::info::TorrentSummary;

#[derive(Debug, Deserialize)]
struct MetaInfo {
    #[serde(default)]
    announce: Option<String>,
    #[serde(default, rename = "announce-list")]
    announce_list: Option<Vec<Vec<String>>>,
    info: Value,
}

/// Reads and summarises .torrent files
pub struct TorrentInspector;

impl TorrentInspector {
    /// Read the raw torrent bytes from disk
    pub fn read_file(path: &Path) -> Result<Vec<u8>, UploadError> {
        info!("Loading torrent file from: {}", path.display());

        let data = std::fs::read(path).map_err(|e| {
            error!("Failed to read torrent file '{}': {}", path.display(), e);
            UploadError::storage_error_full(
                format!("Torrent file {} cannot be opened.", path.display()),
                path.display().to_string(),
                e.to_string(),
            )
        })?;

        debug!("Read {} bytes from torrent file", data.len());
        Ok(data)
    }

    /// Summarise torrent bytes
    pub fn inspect(data: &[u8]) -> Result<TorrentSummary, UploadError> {
        trace!("Torrent data (first 100 bytes): {:?}", &data[..data.len().min(100)]);

        let meta: MetaInfo = serde_bencode::from_bytes(data)?;

        let info_dict = match &meta.info {
            Value::Dict(d) => d,
            _ => return Err(UploadError::parse_error("Info must be a dictionary")),
        };

        let name = get_bytes(info_dict, b"name")
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .ok_or_else(|| UploadError::parse_error("Missing name field"))?;

        let (total_size, file_count) = match (info_dict.get(&b"length"[..]), info_dict.get(&b"files"[..])) {
            (Some(Value::Int(len)), _) => (file_length(*len), 1),
            (_, Some(Value::List(files))) => {
                let total = files
                    .iter()
                    .filter_map(|f| match f {
                        Value::Dict(d) => match d.get(&b"length"[..]) {
                            Some(Value::Int(len)) => Some(file_length(*len)),
                            _ => None,
                        },
                        _ => None,
                    })
                    .sum();
                (total, files.len())
            }
            _ => return Err(UploadError::parse_error("Neither length nor files found in info dict")),
        };

        let mut announce_list = Vec::new();
        if let Some(primary) = meta.announce.as_ref().filter(|a| !a.is_empty()) {
            announce_list.push(primary.clone());
        }
        for url in meta.announce_list.iter().flatten().flatten() {
            if !url.is_empty() && !announce_list.contains(url) {
                announce_list.push(url.clone());
            }
        }

        let info_bytes = serde_bencode::to_bytes(&meta.info)?;
        let info_hash = TorrentSummary::generate_info_hash(&info_bytes);

        debug!("Torrent '{}' has {} tracker(s)", name, announce_list.len());
        Ok(TorrentSummary {
            name,
            announce: announce_list.first().cloned(),
            announce_list,
            info_hash,
            total_size,
            file_count,
        })
    }
}

/// Negative lengths count as zero
fn file_length(len: i64) -> u64 {
    u64::try_from(len).unwrap_or_else(|_| {
        warn!("Torrent declares a negative file length ({})", len);
        0
    })
}

fn get_bytes<'a>(dict: &'a HashMap<Vec<u8>, Value>, key: &[u8]) -> Option<&'a [u8]> {
    match dict.get(key) {
        Some(Value::Bytes(b)) => Some(b.as_slice()),
        _ => None,
    }
}
