//! Release checksum extraction
//!
//! Release file names carry their CRC32 as an 8 digit hex token in square
//! brackets or parentheses, e.g. `[Group] Show - 01 [ABCDEF12].mkv`.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

const CHECKSUM_PATTERN: &str = r"[\(\[]([0-9A-Fa-f]{8})[\)\]]";

static CHECKSUM_REGEX: OnceLock<Regex> = OnceLock::new();

fn checksum_regex() -> &'static Regex {
    CHECKSUM_REGEX.get_or_init(|| Regex::new(CHECKSUM_PATTERN).expect("checksum pattern is valid"))
}

/// Extract the checksum token from a video path.
///
/// Only the file name is searched. When several bracketed tokens match, the
/// last one wins, since release group tags come first in the name.
/// Returns `None` (after a warning) when the name carries no token.
pub fn extract_checksum(video: &Path) -> Option<String> {
    let name = video
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| video.to_string_lossy().into_owned());

    let found = checksum_regex()
        .captures_iter(&name)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    match &found {
        Some(crc) => debug!("Found checksum {} in {}", crc, name),
        None => warn!("Failed to find CRC in {}", name),
    }
    found
}

/// Pick the checksum to submit: an explicit override wins verbatim.
pub fn resolve_checksum(video: &Path, crc_override: Option<&str>) -> Option<String> {
    match crc_override {
        Some(crc) => Some(crc.to_string()),
        None => extract_checksum(video),
    }
}
