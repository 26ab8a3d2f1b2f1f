//! Torrent file handling module
//!
//! Reads .torrent files and summarises their metainfo ahead of an upload.

pub mod info;
pub mod parser;

pub use info::TorrentSummary;
pub use parser::TorrentInspector;
