//! nyaa-uploader
//!
//! Uploads a release torrent to Nyaa, fills in its listing metadata, records
//! the resulting links next to the video and optionally cross-posts the
//! download link to TokyoTosho.

pub mod cli;
pub mod error;
pub mod links;
pub mod pipeline;
pub mod release;
pub mod site;
pub mod torrent;

pub use error::UploadError;

pub use cli::{CliArgs, Credentials, CrossPostMode, Invocation, StatusDisplay};
pub use links::LinkRecord;
pub use pipeline::Pipeline;
pub use release::{extract_checksum, resolve_explicit, resolve_local, Category, ResolvedInputs};
pub use site::{CrossPostResult, NyaaSession, TokyoToshoClient, UploadResult};
pub use torrent::{TorrentInspector, TorrentSummary};
