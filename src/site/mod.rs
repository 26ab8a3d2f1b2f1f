//! Site clients
//!
//! Form-post clients for the Nyaa tracker and the TokyoTosho cross-poster.

pub mod nyaa;
pub mod tokyotosho;

pub use nyaa::{MetadataForm, NyaaSession, UploadForm, UploadResult};
pub use tokyotosho::{CrossPostForm, CrossPostResult, TokyoToshoClient};
