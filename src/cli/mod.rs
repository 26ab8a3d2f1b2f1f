//! CLI module
//!
//! Command-line interface for the uploader.

pub mod args;
pub mod config;
pub mod status;

pub use args::CliArgs;
pub use config::{Credentials, CrossPostMode, Invocation};
pub use status::StatusDisplay;
