//! CLI arguments module
//!
//! Defines command-line argument parsing using clap.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::release::Category;

/// CLI arguments for the uploader
#[derive(Debug, Parser)]
#[command(name = "nyaa-uploader")]
#[command(about = "Upload a release torrent to Nyaa and optionally TokyoTosho", long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["video", "local"])))]
#[command(group(ArgGroup::new("cross_post").args(["tosho", "up_tosho"])))]
pub struct CliArgs {
    /// Nyaa/Tosho category
    #[arg(value_enum, value_name = "CATEGORY")]
    pub category: Category,

    /// Video file the torrent is named for
    #[arg(short = 'V', long, value_name = "FILE")]
    pub video: Option<PathBuf>,

    /// Use the video/torrent in the calling directory. Must be exactly one of each.
    #[arg(short, long)]
    pub local: bool,

    /// Torrent file, if it doesn't match the video
    #[arg(short = 'T', long, value_name = "FILE")]
    pub torrent: Option<PathBuf>,

    /// Override the detected CRC
    #[arg(short, long, value_name = "CRC")]
    pub crc: Option<String>,

    /// Nyaa group field
    #[arg(short, long)]
    pub group: Option<String>,

    /// Nyaa title field
    #[arg(short, long)]
    pub title: Option<String>,

    /// Nyaa part field
    #[arg(short, long)]
    pub part: Option<String>,

    /// Nyaa type field
    #[arg(short = 'y', long = "type", value_name = "TYPE")]
    pub release_type: Option<String>,

    /// Set hidden on Nyaa
    #[arg(short = 'H', long)]
    pub hidden: bool,

    /// Also submit the torrent to TokyoTosho
    #[arg(short = 'o', long)]
    pub tosho: bool,

    /// Submit a torrent already uploaded to Nyaa to TokyoTosho
    #[arg(long)]
    pub up_tosho: bool,

    /// Credentials file (defaults to creds.yaml next to the executable)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print more data to stdout
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode (no output except errors)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl CliArgs {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Get the log level based on verbosity settings
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::ERROR
        } else {
            tracing::Level::INFO
        }
    }
}
