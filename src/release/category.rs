//! Release categories
//!
//! Maps the four content classifications onto the category codes each site
//! expects.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::error::UploadError;

/// Content classification of a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Category {
    /// Live action, raw
    Lraw,
    /// Live action, subtitled
    Lsub,
    /// Anime, raw
    Araw,
    /// Anime, subtitled
    Asub,
}

impl Category {
    /// All categories, in CLI order
    pub const ALL: [Category; 4] = [Category::Lraw, Category::Lsub, Category::Araw, Category::Asub];

    /// Parse a category token such as `asub`
    pub fn from_token(token: &str) -> Result<Self, UploadError> {
        match token {
            "lraw" => Ok(Category::Lraw),
            "lsub" => Ok(Category::Lsub),
            "araw" => Ok(Category::Araw),
            "asub" => Ok(Category::Asub),
            other => Err(UploadError::input_error(format!(
                "Unknown category '{}', expected one of lraw, lsub, araw, asub",
                other
            ))),
        }
    }

    /// The token used on the command line
    pub fn token(&self) -> &'static str {
        match self {
            Category::Lraw => "lraw",
            Category::Lsub => "lsub",
            Category::Araw => "araw",
            Category::Asub => "asub",
        }
    }

    /// Nyaa `catid` form value
    pub fn nyaa_code(&self) -> &'static str {
        match self {
            Category::Lraw => "5_20",
            Category::Lsub => "5_19",
            Category::Araw => "1_11",
            Category::Asub => "1_37",
        }
    }

    /// TokyoTosho `type` form value
    pub fn tokyotosho_code(&self) -> u8 {
        match self {
            Category::Lraw => 7,
            Category::Lsub => 8,
            Category::Araw => 7,
            Category::Asub => 1,
        }
    }
}

impl FromStr for Category {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
