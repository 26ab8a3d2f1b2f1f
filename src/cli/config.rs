//! CLI configuration module
//!
//! Loads site credentials and assembles the per-invocation context.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::cli::args::CliArgs;
use crate::error::UploadError;
use crate::release::{resolve_checksum, Category, ResolvedInputs};

/// Name of the credentials file looked up next to the executable
pub const CREDENTIALS_FILE: &str = "creds.yaml";

/// Default Nyaa site root
pub const DEFAULT_NYAA_URL: &str = "http://www.nyaa.se";

/// Default TokyoTosho site root
pub const DEFAULT_TOKYOTOSHO_URL: &str = "https://www.tokyotosho.info";

fn default_nyaa_url() -> String {
    DEFAULT_NYAA_URL.to_string()
}

fn default_tokyotosho_url() -> String {
    DEFAULT_TOKYOTOSHO_URL.to_string()
}

/// Site credentials loaded from `creds.yaml`
#[derive(Clone, Deserialize)]
pub struct Credentials {
    /// Nyaa login name
    pub nyaa_login: String,
    /// Nyaa password
    pub nyaa_pass: String,
    /// TokyoTosho API key
    #[serde(default)]
    pub tt_api_key: String,
    /// Website attributed as the info URL on every listing
    pub website: String,
    /// Nyaa site root
    #[serde(default = "default_nyaa_url")]
    pub nyaa_url: String,
    /// TokyoTosho site root
    #[serde(default = "default_tokyotosho_url")]
    pub tokyotosho_url: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("nyaa_login", &self.nyaa_login)
            .field("nyaa_pass", &"<redacted>")
            .field("tt_api_key", &"<redacted>")
            .field("website", &self.website)
            .field("nyaa_url", &self.nyaa_url)
            .field("tokyotosho_url", &self.tokyotosho_url)
            .finish()
    }
}

impl Credentials {
    /// Parse credentials from YAML text
    pub fn from_yaml(text: &str) -> Result<Self, UploadError> {
        let creds: Credentials = serde_yaml::from_str(text)?;
        Ok(creds)
    }

    /// Load credentials from an explicit path, or from `creds.yaml` next to
    /// the running executable.
    pub fn load(path: Option<&Path>) -> Result<Self, UploadError> {
        let location = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_location()?,
        };
        info!("Loading credentials from: {}", location.display());

        let text = std::fs::read_to_string(&location).map_err(|e| {
            UploadError::storage_error_full(
                format!("Cannot load {}, cannot continue.", CREDENTIALS_FILE),
                location.display().to_string(),
                e.to_string(),
            )
        })?;

        let creds = Self::from_yaml(&text)?;
        debug!("Loaded credentials: {:?}", creds);
        Ok(creds)
    }

    /// `creds.yaml` in the directory of the resolved executable
    pub fn default_location() -> Result<PathBuf, UploadError> {
        let exe = std::env::current_exe()
            .and_then(|p| p.canonicalize())
            .map_err(|e| UploadError::config_error(format!("Cannot locate executable: {}", e)))?;
        let dir = exe
            .parent()
            .ok_or_else(|| UploadError::config_error("Executable has no parent directory"))?;
        Ok(dir.join(CREDENTIALS_FILE))
    }

    /// Validate credentials
    pub fn validate(&self) -> Result<(), UploadError> {
        let required = [
            ("nyaa_login", &self.nyaa_login),
            ("nyaa_pass", &self.nyaa_pass),
            ("website", &self.website),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(UploadError::config_error_with_field("Value must not be empty", field));
            }
        }

        for (field, value) in [("nyaa_url", &self.nyaa_url), ("tokyotosho_url", &self.tokyotosho_url)] {
            Url::parse(value).map_err(|e| {
                UploadError::config_error_with_field(format!("Invalid site URL '{}': {}", value, e), field)
            })?;
        }

        Ok(())
    }

    /// Cross-posting needs an API key on top of the base credentials
    pub fn validate_cross_post(&self) -> Result<(), UploadError> {
        if self.tt_api_key.trim().is_empty() {
            return Err(UploadError::config_error_with_field(
                "A TokyoTosho API key is required to cross-post",
                "tt_api_key",
            ));
        }
        Ok(())
    }
}

/// When, if at all, the TokyoTosho announcement happens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossPostMode {
    /// Upload to Nyaa only
    Skip,
    /// Upload to Nyaa, then cross-post the fresh download URL
    Immediate,
    /// Cross-post a download URL recorded by an earlier upload
    Deferred,
}

/// Everything one invocation operates on, fixed at startup
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Release category
    pub category: Category,
    /// Video the torrent was built for
    pub video: PathBuf,
    /// Torrent file to upload
    pub torrent: PathBuf,
    /// Checksum token, if one was given or found
    pub checksum: Option<String>,
    /// Whether the checksum came from the command line
    pub checksum_overridden: bool,
    /// Nyaa group field
    pub group: Option<String>,
    /// Nyaa title field
    pub title: Option<String>,
    /// Nyaa part field
    pub part: Option<String>,
    /// Nyaa type field
    pub release_type: Option<String>,
    /// Hide the listing on Nyaa
    pub hidden: bool,
    /// Cross-post behaviour
    pub cross_post: CrossPostMode,
    /// Verbose output
    pub verbose: bool,
}

impl Invocation {
    /// Create the invocation context from CLI arguments and resolved inputs
    pub fn from_args(args: &CliArgs, inputs: ResolvedInputs) -> Self {
        let cross_post = if args.up_tosho {
            CrossPostMode::Deferred
        } else if args.tosho {
            CrossPostMode::Immediate
        } else {
            CrossPostMode::Skip
        };

        let checksum = resolve_checksum(&inputs.video, args.crc.as_deref());

        Self {
            category: args.category,
            video: inputs.video,
            torrent: inputs.torrent,
            checksum,
            checksum_overridden: args.crc.is_some(),
            group: args.group.clone(),
            title: args.title.clone(),
            part: args.part.clone(),
            release_type: args.release_type.clone(),
            hidden: args.hidden,
            cross_post,
            verbose: args.verbose,
        }
    }

    /// Nyaa `hidden` form value
    pub fn hidden_flag(&self) -> &'static str {
        if self.hidden {
            "1"
        } else {
            "0"
        }
    }

    /// Video file name as submitted in the `namemod` field. The directory
    /// part never leaves the machine.
    pub fn video_name(&self) -> String {
        self.video
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.video.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    const YAML: &str = "nyaa_login: user\nnyaa_pass: secret\ntt_api_key: key123\nwebsite: http://example.org/\n";

    fn inputs() -> ResolvedInputs {
        ResolvedInputs {
            video: PathBuf::from("Show - 01 [ABCDEF12].mkv"),
            torrent: PathBuf::from("Show - 01 [ABCDEF12].mkv.torrent"),
        }
    }

    #[test]
    fn test_credentials_from_yaml_defaults() {
        let creds = Credentials::from_yaml(YAML).unwrap();
        assert_eq!(creds.nyaa_login, "user");
        assert_eq!(creds.website, "http://example.org/");
        assert_eq!(creds.nyaa_url, DEFAULT_NYAA_URL);
        assert_eq!(creds.tokyotosho_url, DEFAULT_TOKYOTOSHO_URL);
        assert!(creds.validate().is_ok());
        assert!(creds.validate_cross_post().is_ok());
    }

    #[test]
    fn test_credentials_missing_field() {
        let err = Credentials::from_yaml("nyaa_login: user\n").unwrap_err();
        assert!(matches!(err, UploadError::ConfigError { .. }));
    }

    #[test]
    fn test_credentials_validate_empty_login() {
        let creds = Credentials::from_yaml("nyaa_login: ''\nnyaa_pass: p\nwebsite: w\n").unwrap();
        let err = creds.validate().unwrap_err();
        assert!(err.to_string().contains("nyaa_login"));
    }

    #[test]
    fn test_credentials_validate_bad_site_url() {
        let text = format!("{}nyaa_url: not a url\n", YAML);
        let creds = Credentials::from_yaml(&text).unwrap();
        let err = creds.validate().unwrap_err();
        assert!(err.to_string().contains("nyaa_url"));
    }

    #[test]
    fn test_cross_post_needs_api_key() {
        let creds = Credentials::from_yaml("nyaa_login: u\nnyaa_pass: p\nwebsite: w\n").unwrap();
        assert!(creds.validate_cross_post().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::from_yaml(YAML).unwrap();
        let text = format!("{:?}", creds);
        assert!(!text.contains("secret"));
        assert!(!text.contains("key123"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Credentials::load(Some(Path::new("/nonexistent/creds.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Cannot load creds.yaml"));
    }

    #[test]
    fn test_invocation_from_args() {
        let args = CliArgs::try_parse_from(["nyaa-uploader", "-l", "-o", "-H", "-g", "Grp", "asub"]).unwrap();
        let invocation = Invocation::from_args(&args, inputs());

        assert_eq!(invocation.category, Category::Asub);
        assert_eq!(invocation.checksum.as_deref(), Some("ABCDEF12"));
        assert!(!invocation.checksum_overridden);
        assert_eq!(invocation.group.as_deref(), Some("Grp"));
        assert_eq!(invocation.hidden_flag(), "1");
        assert_eq!(invocation.cross_post, CrossPostMode::Immediate);
        assert_eq!(invocation.video_name(), "Show - 01 [ABCDEF12].mkv");
    }

    #[test]
    fn test_invocation_checksum_override_and_deferred() {
        let args = CliArgs::try_parse_from(["nyaa-uploader", "-l", "--up-tosho", "-c", "11111111", "lsub"]).unwrap();
        let invocation = Invocation::from_args(&args, inputs());

        assert_eq!(invocation.checksum.as_deref(), Some("11111111"));
        assert!(invocation.checksum_overridden);
        assert_eq!(invocation.hidden_flag(), "0");
        assert_eq!(invocation.cross_post, CrossPostMode::Deferred);
    }

    #[test]
    fn test_video_name_drops_directory() {
        let args = CliArgs::try_parse_from(["nyaa-uploader", "-l", "asub"]).unwrap();
        let inputs = ResolvedInputs {
            video: PathBuf::from("/home/user/releases/Show - 01 [ABCDEF12].mkv"),
            torrent: PathBuf::from("/home/user/releases/Show - 01 [ABCDEF12].torrent"),
        };
        let invocation = Invocation::from_args(&args, inputs);
        assert_eq!(invocation.video_name(), "Show - 01 [ABCDEF12].mkv");
    }
}
