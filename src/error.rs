//! Error types for the uploader
//!
//! Every failure in the upload pipeline is terminal. This module defines the
//! error taxonomy the pipeline stages report, so the binary can print one
//! human-readable message and stop.

use std::fmt;

/// Error type for every stage of the upload pipeline
#[derive(Debug, Clone)]
pub enum UploadError {
    /// Input resolution errors (wrong file counts, bad category token)
    InputError {
        message: String,
        path: Option<String>,
    },

    /// Credential file and configuration errors
    ConfigError {
        message: String,
        field: Option<String>,
    },

    /// File open/read/write errors
    StorageError {
        message: String,
        path: Option<String>,
        source: Option<String>,
    },

    /// The tracker refused a request with a known status code
    TrackerRejected {
        message: String,
        description: String,
    },

    /// The tracker answered with a status code missing from the known table
    UnknownTrackerStatus {
        message: String,
    },

    /// A success response did not contain the expected pattern or delimiter
    ParseError {
        message: String,
        source: Option<String>,
    },

    /// A step ran without the state an earlier step should have recorded
    MissingPrecondition {
        message: String,
        path: Option<String>,
    },

    /// Transport errors from the HTTP client
    NetworkError {
        message: String,
        address: Option<String>,
        source: Option<String>,
    },
}

impl UploadError {
    /// Create a new InputError
    pub fn input_error(message: impl Into<String>) -> Self {
        UploadError::InputError {
            message: message.into(),
            path: None,
        }
    }

    /// Create a new InputError with path
    pub fn input_error_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        UploadError::InputError {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Create a new ConfigError
    pub fn config_error(message: impl Into<String>) -> Self {
        UploadError::ConfigError {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new ConfigError with field
    pub fn config_error_with_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        UploadError::ConfigError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new StorageError with path and source
    pub fn storage_error_full(message: impl Into<String>, path: impl Into<String>, source: impl Into<String>) -> Self {
        UploadError::StorageError {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source.into()),
        }
    }

    /// Create a new TrackerRejected error
    pub fn tracker_rejected(message: impl Into<String>, description: impl Into<String>) -> Self {
        UploadError::TrackerRejected {
            message: message.into(),
            description: description.into(),
        }
    }

    /// Create a new UnknownTrackerStatus error
    pub fn unknown_tracker_status(message: impl Into<String>) -> Self {
        UploadError::UnknownTrackerStatus {
            message: message.into(),
        }
    }

    /// Create a new ParseError
    pub fn parse_error(message: impl Into<String>) -> Self {
        UploadError::ParseError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new ParseError with source
    pub fn parse_error_with_source(message: impl Into<String>, source: impl Into<String>) -> Self {
        UploadError::ParseError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new MissingPrecondition error with path
    pub fn missing_precondition(message: impl Into<String>, path: impl Into<String>) -> Self {
        UploadError::MissingPrecondition {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Create a new NetworkError with address and source
    pub fn network_error_full(message: impl Into<String>, address: impl Into<String>, source: impl Into<String>) -> Self {
        UploadError::NetworkError {
            message: message.into(),
            address: Some(address.into()),
            source: Some(source.into()),
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::InputError { message, path } => {
                if let Some(p) = path {
                    write!(f, "Input error: {} (path: {})", message, p)
                } else {
                    write!(f, "Input error: {}", message)
                }
            }
            UploadError::ConfigError { message, field } => {
                if let Some(field_val) = field {
                    write!(f, "Config error: {} (field: {})", message, field_val)
                } else {
                    write!(f, "Config error: {}", message)
                }
            }
            UploadError::StorageError { message, path, source } => {
                match (path, source) {
                    (Some(p), Some(s)) => write!(f, "Storage error: {} (path: {}, source: {})", message, p, s),
                    (Some(p), None) => write!(f, "Storage error: {} (path: {})", message, p),
                    (None, Some(s)) => write!(f, "Storage error: {} (source: {})", message, s),
                    (None, None) => write!(f, "Storage error: {}", message),
                }
            }
            UploadError::TrackerRejected { message, description } => {
                write!(f, "{}\n{}", message, description)
            }
            UploadError::UnknownTrackerStatus { message } => {
                write!(f, "{}\nThe server returned an error code this tool does not recognise.", message)
            }
            UploadError::ParseError { message, source } => {
                if let Some(src) = source {
                    write!(f, "Parse error: {} (source: {})", message, src)
                } else {
                    write!(f, "Parse error: {}", message)
                }
            }
            UploadError::MissingPrecondition { message, path } => {
                if let Some(p) = path {
                    write!(f, "{} (record: {})", message, p)
                } else {
                    write!(f, "{}", message)
                }
            }
            UploadError::NetworkError { message, address, source } => {
                match (address, source) {
                    (Some(a), Some(s)) => write!(f, "Network error: {} (address: {}, source: {})", message, a, s),
                    (Some(a), None) => write!(f, "Network error: {} (address: {})", message, a),
                    (None, Some(s)) => write!(f, "Network error: {} (source: {})", message, s),
                    (None, None) => write!(f, "Network error: {}", message),
                }
            }
        }
    }
}

impl std::error::Error for UploadError {}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        UploadError::storage_error_full(err.to_string(), "unknown".to_string(), err.kind().to_string())
    }
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        let address = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let message = if err.is_timeout() {
            "Request timed out"
        } else if err.is_connect() {
            "Failed to connect"
        } else {
            "Request failed"
        };
        UploadError::network_error_full(message, address, err.to_string())
    }
}

impl From<serde_yaml::Error> for UploadError {
    fn from(err: serde_yaml::Error) -> Self {
        UploadError::config_error(format!("Failed to parse credentials: {}", err))
    }
}

impl From<serde_bencode::Error> for UploadError {
    fn from(err: serde_bencode::Error) -> Self {
        UploadError::parse_error_with_source("Failed to parse bencode data", err.to_string())
    }
}
