//! Error types for tagsort.
//!
//! Only directory-level failures abort a run. Failures tied to a single
//! document are carried as values and end up in the run report.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The root or source directory could not be read.
    #[error("Cannot access {}: {source}", .path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a category or rule directory.
    #[error("Failed to create directory {}: {source}", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RouterError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            RouterError::Config(_) => 2,
            RouterError::Access { .. } => 3,
            _ => 1,
        }
    }

    pub(crate) fn access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RouterError::Access {
            path: path.into(),
            source,
        }
    }
}

/// Reading a single document failed.
#[derive(Debug, Error)]
#[error("Failed to read {}: {source}", .path.display())]
pub struct ExtractionError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Moving a single file failed. The file stays where it was.
#[derive(Debug, Error)]
#[error("Failed to move {} to {}: {source}", .from.display(), .to.display())]
pub struct MoveError {
    pub from: PathBuf,
    pub to: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] toml::de::Error),

    #[error("Invalid glob pattern '{0}': expected *.ext or dir/**")]
    InvalidGlobPattern(String),

    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },

    /// A `--rule` argument without a `=` separator.
    #[error("Invalid prefix rule '{0}': expected PREFIX=FOLDER")]
    InvalidPrefixRule(String),

    /// Neither a flag nor the configuration names a required directory.
    #[error("No {0} directory given: pass --{0} or set `{0}` in the configuration")]
    MissingDirectory(&'static str),

    #[error("IO error reading configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type using RouterError
pub type Result<T> = std::result::Result<T, RouterError>;
