//! Error types.
//!
//! Only two kinds of failure abort a run: an invalid configuration and a
//! scan root that cannot be enumerated. Registry acquisition problems and
//! unreadable individual files are recovered where they happen and never
//! surface here.

use std::path::PathBuf;

/// Configuration loading and validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("config file already exists: {0} (use --force to overwrite it)")]
    AlreadyExists(PathBuf),

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid registry URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("cache timeout must be non-negative, got {0}")]
    NegativeCacheTimeout(i64),
}

/// Fatal scan failures.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("scan root does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("scan root is not a directory: {0}")]
    RootNotDirectory(PathBuf),

    #[error("failed to enumerate {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("file enumeration task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
