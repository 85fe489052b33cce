use std::path::PathBuf;
use thiserror::Error;

/// Raised by [`Config::from_env`](super::Config::from_env) and the `validate` methods.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// A numeric `GATEKEEPER_*` variable could not be parsed or is out of range.
    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Reranker base URL is not an absolute http(s) URL.
    #[error("invalid reranker url '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },

    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Corpus or matrix path points at something other than a file.
    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },

    /// Model path points at something other than a directory.
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
