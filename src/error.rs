//! Error types for composer-env-auth.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading environment files, manifests or
/// auth configuration documents.
///
/// The credential resolution path never surfaces these to callers; they are
/// kept in load outcomes and logged instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read a file.
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed `.env` content.
    #[error("failed to parse env file {path}: {message}")]
    ParseEnv { path: PathBuf, message: String },

    /// Malformed JSON document.
    #[error("failed to parse JSON from {path}: {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid repository URL.
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

/// Result type alias for composer-env-auth operations.
pub type Result<T> = std::result::Result<T, Error>;
