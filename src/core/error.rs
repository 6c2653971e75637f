//! Error types for the preparation pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to retrieve archive bytes for a URL.
///
/// Recorded per dependency; never aborts the acquisition batch on its own.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP {code} from {url}")]
    Status { url: String, code: u16 },

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("failed to read response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to turn fetched bytes into files in a dependency directory.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("no qualifying members for {dep} in archive")]
    NoMembers { dep: String },

    #[error("unsupported archive format (not zip or tar.gz)")]
    UnsupportedFormat,

    #[error("archive read error: {0}")]
    Archive(String),

    #[error("members {first} and {second} both flatten to {name}")]
    Collision {
        name: String,
        first: String,
        second: String,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single dependency could not be acquired.
#[derive(Error, Debug)]
pub enum AcquireError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Fatal errors that abort a preparation run.
#[derive(Error, Debug)]
pub enum PrepError {
    #[error("failed to download/extract: {}", .deps.join(", "))]
    AcquisitionFailed { deps: Vec<String> },

    #[error("cannot read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot list {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}
