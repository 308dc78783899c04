use std::path::PathBuf;
use thiserror::Error;

/// Failures of the local snapshot store.
///
/// `NotFound` and `Corrupt` are both recoverable "no cached data" conditions;
/// callers fall through to an empty result, never crash. A corrupt or
/// old-shape file is treated the same as an absent one (no schema versioning).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache file '{0}' does not exist")]
    NotFound(PathBuf),

    #[error("failed to read cache file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("cache file '{0}' is not the expected JSON shape")]
    Corrupt(PathBuf, #[source] serde_json::Error),

    #[error("failed to write cache file '{0}'")]
    WriteFailed(PathBuf, #[source] std::io::Error),

    #[error("background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
