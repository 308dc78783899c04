use crate::cache::error::CacheError;
use crate::fetch::error::FetchError;
use crate::types::sensor::SensorId;
use crate::types::station::StationId;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The cached resource kinds a request can be about. Carried inside
/// [`AerostatError::NoData`] so callers can phrase distinct messages per
/// resource ("no network and no cache" for stations vs. "no measurements for
/// this sensor").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Stations,
    Sensors(StationId),
    Measurements(SensorId),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Stations => write!(f, "station list"),
            Resource::Sensors(id) => write!(f, "sensors of station {}", id),
            Resource::Measurements(id) => write!(f, "measurements of sensor {}", id),
        }
    }
}

#[derive(Debug, Error)]
pub enum AerostatError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),

    /// Both tiers failed: the live fetch and the cache fallback. The worst
    /// case any single request can reach; never a panic.
    #[error("no data available for {resource}: live fetch failed and no usable cache")]
    NoData {
        resource: Resource,
        #[source]
        fetch: FetchError,
        /// The cache-side failure, absent when no fallback tier applied.
        cache: Option<CacheError>,
    },
}
