//! Resilient client for public air-quality monitoring data.
//!
//! Fetches stations, sensors, measurement series and the aggregate
//! air-quality index from the GIOS REST API, keeps atomic JSON snapshots of
//! the cached resources on disk, and transparently serves those snapshots
//! when the network or the response shape lets a request down. Also ships a
//! pure chart projector that turns a measurement series into drawable
//! geometry.

mod aerostat;
mod cache;
mod chart;
mod error;
mod fetch;
mod sync;
mod types;
mod utils;

pub use aerostat::{Aerostat, SyncEvent};
pub use error::{AerostatError, Resource};
pub use sync::SyncReport;

pub use cache::error::CacheError;
pub use cache::{CacheStore, SensorIndex};
pub use fetch::error::FetchError;
pub use fetch::{ApiBase, FetchJson, Fetcher};

pub use chart::{project, ChartLayout, PixelPoint, Segment, TickLabel};

pub use types::air_quality::{AirQualityIndex, IndexLevel};
pub use types::measurement::{MeasurementPayload, MeasurementSeries, PlotPoint, Reading};
pub use types::sensor::{Param, Sensor, SensorId};
pub use types::station::{City, Commune, Station, StationId};
