//! Bulk synchronizer: rebuilds the sensor-index and measurement-archive
//! snapshots from scratch for a freshly fetched station list.
//!
//! Per-item fetch failures are logged and the item is omitted; a single dead
//! station or sensor never aborts the batch. Each snapshot is replaced
//! wholesale with one atomic write, so the whole run can safely be repeated.
//! The sensor index is persisted and re-read from disk before any measurement
//! fetch begins; the measurement pass works off the same snapshot a concurrent
//! reader would see.

use crate::cache::{CacheStore, SensorIndex};
use crate::error::AerostatError;
use crate::fetch::{ApiBase, FetchJson};
use crate::types::measurement::{MeasurementPayload, MeasurementSeries};
use crate::types::sensor::Sensor;
use crate::types::station::Station;
use chrono::{DateTime, Utc};
use log::{info, warn};

/// Outcome of one synchronizer run.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    /// Stations in the input list.
    pub stations_total: usize,
    /// Stations whose sensor fetch succeeded and made it into the index.
    pub stations_indexed: usize,
    /// Sensors known to the rebuilt index.
    pub sensors_total: usize,
    /// Measurement series that made it into the archive.
    pub series_archived: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

pub(crate) struct Synchronizer<'a, F> {
    fetcher: &'a F,
    store: &'a CacheStore,
    api: &'a ApiBase,
}

impl<'a, F: FetchJson> Synchronizer<'a, F> {
    pub(crate) fn new(fetcher: &'a F, store: &'a CacheStore, api: &'a ApiBase) -> Self {
        Self {
            fetcher,
            store,
            api,
        }
    }

    /// Rebuilds both snapshots. Only a failed snapshot write aborts the run;
    /// any per-station or per-sensor fetch failure is skipped.
    ///
    /// Fetches are sequential on purpose: one long-running background task,
    /// one outbound request at a time, to keep load on the remote API bounded.
    pub(crate) async fn run(&self, stations: &[Station]) -> Result<SyncReport, AerostatError> {
        let started_at = Utc::now();

        let mut index = SensorIndex::new();
        for station in stations {
            let url = self.api.sensors(station.id);
            match self.fetcher.get::<Vec<Sensor>>(&url).await {
                Ok(sensors) => {
                    index.insert(station.id, sensors);
                }
                Err(e) => warn!("sync: skipping station {}: {}", station.id, e),
            }
        }
        let stations_indexed = index.len();
        self.store.write_sensor_index(&index).await?;

        // The sensor universe for the measurement pass is the index as it now
        // exists on disk, not the in-memory map it was built from.
        let index = self.store.read_sensor_index().await?;

        let mut archive: Vec<MeasurementSeries> = Vec::new();
        let mut sensors_total = 0;
        for (station_id, sensors) in &index {
            for sensor in sensors {
                sensors_total += 1;
                let url = self.api.measurements(sensor.id);
                match self.fetcher.get::<MeasurementPayload>(&url).await {
                    Ok(payload) => archive.push(payload.into_series(sensor.id, *station_id)),
                    Err(e) => warn!("sync: skipping sensor {}: {}", sensor.id, e),
                }
            }
        }
        self.store.write_measurement_archive(&archive).await?;

        let report = SyncReport {
            stations_total: stations.len(),
            stations_indexed,
            sensors_total,
            series_archived: archive.len(),
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            "sync complete: {}/{} stations indexed, {}/{} series archived",
            report.stations_indexed,
            report.stations_total,
            report.series_archived,
            report.sensors_total
        );
        Ok(report)
    }
}
