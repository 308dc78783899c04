//! The main entry point for retrieving air-quality monitoring data: stations,
//! per-station sensors, per-sensor measurement series and the aggregate
//! air-quality index.
//!
//! Every cached resource follows the same policy: prefer the live fetch,
//! refresh the local snapshot on success (fire-and-forget), fall back to the
//! snapshot on failure, and degrade to an explicit no-data result when both
//! tiers fail. Nothing in here panics on a bad network or a bad disk.

use crate::cache::error::CacheError;
use crate::cache::{CacheStore, SensorIndex};
use crate::error::{AerostatError, Resource};
use crate::fetch::{ApiBase, FetchJson, Fetcher};
use crate::sync::{SyncReport, Synchronizer};
use crate::types::air_quality::AirQualityIndex;
use crate::types::measurement::{MeasurementPayload, MeasurementSeries};
use crate::types::sensor::{Sensor, SensorId};
use crate::types::station::{Station, StationId};
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use log::{info, warn};
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Progress events a background synchronization hands back to the caller's
/// consumer loop.
///
/// The channel is the cross-thread hand-off: the worker never touches caller
/// state, it only sends. When the initial live fetch fails (offline start) the
/// worker ends without sending and the channel simply closes.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A fresh station list arrived; views can refresh immediately, before
    /// the (much longer) per-sensor sweep finishes.
    StationsRefreshed(Vec<Station>),
    /// The full rebuild of the sensor and measurement snapshots finished.
    SyncCompleted(SyncReport),
}

/// The main client for air-quality data.
///
/// Owns the HTTP fetcher and the local snapshot store. Cloning is cheap (the
/// HTTP client is reference-counted, the store holds a path), which is what
/// lets background refreshes run detached.
///
/// # Examples
///
/// ```no_run
/// # use aerostat::{Aerostat, AerostatError};
/// # async fn run() -> Result<(), AerostatError> {
/// let client = Aerostat::new().await?;
/// let stations = client.stations().await?;
/// println!("{} stations", stations.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Aerostat {
    fetcher: Fetcher,
    store: CacheStore,
    api: ApiBase,
}

#[bon]
impl Aerostat {
    /// Creates a client using the default cache directory (resolved via the
    /// `dirs` crate, e.g. `~/.cache/aerostat_cache` on Linux).
    ///
    /// # Errors
    ///
    /// Returns [`AerostatError::CacheDirResolution`] when the system cache
    /// directory cannot be determined, or [`AerostatError::CacheDirCreation`]
    /// when it cannot be created.
    pub async fn new() -> Result<Self, AerostatError> {
        let cache_folder = get_cache_dir().map_err(AerostatError::CacheDirResolution)?;
        Self::with_cache_folder(cache_folder).await
    }

    /// Creates a client that keeps its snapshots in `cache_folder`, creating
    /// the directory if needed.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, AerostatError> {
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| AerostatError::CacheDirCreation(cache_folder.clone(), e))?;
        Ok(Self {
            fetcher: Fetcher::new(),
            store: CacheStore::new(&cache_folder),
            api: ApiBase::default(),
        })
    }

    /// Creates a client with explicit options, via a builder.
    ///
    /// * `.cache_folder(PathBuf)`: Optional. Snapshot directory; defaults to
    ///   the system cache directory.
    /// * `.api_base(String)`: Optional. Base URL of the data service; defaults
    ///   to the public GIOS endpoint. Useful for mirrors and tests.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use aerostat::{Aerostat, AerostatError};
    /// # use std::path::PathBuf;
    /// # async fn run() -> Result<(), AerostatError> {
    /// let client = Aerostat::with_options()
    ///     .cache_folder(PathBuf::from("/tmp/aq-cache"))
    ///     .api_base("https://mirror.example/pjp-api/rest".to_string())
    ///     .call()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn with_options(
        cache_folder: Option<PathBuf>,
        api_base: Option<String>,
    ) -> Result<Self, AerostatError> {
        let cache_folder = match cache_folder {
            Some(folder) => folder,
            None => get_cache_dir().map_err(AerostatError::CacheDirResolution)?,
        };
        let mut client = Self::with_cache_folder(cache_folder).await?;
        if let Some(base) = api_base {
            client.api = ApiBase::new(base);
        }
        Ok(client)
    }

    /// Returns the full station list.
    ///
    /// Live fetch first; on success the station snapshot is refreshed in the
    /// background (a failed refresh is logged and swallowed). On fetch failure
    /// the snapshot is returned instead.
    ///
    /// # Errors
    ///
    /// [`AerostatError::NoData`] when the live fetch failed and no usable
    /// snapshot exists.
    pub async fn stations(&self) -> Result<Vec<Station>, AerostatError> {
        match self.fetcher.get::<Vec<Station>>(&self.api.stations()).await {
            Ok(stations) => {
                let store = self.store.clone();
                let snapshot = stations.clone();
                tokio::spawn(async move {
                    if let Err(e) = store.write_stations(&snapshot).await {
                        warn!("station snapshot refresh failed: {}", e);
                    }
                });
                Ok(stations)
            }
            Err(fetch) => {
                warn!("live station fetch failed, using snapshot: {}", fetch);
                match self.store.read_stations().await {
                    Ok(stations) => Ok(stations),
                    Err(cache) => Err(AerostatError::NoData {
                        resource: Resource::Stations,
                        fetch,
                        cache: Some(cache),
                    }),
                }
            }
        }
    }

    /// Returns the sensors installed at one station.
    ///
    /// On live success the station's entry in the sensor-index snapshot is
    /// refreshed in the background. On failure the lookup is scoped to the
    /// requested station id within the snapshot; a station absent from the
    /// index yields an empty list; an unmonitored station is a valid state,
    /// not an error.
    pub async fn sensors(&self, station_id: StationId) -> Result<Vec<Sensor>, AerostatError> {
        let url = self.api.sensors(station_id);
        match self.fetcher.get::<Vec<Sensor>>(&url).await {
            Ok(sensors) => {
                let store = self.store.clone();
                let snapshot = sensors.clone();
                tokio::spawn(async move {
                    refresh_sensor_entry(&store, station_id, snapshot).await;
                });
                Ok(sensors)
            }
            Err(fetch) => {
                warn!(
                    "live sensor fetch for station {} failed, using snapshot: {}",
                    station_id, fetch
                );
                match self.store.read_sensor_index().await {
                    Ok(index) => Ok(index.get(&station_id).cloned().unwrap_or_default()),
                    Err(cache) => Err(AerostatError::NoData {
                        resource: Resource::Sensors(station_id),
                        fetch,
                        cache: Some(cache),
                    }),
                }
            }
        }
    }

    /// Returns the measurement series of one sensor, stamped with the ids it
    /// was requested for.
    ///
    /// On live success the sensor's entry in the measurement archive is
    /// refreshed in the background. On failure the archive is scanned for the
    /// first entry with a matching sensor id (the archive is expected to be
    /// sensor-unique; duplicates are tolerated, first match wins).
    pub async fn measurements(
        &self,
        sensor_id: SensorId,
        station_id: StationId,
    ) -> Result<MeasurementSeries, AerostatError> {
        let url = self.api.measurements(sensor_id);
        match self.fetcher.get::<MeasurementPayload>(&url).await {
            Ok(payload) => {
                let series = payload.into_series(sensor_id, station_id);
                let store = self.store.clone();
                let snapshot = series.clone();
                tokio::spawn(async move {
                    refresh_archive_entry(&store, snapshot).await;
                });
                Ok(series)
            }
            Err(fetch) => {
                warn!(
                    "live measurement fetch for sensor {} failed, using snapshot: {}",
                    sensor_id, fetch
                );
                match self.store.read_measurement_archive().await {
                    Ok(archive) => archive
                        .into_iter()
                        .find(|series| series.sensor_id == sensor_id)
                        .ok_or(AerostatError::NoData {
                            resource: Resource::Measurements(sensor_id),
                            fetch,
                            cache: None,
                        }),
                    Err(cache) => Err(AerostatError::NoData {
                        resource: Resource::Measurements(sensor_id),
                        fetch,
                        cache: Some(cache),
                    }),
                }
            }
        }
    }

    /// Returns the aggregate air-quality index of a station, or `None` when
    /// the source has no current index or cannot be reached.
    ///
    /// The index is transient: there is no snapshot tier, and a failure never
    /// disturbs the rest of a station-detail view.
    pub async fn air_quality_index(&self, station_id: StationId) -> Option<AirQualityIndex> {
        let url = self.api.air_quality_index(station_id);
        match self.fetcher.get::<AirQualityIndex>(&url).await {
            Ok(index) if index.has_level() => Some(index),
            Ok(_) => {
                info!("no air-quality index for station {}", station_id);
                None
            }
            Err(e) => {
                warn!(
                    "air-quality index fetch for station {} failed: {}",
                    station_id, e
                );
                None
            }
        }
    }

    /// Kicks off the startup synchronization on a detached worker task and
    /// returns the event channel the caller's consumer loop should drain.
    ///
    /// The worker live-fetches the station list, announces it via
    /// [`SyncEvent::StationsRefreshed`], refreshes the station snapshot, runs
    /// the bulk synchronizer over every station and sensor, and finishes with
    /// [`SyncEvent::SyncCompleted`]. If the initial fetch fails the channel
    /// closes without events. Intended to be called once at startup; there is
    /// no guard against overlapping syncs beyond that convention.
    pub fn start_background_sync(&self) -> mpsc::UnboundedReceiver<SyncEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = self.clone();
        tokio::spawn(async move {
            let stations = match client
                .fetcher
                .get::<Vec<Station>>(&client.api.stations())
                .await
            {
                Ok(stations) => stations,
                Err(e) => {
                    warn!("background sync skipped, station fetch failed: {}", e);
                    return;
                }
            };
            let _ = tx.send(SyncEvent::StationsRefreshed(stations.clone()));

            if let Err(e) = client.store.write_stations(&stations).await {
                warn!("station snapshot refresh failed during sync: {}", e);
            }

            let sync = Synchronizer::new(&client.fetcher, &client.store, &client.api);
            match sync.run(&stations).await {
                Ok(report) => {
                    let _ = tx.send(SyncEvent::SyncCompleted(report));
                }
                Err(e) => warn!("background sync aborted: {}", e),
            }
        });
        rx
    }
}

/// Read-modify-write of one station's entry in the sensor index. A missing or
/// corrupt index counts as empty; refresh failures are logged and swallowed.
///
/// Not serialized against a running bulk sync: if the sync's wholesale write
/// lands between this read and this write, the fresher index loses entries
/// until the next sync. Readers still only ever see complete documents.
async fn refresh_sensor_entry(store: &CacheStore, station_id: StationId, sensors: Vec<Sensor>) {
    let mut index = match store.read_sensor_index().await {
        Ok(index) => index,
        Err(CacheError::NotFound(_)) | Err(CacheError::Corrupt(..)) => SensorIndex::new(),
        Err(e) => {
            warn!("sensor index refresh skipped: {}", e);
            return;
        }
    };
    index.insert(station_id, sensors);
    if let Err(e) = store.write_sensor_index(&index).await {
        warn!("sensor index refresh failed: {}", e);
    }
}

/// Replaces one sensor's entry in the measurement archive. Carries the same
/// lost-update window against a concurrent bulk sync as the sensor index
/// refresh; the next sync restores the full archive.
async fn refresh_archive_entry(store: &CacheStore, series: MeasurementSeries) {
    let mut archive = match store.read_measurement_archive().await {
        Ok(archive) => archive,
        Err(CacheError::NotFound(_)) | Err(CacheError::Corrupt(..)) => Vec::new(),
        Err(e) => {
            warn!("measurement archive refresh skipped: {}", e);
            return;
        }
    };
    archive.retain(|entry| entry.sensor_id != series.sensor_id);
    archive.push(series);
    if let Err(e) = store.write_measurement_archive(&archive).await {
        warn!("measurement archive refresh failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::measurement::Reading;
    use crate::types::sensor::Param;

    // Port 9 (discard) refuses connections immediately; every live fetch
    // fails with a transport error and the client must fall back.
    const DEAD_API: &str = "http://127.0.0.1:9";

    async fn offline_client(dir: &std::path::Path) -> Aerostat {
        Aerostat::with_options()
            .cache_folder(dir.to_path_buf())
            .api_base(DEAD_API.to_string())
            .call()
            .await
            .unwrap()
    }

    fn station(id: StationId, name: &str) -> Station {
        Station {
            id,
            station_name: name.to_string(),
            gegr_lat: "51.0".into(),
            gegr_lon: "17.0".into(),
            address_street: None,
            city: None,
        }
    }

    fn sensor(id: SensorId, station_id: StationId) -> Sensor {
        Sensor {
            id,
            station_id,
            param: Param {
                param_name: "pył zawieszony PM10".into(),
                param_formula: "PM10".into(),
                param_code: "PM10".into(),
                id_param: 3,
            },
        }
    }

    fn series(sensor_id: SensorId, station_id: StationId) -> MeasurementSeries {
        MeasurementSeries {
            sensor_id,
            station_id,
            key: Some("PM10".into()),
            values: vec![Reading {
                date: "2024-05-12 14:00:00".into(),
                value: Some(21.3),
            }],
        }
    }

    #[tokio::test]
    async fn stations_fall_back_to_snapshot_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let client = offline_client(dir.path()).await;

        let cached = vec![station(14, "Działoszyn"), station(117, "Bartnicza")];
        CacheStore::new(dir.path())
            .write_stations(&cached)
            .await
            .unwrap();

        let result = client.stations().await.unwrap();
        assert_eq!(result, cached);
    }

    #[tokio::test]
    async fn stations_without_network_or_snapshot_is_explicit_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let client = offline_client(dir.path()).await;

        let err = client.stations().await.unwrap_err();
        match err {
            AerostatError::NoData {
                resource, cache, ..
            } => {
                assert_eq!(resource, Resource::Stations);
                assert!(matches!(cache, Some(CacheError::NotFound(_))));
            }
            other => panic!("expected NoData, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sensors_fall_back_to_station_scoped_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let client = offline_client(dir.path()).await;

        let mut index = SensorIndex::new();
        index.insert(5, vec![sensor(50, 5)]);
        CacheStore::new(dir.path())
            .write_sensor_index(&index)
            .await
            .unwrap();

        let sensors = client.sensors(5).await.unwrap();
        assert_eq!(sensors.len(), 1);
        assert_eq!(sensors[0].id, 50);
    }

    #[tokio::test]
    async fn unknown_station_in_snapshot_is_empty_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let client = offline_client(dir.path()).await;

        let mut index = SensorIndex::new();
        index.insert(5, vec![sensor(50, 5)]);
        CacheStore::new(dir.path())
            .write_sensor_index(&index)
            .await
            .unwrap();

        let sensors = client.sensors(9).await.unwrap();
        assert!(sensors.is_empty());
    }

    #[tokio::test]
    async fn sensors_without_snapshot_is_no_data_for_that_station() {
        let dir = tempfile::tempdir().unwrap();
        let client = offline_client(dir.path()).await;

        let err = client.sensors(5).await.unwrap_err();
        assert!(matches!(
            err,
            AerostatError::NoData {
                resource: Resource::Sensors(5),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn measurements_fall_back_to_archive_scan() {
        let dir = tempfile::tempdir().unwrap();
        let client = offline_client(dir.path()).await;

        CacheStore::new(dir.path())
            .write_measurement_archive(&[series(660, 114), series(661, 114)])
            .await
            .unwrap();

        let found = client.measurements(661, 114).await.unwrap();
        assert_eq!(found.sensor_id, 661);
        assert_eq!(found.values.len(), 1);
    }

    #[tokio::test]
    async fn measurements_missing_from_archive_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let client = offline_client(dir.path()).await;

        CacheStore::new(dir.path())
            .write_measurement_archive(&[series(660, 114)])
            .await
            .unwrap();

        let err = client.measurements(999, 114).await.unwrap_err();
        assert!(matches!(
            err,
            AerostatError::NoData {
                resource: Resource::Measurements(999),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn air_quality_index_degrades_to_none_offline() {
        let dir = tempfile::tempdir().unwrap();
        let client = offline_client(dir.path()).await;
        assert!(client.air_quality_index(117).await.is_none());
    }

    #[tokio::test]
    async fn offline_background_sync_closes_channel_without_events() {
        let dir = tempfile::tempdir().unwrap();
        let client = offline_client(dir.path()).await;

        let mut rx = client.start_background_sync();
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn sensor_entry_refresh_creates_and_updates_the_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());

        refresh_sensor_entry(&store, 5, vec![sensor(50, 5)]).await;
        refresh_sensor_entry(&store, 7, vec![sensor(70, 7)]).await;
        refresh_sensor_entry(&store, 5, vec![sensor(50, 5), sensor(51, 5)]).await;

        let index = store.read_sensor_index().await.unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index[&5].len(), 2);
        assert_eq!(index[&7].len(), 1);
    }

    #[tokio::test]
    async fn archive_refresh_replaces_the_sensor_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());

        refresh_archive_entry(&store, series(660, 114)).await;
        let mut updated = series(660, 114);
        updated.values[0].value = Some(30.0);
        refresh_archive_entry(&store, updated.clone()).await;
        refresh_archive_entry(&store, series(661, 114)).await;

        let archive = store.read_measurement_archive().await.unwrap();
        assert_eq!(archive.len(), 2);
        let entry = archive.iter().find(|s| s.sensor_id == 660).unwrap();
        assert_eq!(entry.values[0].value, Some(30.0));
    }
}
