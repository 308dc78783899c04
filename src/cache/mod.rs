//! Local snapshot store: the last-known-good copy of each remote resource as a
//! pretty-printed JSON document on disk.
//!
//! Three fixed documents, matching the remote resource kinds:
//! `stations.json` (array of stations), `sensors.json` (object mapping
//! station-id string to its sensor array) and `data.json` (array of
//! measurement series stamped with sensor/station ids).
//!
//! Writes are all-or-nothing: the full document is serialized in memory, then
//! written to a temporary file in the same directory and renamed over the
//! target, so a concurrent reader observes either the prior or the new
//! complete version, never a truncated one.

pub mod error;

use crate::cache::error::CacheError;
use crate::types::measurement::MeasurementSeries;
use crate::types::sensor::Sensor;
use crate::types::station::{Station, StationId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::{fs, task};

const STATIONS_FILE: &str = "stations.json";
const SENSORS_FILE: &str = "sensors.json";
const MEASUREMENTS_FILE: &str = "data.json";

/// Sensor lists keyed by station id. Serialized with stringified integer keys,
/// which is exactly the on-disk object layout; `BTreeMap` keeps the file
/// deterministic between runs.
pub type SensorIndex = BTreeMap<StationId, Vec<Sensor>>;

#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub async fn read_stations(&self) -> Result<Vec<Station>, CacheError> {
        self.read_doc(STATIONS_FILE).await
    }

    pub async fn write_stations(&self, stations: &[Station]) -> Result<(), CacheError> {
        self.write_doc(STATIONS_FILE, &stations).await
    }

    pub async fn read_sensor_index(&self) -> Result<SensorIndex, CacheError> {
        self.read_doc(SENSORS_FILE).await
    }

    pub async fn write_sensor_index(&self, index: &SensorIndex) -> Result<(), CacheError> {
        self.write_doc(SENSORS_FILE, index).await
    }

    pub async fn read_measurement_archive(&self) -> Result<Vec<MeasurementSeries>, CacheError> {
        self.read_doc(MEASUREMENTS_FILE).await
    }

    pub async fn write_measurement_archive(
        &self,
        archive: &[MeasurementSeries],
    ) -> Result<(), CacheError> {
        self.write_doc(MEASUREMENTS_FILE, &archive).await
    }

    async fn read_doc<T: DeserializeOwned>(&self, name: &str) -> Result<T, CacheError> {
        let path = self.dir.join(name);
        let bytes = fs::read(&path).await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                CacheError::NotFound(path.clone())
            } else {
                CacheError::Read(path.clone(), e)
            }
        })?;
        serde_json::from_slice(&bytes).map_err(|e| CacheError::Corrupt(path, e))
    }

    async fn write_doc<T: Serialize>(&self, name: &str, value: &T) -> Result<(), CacheError> {
        let path = self.dir.join(name);
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| CacheError::WriteFailed(path.clone(), io::Error::other(e)))?;

        let dir = self.dir.clone();
        task::spawn_blocking(move || {
            let mut tmp = NamedTempFile::new_in(&dir)
                .map_err(|e| CacheError::WriteFailed(path.clone(), e))?;
            tmp.write_all(&bytes)
                .map_err(|e| CacheError::WriteFailed(path.clone(), e))?;
            tmp.persist(&path)
                .map_err(|e| CacheError::WriteFailed(path, e.error))?;
            Ok::<(), CacheError>(())
        })
        .await??;
        Ok(())
    }
}
