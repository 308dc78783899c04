//! Aggregate air-quality index for a station (`aqindex/getIndex/{stationId}`).
//! Transient data: fetched live for display, never cached.

use crate::types::station::StationId;
use serde::{Deserialize, Serialize};

/// The aggregate air-quality index the source computes for a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityIndex {
    /// Station id the index was computed for.
    pub id: StationId,
    /// When the index was calculated.
    #[serde(default)]
    pub st_calc_date: Option<String>,
    /// Overall severity level. `None` when the source has no current index.
    #[serde(default)]
    pub st_index_level: Option<IndexLevel>,
    /// Timestamp of the source data the index was derived from.
    #[serde(default)]
    pub st_source_data_date: Option<String>,
}

impl AirQualityIndex {
    /// Whether the index carries a usable severity level.
    pub fn has_level(&self) -> bool {
        self.st_index_level.is_some()
    }
}

/// One severity level of the index scale (0 = very good … 5 = very bad).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexLevel {
    pub id: i64,
    pub index_level_name: String,
}
