//! Sensor ("measurement position") records: one measured parameter at one
//! station, as reported by the `station/sensors/{stationId}` endpoint.

use crate::types::station::StationId;
use serde::{Deserialize, Serialize};

/// Unique identifier of a sensor.
pub type SensorId = i64;

/// A single measured parameter (e.g., PM10) installed at a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    /// The unique sensor identifier (e.g., 660).
    pub id: SensorId,
    /// The station this sensor belongs to.
    pub station_id: StationId,
    /// The parameter measured by this sensor.
    pub param: Param,
}

/// Description of a measured parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    /// Full parameter name (e.g., "pył zawieszony PM10").
    pub param_name: String,
    /// Chemical formula or short symbol (e.g., "PM10").
    pub param_formula: String,
    /// Source-side parameter code.
    pub param_code: String,
    /// Source-side numeric parameter id.
    pub id_param: i64,
}
