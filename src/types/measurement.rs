//! Measurement series: time-stamped readings for one sensor, both in the live
//! wire shape (`data/getData/{sensorId}`) and in the archived shape stamped
//! with sensor and station ids.
//!
//! Null readings mark a sensor that was offline at that hour. They are kept
//! verbatim when a series is re-serialized to disk, and only dropped when the
//! series is projected into plottable points.

use crate::types::sensor::SensorId;
use crate::types::station::StationId;
use serde::{Deserialize, Serialize};

/// One timestamped reading. `value` is `None` when the sensor was offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Source timestamp, e.g. "2024-05-12 14:00:00". Kept as an opaque string.
    pub date: String,
    pub value: Option<f64>,
}

/// The live wire shape of a measurement response: parameter key plus readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPayload {
    /// Parameter symbol the source attaches to the series (e.g., "PM10").
    #[serde(default)]
    pub key: Option<String>,
    pub values: Vec<Reading>,
}

impl MeasurementPayload {
    /// Stamps the payload with the ids it was fetched for, producing the
    /// archive shape.
    pub fn into_series(self, sensor_id: SensorId, station_id: StationId) -> MeasurementSeries {
        MeasurementSeries {
            sensor_id,
            station_id,
            key: self.key,
            values: self.values,
        }
    }
}

/// An archived measurement series for one sensor at one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementSeries {
    pub sensor_id: SensorId,
    pub station_id: StationId,
    /// Parameter symbol carried over from the wire payload, when present.
    #[serde(default)]
    pub key: Option<String>,
    pub values: Vec<Reading>,
}

impl MeasurementSeries {
    /// Returns the plottable points of this series: null readings removed,
    /// remaining points sorted ascending by timestamp.
    ///
    /// The source returns readings newest-first; plots use chronological
    /// order. Timestamps follow a fixed "YYYY-MM-DD hh:mm:ss" layout, so a
    /// lexicographic sort is a chronological sort.
    pub fn plot_points(&self) -> Vec<PlotPoint> {
        let mut points: Vec<PlotPoint> = self
            .values
            .iter()
            .filter_map(|reading| {
                reading.value.map(|value| PlotPoint {
                    timestamp: reading.date.clone(),
                    value,
                })
            })
            .collect();
        points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        points
    }
}

/// A derived, non-null point ready for chart projection.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPoint {
    pub timestamp: String,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: Vec<Reading>) -> MeasurementSeries {
        MeasurementSeries {
            sensor_id: 660,
            station_id: 114,
            key: Some("PM10".into()),
            values,
        }
    }

    #[test]
    fn null_reading_is_excluded_from_plot_points() {
        let s = series(vec![
            Reading {
                date: "2024-05-12 15:00:00".into(),
                value: None,
            },
            Reading {
                date: "2024-05-12 14:00:00".into(),
                value: Some(3.5),
            },
        ]);

        let points = s.plot_points();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].timestamp, "2024-05-12 14:00:00");
        assert_eq!(points[0].value, 3.5);
    }

    #[test]
    fn null_reading_survives_reserialization() {
        let s = series(vec![Reading {
            date: "2024-05-12 15:00:00".into(),
            value: None,
        }]);

        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains(r#""value":null"#));
        let back: MeasurementSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn plot_points_are_sorted_chronologically() {
        // Newest-first input, the order the source actually serves.
        let s = series(vec![
            Reading {
                date: "2024-05-12 16:00:00".into(),
                value: Some(9.0),
            },
            Reading {
                date: "2024-05-12 14:00:00".into(),
                value: Some(7.0),
            },
            Reading {
                date: "2024-05-12 15:00:00".into(),
                value: Some(8.0),
            },
        ]);

        let points = s.plot_points();
        let stamps: Vec<&str> = points.iter().map(|p| p.timestamp.as_str()).collect();
        assert_eq!(
            stamps,
            [
                "2024-05-12 14:00:00",
                "2024-05-12 15:00:00",
                "2024-05-12 16:00:00"
            ]
        );
    }

    #[test]
    fn payload_stamping_keeps_readings() {
        let payload: MeasurementPayload = serde_json::from_str(
            r#"{"key":"PM10","values":[{"date":"2024-05-12 14:00:00","value":21.3}]}"#,
        )
        .unwrap();
        let series = payload.into_series(660, 114);
        assert_eq!(series.sensor_id, 660);
        assert_eq!(series.station_id, 114);
        assert_eq!(series.values.len(), 1);
    }
}
