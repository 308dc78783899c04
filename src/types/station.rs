//! Defines the data structures representing air-quality monitoring stations
//! as reported by the GIOS `station/findAll` endpoint, including their
//! administrative location metadata.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Unique identifier of a monitoring station.
pub type StationId = i64;

/// A single air-quality monitoring station and its location metadata.
///
/// Mirrors one element of the station-list endpoint. Latitude and longitude
/// arrive as strings in current API responses but have historically been
/// numbers; both shapes are accepted and normalized to `String`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// The unique station identifier (e.g., 117).
    pub id: StationId,
    /// Human-readable station name (e.g., "Wrocław - Bartnicza").
    pub station_name: String,
    /// Latitude in decimal degrees, as provided by the source.
    #[serde(deserialize_with = "de_coordinate", serialize_with = "ser_coordinate")]
    pub gegr_lat: String,
    /// Longitude in decimal degrees, as provided by the source.
    #[serde(deserialize_with = "de_coordinate", serialize_with = "ser_coordinate")]
    pub gegr_lon: String,
    /// Street address, when the source knows it.
    #[serde(default)]
    pub address_street: Option<String>,
    /// The city or town hosting the station, when known.
    #[serde(default)]
    pub city: Option<City>,
}

/// The city a station belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub id: i64,
    pub name: String,
    /// Administrative division details, when known.
    #[serde(default)]
    pub commune: Option<Commune>,
}

/// Administrative division (commune / district / province) of a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commune {
    pub commune_name: String,
    pub district_name: String,
    pub province_name: String,
}

/// Accepts a coordinate encoded either as a JSON string or as a number.
fn de_coordinate<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Coordinate {
        Text(String),
        Number(f64),
    }

    Ok(match Coordinate::deserialize(deserializer)? {
        Coordinate::Text(s) => s,
        Coordinate::Number(n) => n.to_string(),
    })
}

fn ser_coordinate<S>(value: &str, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value)
}
