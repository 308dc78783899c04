//! HTTP+JSON fetcher: one blocking-style GET per call, body decoded straight
//! into a typed shape. No retries, no timeouts, no file I/O; resilience policy
//! lives in the caller.

pub mod error;

use crate::fetch::error::FetchError;
use log::{info, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::types::sensor::SensorId;
use crate::types::station::StationId;

const DEFAULT_API_BASE: &str = "https://api.gios.gov.pl/pjp-api/rest";

/// Abstraction over "GET this URL and decode the JSON body".
///
/// Implemented by [`Fetcher`] for real network access; tests implement it with
/// canned per-URL responses to drive failure paths deterministically.
pub trait FetchJson {
    fn get<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<T, FetchError>> + Send;
}

/// The real HTTP fetcher, sharing one connection pool across requests.
#[derive(Debug, Clone, Default)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl FetchJson for Fetcher {
    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        info!("fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    FetchError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    FetchError::Transport(url.to_string(), e)
                });
            }
        };

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(url.to_string(), e))?;

        serde_json::from_slice::<T>(&body)
            .map_err(|e| FetchError::Malformed(url.to_string(), e))
    }
}

/// Builds the four resource URLs against a configurable base.
#[derive(Debug, Clone)]
pub struct ApiBase {
    base: String,
}

impl Default for ApiBase {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl ApiBase {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    pub fn stations(&self) -> String {
        format!("{}/station/findAll", self.base)
    }

    pub fn sensors(&self, station_id: StationId) -> String {
        format!("{}/station/sensors/{}", self.base, station_id)
    }

    pub fn measurements(&self, sensor_id: SensorId) -> String {
        format!("{}/data/getData/{}", self.base, sensor_id)
    }

    pub fn air_quality_index(&self, station_id: StationId) -> String {
        format!("{}/aqindex/getIndex/{}", self.base, station_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_base_builds_resource_urls() {
        let api = ApiBase::default();
        assert_eq!(
            api.stations(),
            "https://api.gios.gov.pl/pjp-api/rest/station/findAll"
        );
        assert_eq!(
            api.sensors(14),
            "https://api.gios.gov.pl/pjp-api/rest/station/sensors/14"
        );
        assert_eq!(
            api.measurements(660),
            "https://api.gios.gov.pl/pjp-api/rest/data/getData/660"
        );
        assert_eq!(
            api.air_quality_index(14),
            "https://api.gios.gov.pl/pjp-api/rest/aqindex/getIndex/14"
        );
    }

    #[test]
    fn api_base_strips_trailing_slash() {
        let api = ApiBase::new("http://127.0.0.1:9/");
        assert_eq!(api.stations(), "http://127.0.0.1:9/station/findAll");
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let fetcher = Fetcher::new();
        // Port 9 (discard) is closed; the connection is refused immediately.
        let err = fetcher
            .get::<Vec<i64>>("http://127.0.0.1:9/station/findAll")
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
