use thiserror::Error;

/// Failures of a single GET-and-decode round trip.
///
/// Transport-level failures (connection, DNS, status, body read) are kept
/// distinct from a body that arrived but could not be decoded into the
/// expected shape. Callers fall back to cached data on either, but surface
/// different messages.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network request failed for {0}")]
    Transport(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("response body for {0} was not the expected JSON shape")]
    Malformed(String, #[source] serde_json::Error),
}

impl FetchError {
    /// True for failures that never produced a usable body.
    pub fn is_transport(&self) -> bool {
        !matches!(self, FetchError::Malformed(..))
    }
}
