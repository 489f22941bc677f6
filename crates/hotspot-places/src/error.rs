use thiserror::Error;

/// Errors returned by the external place-data clients.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned a non-success status in its JSON envelope.
    #[error("provider API error: {0}")]
    Api(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The provider returned an unexpected HTTP status code.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// Every configured mirror endpoint failed for the same query.
    #[error("all {attempted} mirror endpoints failed; last error: {last_error}")]
    AllEndpointsFailed {
        attempted: usize,
        last_error: String,
    },

    /// The provider returned an empty response body.
    #[error("empty response from {0}")]
    EmptyResponse(String),
}
