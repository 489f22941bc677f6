use thiserror::Error;

/// Errors returned by the chat completion client.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The completion API returned an error status or body.
    #[error("chat API error: {0}")]
    Api(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The completion returned no choices.
    #[error("chat completion returned no choices")]
    EmptyCompletion,
}
