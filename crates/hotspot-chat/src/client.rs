//! Client for an OpenAI-compatible chat completion API.

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use serde_json::json;

use crate::error::ChatError;
use crate::prompt::SYSTEM_INSTRUCTIONS;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/";

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f64 = 0.7;

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Client for the chat completions endpoint of an OpenAI-compatible API.
pub struct CompletionClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: Url,
}

impl CompletionClient {
    /// Creates a client pointed at the production OpenAI API.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, ChatError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ChatError::Api`] if `base_url` is not a
    /// valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("hotspot-iq/0.1 (location-intelligence)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| ChatError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
        })
    }

    /// Requests a completion for `prompt` and returns the assistant's text.
    ///
    /// # Errors
    ///
    /// - [`ChatError::Api`] on a non-2xx response.
    /// - [`ChatError::Http`] on network failure.
    /// - [`ChatError::Deserialize`] if the response does not match the
    ///   expected shape.
    /// - [`ChatError::EmptyCompletion`] when the API returns no choices.
    pub async fn complete(&self, prompt: &str) -> Result<String, ChatError> {
        let url = self
            .base_url
            .join("v1/chat/completions")
            .map_err(|e| ChatError::Api(format!("invalid completions URL: {e}")))?;

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTIONS },
                { "role": "user", "content": prompt }
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE
        });

        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ChatError::Api(format!(
                "completion request failed with status {status}: {text}"
            )));
        }

        let parsed: CompletionResponse =
            serde_json::from_str(&text).map_err(|e| ChatError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ChatError::EmptyCompletion)
    }
}
