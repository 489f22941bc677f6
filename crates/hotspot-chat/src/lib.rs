//! Conversational location advice.
//!
//! Answers free-text questions about an analyzed location. When a completion
//! backend is configured the analysis payload is embedded in the prompt so
//! answers cite measured numbers; without one (or when the backend fails)
//! a keyword-routed template answer is generated from the same data.

pub mod client;
pub mod error;
pub mod prompt;
pub mod template;

use serde::Serialize;
use serde_json::Value;

pub use client::CompletionClient;
pub use error::ChatError;
pub use prompt::generate_context_prompt;
pub use template::template_response;

/// A chat answer with provenance flags.
#[derive(Debug, Clone, Serialize)]
pub struct ChatAnswer {
    pub response: String,
    pub data_sources: Vec<&'static str>,
    pub ai_powered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

const DATA_SOURCES: [&str; 3] = ["poi", "landmarks", "competitors"];

/// Answers a question about a location.
///
/// With a configured client the analysis data is folded into a prompt and
/// the model's reply returned. Backend failures degrade to the template
/// answer with the `error` field set, so the endpoint never fails just
/// because the model is unreachable.
pub async fn answer_question(
    client: Option<&CompletionClient>,
    message: &str,
    analysis_data: Option<&Value>,
) -> ChatAnswer {
    let Some(client) = client else {
        return ChatAnswer {
            response: template_response(message, analysis_data),
            data_sources: DATA_SOURCES.to_vec(),
            ai_powered: false,
            error: None,
        };
    };

    let prompt =
        generate_context_prompt(analysis_data.unwrap_or(&Value::Null), message);

    match client.complete(&prompt).await {
        Ok(response) => ChatAnswer {
            response,
            data_sources: DATA_SOURCES.to_vec(),
            ai_powered: true,
            error: None,
        },
        Err(err) => {
            tracing::warn!(error = %err, "completion backend failed, using template answer");
            ChatAnswer {
                response: template_response(message, analysis_data),
                data_sources: DATA_SOURCES.to_vec(),
                ai_powered: false,
                error: Some("AI service temporarily unavailable".to_owned()),
            }
        }
    }
}
