//! LLM Client — every call to a text-generation provider goes through here.
//!
//! Handlers only see `Arc<dyn TextGenerator>`; the concrete backend (Gemini or OpenAI)
//! is picked once at startup from `AI_SERVICE`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::config::{AiService, Config};

pub mod gemini;
pub mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_RETRIES: u32 = 3;

/// Substrings that mark a provider error as "this model can't serve you, try another".
const MODEL_UNAVAILABLE_MARKERS: [&str; 3] = ["not found", "unsupported", "permission"];

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{backend} API key is not configured")]
    MissingApiKey { backend: &'static str },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("No models configured")]
    NoModels,
}

impl LlmError {
    /// True when the failure is specific to the requested model (unknown, not enabled
    /// for this key, unsupported method) so the next model in the list may still work.
    pub fn is_model_unavailable(&self) -> bool {
        if let LlmError::Api { status, .. } = self {
            if matches!(*status, 403 | 404) {
                return true;
            }
        }
        if matches!(self, LlmError::MissingApiKey { .. } | LlmError::NoModels) {
            return false;
        }
        let message = self.to_string().to_lowercase();
        MODEL_UNAVAILABLE_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
    }
}

/// A text-generation backend. Implement this to add a provider without touching
/// the handlers.
///
/// Carried in `AppState` as `Arc<dyn TextGenerator>`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends `prompt` as a single user turn and returns the raw reply text.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Short backend name for logs and the health endpoint.
    fn backend(&self) -> &'static str;
}

/// Transient-failure retry settings shared by every backend.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        // Exponential backoff: base, 2*base, 4*base...
        self.base_delay * (1u32 << (attempt - 1).min(16))
    }
}

/// Shape shared by Gemini and OpenAI error bodies: `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

fn error_message(body: String) -> String {
    serde_json::from_str::<ProviderError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// Sends the request built by `build`, retrying on transport errors, 429 and 5xx.
/// Any other non-success status is returned immediately as `LlmError::Api`.
/// At least one request is always sent, even when `max_attempts` is zero.
pub(crate) async fn send_with_retry<F>(build: F, policy: &RetryPolicy) -> Result<Response, LlmError>
where
    F: Fn() -> RequestBuilder,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let error = match build().send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }

                let body = response.text().await.unwrap_or_default();
                let error = LlmError::Api {
                    status: status.as_u16(),
                    message: error_message(body),
                };
                if status != StatusCode::TOO_MANY_REQUESTS && !status.is_server_error() {
                    return Err(error);
                }
                warn!("LLM API returned {}: {}", status, error);
                error
            }
            Err(e) => LlmError::Http(e),
        };

        if attempt >= max_attempts {
            return Err(error);
        }

        let delay = policy.delay_for(attempt);
        warn!(
            "LLM call attempt {} failed, retrying after {}ms...",
            attempt,
            delay.as_millis()
        );
        tokio::time::sleep(delay).await;
    }
}

pub fn http_client() -> Result<Client, LlmError> {
    Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

/// Builds the backend selected by `AI_SERVICE`.
pub fn build_generator(config: &Config) -> Result<Arc<dyn TextGenerator>, LlmError> {
    let http = http_client()?;
    let generator: Arc<dyn TextGenerator> = match config.ai_service {
        AiService::Gemini => Arc::new(GeminiClient::new(
            http,
            config.gemini_api_key.clone(),
            config.gemini_api_base.clone(),
            config.gemini_models(),
        )),
        AiService::OpenAi => Arc::new(OpenAiClient::new(
            http,
            config.openai_api_key.clone(),
            config.openai_api_base.clone(),
            config.openai_model.clone(),
        )),
    };
    Ok(generator)
}
