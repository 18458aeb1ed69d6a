//! Gemini `generateContent` client
//!
//! Implements [`ChatClient`] over the Gemini REST API. Retryable failures
//! (transport, timeout, 429, 5xx) get up to `max_retries` extra attempts with
//! exponential backoff; everything else fails on the first attempt.

use async_trait::async_trait;
use roundtable_core::{ChatClient, ChatRequest, ReplyError};
use tracing::{debug, info, warn};

use crate::config::GeminiConfig;
use crate::error::GeminiError;
use crate::wire::{status_error, GenerateContentRequest, GenerateContentResponse};

const USER_AGENT: &str = concat!("roundtable-gemini/", env!("CARGO_PKG_VERSION"));

/// Gemini client; cheap to share behind an `Arc` across participants.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http_client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new client. Fails when the API key is blank.
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        if config.api_key.trim().is_empty() {
            return Err(GeminiError::MissingApiKey);
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GeminiError::ClientBuild(e.to_string()))?;

        Ok(GeminiClient {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Send `request`, retrying retryable failures.
    pub async fn generate(&self, request: &ChatRequest) -> Result<String, GeminiError> {
        let body = GenerateContentRequest::from_chat(request, self.config.temperature);
        let max_attempts = self.config.max_retries + 1;

        let mut attempt = 1;
        loop {
            match self.send_once(&body).await {
                Ok(text) => {
                    debug!(attempt, chars = text.chars().count(), "gemini reply received");
                    return Ok(text);
                }
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let delay = self.config.backoff(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "gemini request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(attempt, error = %err, "gemini request failed");
                    return Err(err);
                }
            }
        }
    }

    async fn send_once(&self, body: &GenerateContentRequest) -> Result<String, GeminiError> {
        let url = self.config.endpoint();
        info!(model = %self.config.model, contents = body.contents.len(), "calling gemini");

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.map_err(|e| {
                if e.is_timeout() {
                    self.transport_error(e)
                } else {
                    GeminiError::Transport(format!("failed to read error body: {e}"))
                }
            })?;
            return Err(status_error(status.as_u16(), &text));
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(|e| self.transport_error(e))?;
        parsed.into_text()
    }

    fn transport_error(&self, err: reqwest::Error) -> GeminiError {
        if err.is_timeout() {
            GeminiError::Timeout(self.config.request_timeout.as_millis() as u64)
        } else {
            GeminiError::from(err)
        }
    }
}

#[async_trait]
impl ChatClient for GeminiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ReplyError> {
        self.generate(request).await.map_err(ReplyError::from)
    }
}
