//! HTTP client for the Groq chat-completions endpoint.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::GroqError;
use crate::types::{ChatRequest, ChatResponse, ErrorEnvelope};

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1/";

/// Client for an OpenAI-compatible chat-completions API.
pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl std::fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqClient")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl GroqClient {
    /// # Errors
    ///
    /// Returns [`GroqError::Configuration`] if `api_key` is blank, or
    /// [`GroqError::Http`] if the `reqwest::Client` cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, GroqError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GroqError::Configuration`] if `api_key` is blank or
    /// `base_url` does not parse, or [`GroqError::Http`] if the
    /// `reqwest::Client` cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GroqError> {
        if api_key.trim().is_empty() {
            return Err(GroqError::Configuration("GROQ_API_KEY is not set".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("adonomics/0.1 (ad-analysis)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| GroqError::Configuration(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Sends one non-streaming chat completion.
    ///
    /// # Errors
    ///
    /// - [`GroqError::Http`] on network failure or timeout.
    /// - [`GroqError::Api`] on a non-2xx status.
    /// - [`GroqError::Deserialize`] if the body is not a chat completion.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, GroqError> {
        let url = self
            .base_url
            .join("chat/completions")
            .map_err(|e| GroqError::Configuration(format!("invalid endpoint: {e}")))?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let (kind, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => (envelope.error.kind, envelope.error.message),
                Err(_) => (None, status.to_string()),
            };
            return Err(GroqError::Api {
                status: status.as_u16(),
                kind,
                message,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| GroqError::Deserialize {
                context: format!("chat completion ({})", request.model),
                source: e,
            })?;

        if let Some(usage) = parsed.usage {
            tracing::debug!(
                model = %parsed.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "groq: chat completion finished"
            );
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_key_is_rejected() {
        let err = GroqClient::new("", 30).expect_err("blank key must fail");
        assert!(matches!(err, GroqError::Configuration(_)));
    }

    #[test]
    fn debug_redacts_key() {
        let client = GroqClient::with_base_url("gsk_secret", 30, "http://localhost/openai/v1")
            .expect("client");
        assert!(!format!("{client:?}").contains("gsk_secret"));
    }
}
