use thiserror::Error;

#[derive(Debug, Error)]
pub enum GroqError {
    #[error("Groq is not configured: {0}")]
    Configuration(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; `message` comes from the OpenAI-style error envelope
    /// when one is present.
    #[error("Groq API error ({status}): {message}")]
    Api {
        status: u16,
        kind: Option<String>,
        message: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl GroqError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, GroqError::Http(e) if e.is_timeout())
    }
}
