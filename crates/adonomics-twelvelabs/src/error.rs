use thiserror::Error;

/// Errors returned by the `TwelveLabs` API client.
#[derive(Debug, Error)]
pub enum TwelveLabsError {
    /// API key or index id missing or blank.
    #[error("TwelveLabs is not configured: {0}")]
    Configuration(String),

    /// Caller input rejected before any request was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("TwelveLabs API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl TwelveLabsError {
    /// Returns `true` for failures worth retrying on the next poll.
    ///
    /// Timeouts, connection failures, rate limiting, and 5xx responses are
    /// transient. Configuration, validation, other 4xx, and malformed bodies
    /// are not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            TwelveLabsError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            TwelveLabsError::Api { status, .. } => *status == 429 || *status >= 500,
            TwelveLabsError::Configuration(_)
            | TwelveLabsError::InvalidRequest(_)
            | TwelveLabsError::Deserialize { .. } => false,
        }
    }

    /// Returns `true` when the provider refused because the video has not
    /// finished indexing yet.
    #[must_use]
    pub fn is_not_ready(&self) -> bool {
        match self {
            TwelveLabsError::Api { code, message, .. } => {
                code.as_deref() == Some("video_not_ready")
                    || message.to_lowercase().contains("still indexing")
                    || message.to_lowercase().contains("not ready")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, code: Option<&str>, message: &str) -> TwelveLabsError {
        TwelveLabsError::Api {
            status,
            code: code.map(str::to_string),
            message: message.to_string(),
        }
    }

    #[test]
    fn server_errors_and_rate_limits_are_transient() {
        assert!(api(503, None, "unavailable").is_transient());
        assert!(api(429, Some("too_many_requests"), "slow down").is_transient());
    }

    #[test]
    fn client_errors_are_not_transient() {
        assert!(!api(400, Some("parameter_invalid"), "bad").is_transient());
        assert!(!TwelveLabsError::Configuration("no key".into()).is_transient());
        assert!(!TwelveLabsError::InvalidRequest("no prompt".into()).is_transient());
    }

    #[test]
    fn not_ready_is_recognized_by_code_or_message() {
        assert!(api(400, Some("video_not_ready"), "The video is not ready").is_not_ready());
        assert!(api(400, None, "Video is still indexing").is_not_ready());
        assert!(!api(400, Some("parameter_invalid"), "bad video_id").is_not_ready());
        assert!(!TwelveLabsError::InvalidRequest("x".into()).is_not_ready());
    }
}
