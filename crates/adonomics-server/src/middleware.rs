use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

const API_KEYS_VAR: &str = "ADONOMICS_API_KEYS";
const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Debug)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window request limit shared by every protected route, checked
/// ahead of bearer auth.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    /// `max_requests == 0` turns limiting off.
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(RateLimitWindow {
                started_at: Instant::now(),
                count: 0,
            })),
        }
    }

    #[must_use]
    pub fn from_config(config: &adonomics_core::AppConfig) -> Self {
        Self::new(
            config.rate_limit_requests,
            Duration::from_secs(config.rate_limit_window_secs),
        )
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Counts one request; `false` once the current window is spent.
    async fn admit(&self) -> bool {
        if self.max_requests == 0 {
            return true;
        }
        let mut window = self.state.lock().await;
        if window.started_at.elapsed() >= self.window {
            window.started_at = Instant::now();
            window.count = 0;
        }
        if window.count >= self.max_requests {
            return false;
        }
        window.count += 1;
        true
    }
}

/// Bearer tokens accepted by the protected routes.
#[derive(Clone)]
pub struct AuthState {
    api_keys: Arc<Vec<String>>,
    pub enabled: bool,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("keys", &self.api_keys.len())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl AuthState {
    /// Reads comma-separated tokens from `ADONOMICS_API_KEYS`.
    ///
    /// # Errors
    ///
    /// Fails when no token is configured outside development.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var(API_KEYS_VAR).unwrap_or_default();
        let state = Self::from_keys(raw.split(','));

        if !state.enabled {
            if is_development {
                tracing::warn!(
                    "{API_KEYS_VAR} not set; bearer auth disabled in development environment"
                );
                return Ok(state);
            }
            anyhow::bail!(
                "{API_KEYS_VAR} is required outside development; provide comma-separated bearer tokens"
            );
        }

        Ok(state)
    }

    /// Auth is enabled iff at least one non-blank key is given.
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut api_keys: Vec<String> = keys
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        api_keys.sort();
        api_keys.dedup();

        Self {
            enabled: !api_keys.is_empty(),
            api_keys: Arc::new(api_keys),
        }
    }

    /// Compares against every key so timing does not reveal which one matched.
    fn allows(&self, token: &str) -> bool {
        self.api_keys.iter().fold(false, |found, key| {
            found | bool::from(key.as_bytes().ct_eq(token.as_bytes()))
        })
    }
}

/// Echoes a caller-supplied `x-request-id` or mints a `UUIDv4`, exposing it
/// to handlers as [`RequestId`] and on the response header.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let incoming = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= 128);
    let id = incoming.map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Middleware enforcing Bearer token auth when enabled.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    if extract_bearer_token(req.headers().get(AUTHORIZATION)).is_some_and(|t| auth.allows(t)) {
        return next.run(req).await;
    }

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    tracing::debug!(
        request_id = %request_id,
        path = %req.uri().path(),
        "rejected request without a valid bearer token"
    );
    ApiError::new(request_id, "unauthorized", "missing or invalid bearer token").into_response()
}

pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    if rate_limit.admit().await {
        return next.run(req).await;
    }

    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    tracing::warn!(request_id = %request_id, "rate limit exceeded");
    ApiError::new(request_id, "rate_limited", "rate limit exceeded; retry shortly").into_response()
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
