use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub twelve_labs_api_key: Option<String>,
    pub twelve_labs_index_id: Option<String>,
    pub twelve_labs_base_url: String,
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub groq_base_url: String,
    pub provider_timeout_secs: u64,
    pub synthesis_timeout_secs: u64,
    pub poll_interval_secs: u64,
    /// `0` disables the indexing ceiling.
    pub indexing_max_wait_secs: u64,
    pub retry_after_secs: u64,
    /// An `analyzing` record untouched for this long is treated as abandoned.
    pub analysis_lease_secs: u64,
    pub max_upload_bytes: usize,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Requests allowed per window on the protected API; `0` disables limiting.
    pub rate_limit_requests: usize,
    pub rate_limit_window_secs: u64,
}

impl AppConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub fn indexing_max_wait(&self) -> Option<Duration> {
        (self.indexing_max_wait_secs > 0).then(|| Duration::from_secs(self.indexing_max_wait_secs))
    }

    #[must_use]
    pub fn analysis_lease(&self) -> Duration {
        Duration::from_secs(self.analysis_lease_secs)
    }

    #[must_use]
    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field(
                "twelve_labs_api_key",
                &self.twelve_labs_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("twelve_labs_index_id", &self.twelve_labs_index_id)
            .field("twelve_labs_base_url", &self.twelve_labs_base_url)
            .field(
                "groq_api_key",
                &self.groq_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("groq_model", &self.groq_model)
            .field("groq_base_url", &self.groq_base_url)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("synthesis_timeout_secs", &self.synthesis_timeout_secs)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("indexing_max_wait_secs", &self.indexing_max_wait_secs)
            .field("retry_after_secs", &self.retry_after_secs)
            .field("analysis_lease_secs", &self.analysis_lease_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("rate_limit_requests", &self.rate_limit_requests)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .finish()
    }
}
