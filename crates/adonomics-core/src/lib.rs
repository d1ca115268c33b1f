//! Domain model and configuration for the Adonomics analysis service.
//!
//! This crate performs no I/O beyond reading environment variables: it owns
//! the advertisement lifecycle, the analysis report contract, the onboarding
//! preference record, and the deterministic profile summarizer.

pub mod advertisement;
pub mod app_config;
pub mod config;
pub mod preferences;
pub mod profile;
pub mod report;

use thiserror::Error;

pub use advertisement::{
    AdStatus, Advertisement, AnalysisResults, CompetitiveHit, CompetitiveSearch, Decision,
    DecisionKind, GistSummary, IndexedVideo, PerformanceIndicators, StatusEntry, VideoAnalysis,
    VideoSource,
};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use preferences::UserPreferences;
pub use profile::{summarize_profile, NEW_USER_PROFILE, NO_PROFILE_INFORMATION};
pub use report::{AnalysisReport, DecisionSuggestion, RiskLevel};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid status transition from '{from}' to '{to}'")]
    InvalidTransition { from: AdStatus, to: AdStatus },

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid decision: {0}")]
    InvalidDecision(String),

    #[error("report field out of range: {0}")]
    ReportOutOfRange(String),
}
