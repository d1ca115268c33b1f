//! Offline tests for adonomics-db pool configuration and row conversion.
//! These tests do not require a live database connection.

use adonomics_core::{
    AdStatus, Advertisement, AnalysisResults, AppConfig, Environment, StatusEntry, VideoSource,
};
use adonomics_db::advertisements::AdvertisementRow;
use adonomics_db::{DbError, PoolConfig};
use chrono::Utc;
use sqlx::types::Json;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use uuid::Uuid;

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        twelve_labs_api_key: None,
        twelve_labs_index_id: None,
        twelve_labs_base_url: "https://api.twelvelabs.io/v1.3".to_string(),
        groq_api_key: None,
        groq_model: "llama-3.3-70b-versatile".to_string(),
        groq_base_url: "https://api.groq.com/openai/v1".to_string(),
        provider_timeout_secs: 120,
        synthesis_timeout_secs: 60,
        poll_interval_secs: 5,
        indexing_max_wait_secs: 300,
        retry_after_secs: 900,
        analysis_lease_secs: 1800,
        max_upload_bytes: 1024,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        rate_limit_requests: 120,
        rate_limit_window_secs: 60,
    }
}

fn row(source_kind: &str, file_name: Option<&str>, url: Option<&str>) -> AdvertisementRow {
    let now = Utc::now();
    AdvertisementRow {
        id: Uuid::new_v4(),
        user_id: "u1".to_string(),
        source_kind: source_kind.to_string(),
        video_file_name: file_name.map(str::to_string),
        video_url: url.map(str::to_string),
        twelve_labs_index_id: Some("idx".to_string()),
        twelve_labs_task_id: Some("t1".to_string()),
        twelve_labs_video_id: Some("v1".to_string()),
        status: "upload".to_string(),
        status_history: Json(vec![StatusEntry {
            status: AdStatus::Upload,
            timestamp: now,
            note: None,
        }]),
        analysis_results: Json(AnalysisResults::default()),
        decision: None,
        decision_history: Json(Vec::new()),
        performance_metrics: None,
        version: 4,
        created_at: now,
        updated_at: now,
        uploaded_at: Some(now),
        analyzed_at: None,
        decided_at: None,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn file_row_converts_to_advertisement() {
    let ad = Advertisement::try_from(row("file", Some("ad.mp4"), None)).expect("convert");
    assert_eq!(
        ad.source,
        VideoSource::File {
            file_name: "ad.mp4".to_string()
        }
    );
    assert_eq!(ad.status, AdStatus::Upload);
    assert_eq!(ad.version, 4);
    assert_eq!(ad.status_history.len(), 1);
}

#[test]
fn url_row_converts_to_advertisement() {
    let ad = Advertisement::try_from(row("url", None, Some("https://cdn.example.com/a.mp4")))
        .expect("convert");
    assert!(matches!(ad.source, VideoSource::Url { .. }));
}

#[test]
fn row_with_mismatched_source_is_rejected() {
    let result = Advertisement::try_from(row("url", Some("ad.mp4"), None));
    assert!(matches!(result, Err(DbError::InvalidRow(_))));
}

#[test]
fn row_with_unknown_status_is_rejected() {
    let mut r = row("file", Some("ad.mp4"), None);
    r.status = "failed".to_string();
    assert!(matches!(
        Advertisement::try_from(r),
        Err(DbError::InvalidRow(_))
    ));
}
