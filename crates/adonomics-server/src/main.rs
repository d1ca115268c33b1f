mod api;
mod middleware;

use std::sync::Arc;

use adonomics_pipeline::{AdvertisementStore, AnalysisOrchestrator, PgStore};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::{AuthState, RateLimitState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = adonomics_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "configuration loaded");

    let pool_config = adonomics_db::PoolConfig::from_app_config(&config);
    let pool = adonomics_db::connect_pool(&config.database_url, pool_config).await?;
    adonomics_db::run_migrations(&pool).await?;

    let store: Arc<dyn AdvertisementStore> = Arc::new(PgStore::new(pool));
    let orchestrator = AnalysisOrchestrator::from_config(&config, store)?;

    let auth = AuthState::from_env(matches!(
        config.env,
        adonomics_core::Environment::Development
    ))?;
    let app = build_app(
        AppState {
            orchestrator: Arc::new(orchestrator),
        },
        auth,
        RateLimitState::from_config(&config),
        config.max_upload_bytes,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "adonomics server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
