use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use course_service::config::ServiceConfig;
use course_service::db::{self, CourseRepository};
use course_service::server::create_router;
use course_service::types::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env().context("Failed to read configuration")?;
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    let pool = db::create_pool(&config.pool_settings())
        .with_context(|| format!("Failed to open course database at {}", config.db_path))?;
    if config.seed {
        db::seed(&pool).context("Failed to seed reference courses")?;
        info!("Seeded reference courses");
    }

    let app_state = Arc::new(AppState::new(CourseRepository::new(pool)));
    let router = create_router(app_state);

    let address = config.socket_addr();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Course service listening on http://{address}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Course service stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
