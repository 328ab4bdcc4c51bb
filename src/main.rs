use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use tradeforge_api::{app_router, config::AppConfig, db, events, logging, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    logging::init(&config.log_level);

    info!(database_url = %config.database_url, "starting tradeforge-api");

    let pool = db::establish_connection_from_app_config(&config)
        .await
        .context("failed to connect to database")?;
    db::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;
    let pool = Arc::new(pool);

    let (event_sender, event_receiver) = events::channel(1024);
    tokio::spawn(events::process_events(event_receiver));

    let state = AppState::new(pool, config.clone(), event_sender);
    let router = app_router(state);

    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    info!(addr = %config.bind_addr(), "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    info!("shutdown signal received");
}
