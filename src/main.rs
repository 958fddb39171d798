// src/main.rs

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use vacq_api::{build_router, config::Config, db, service, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vacq_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    let addr = config.bind_addr();

    let pool = db::connect(&config.database).await?;
    db::migrate(&pool).await?;

    tracing::info!(environment = %config.environment, "Starting VacQ API");
    let state = AppState::from_pool(config, pool);
    if let Some(seed) = &state.config.admin_seed {
        service::seed_admin(state.users.as_ref(), seed).await?;
    }
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    tracing::info!("API docs at http://{}/api-docs", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
