use anyhow::Context;
use axum::http::HeaderValue;
use clap::Parser;
use pond_service::config::{Config, StoreKind};
use pond_service::db::{make_pool, PgStore};
use pond_service::service::PondService;
use pond_service::store::{MemoryStore, PondStore};
use pond_service::{metrics, rest};
use std::future::IntoFuture;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Starting Pond Service");
    info!("HTTP server: {}", config.http_addr);
    info!("Store: {:?}", config.store);
    info!("CORS origin: {}", config.cors_origin);

    metrics::init_metrics().context("failed to register metrics")?;

    let store: Arc<dyn PondStore> = match config.store {
        StoreKind::Postgres => {
            info!("Database: {}", config.redacted_database_url());
            let pool = make_pool(
                &config.database_url,
                config.db_max_connections,
                config.db_acquire_timeout(),
            )
            .await
            .context("failed to connect to database")?;
            Arc::new(PgStore::new(pool))
        }
        StoreKind::Memory => Arc::new(MemoryStore::new()),
    };

    let cors_origin = HeaderValue::from_str(&config.cors_origin)
        .with_context(|| format!("invalid CORS origin {:?}", config.cors_origin))?;
    let app = rest::create_router(PondService::new(store), cors_origin);

    let listener = tokio::net::TcpListener::bind(&config.http_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.http_addr))?;

    info!("HTTP server listening on {}", config.http_addr);

    tokio::select! {
        result = axum::serve(listener, app).into_future() => {
            if let Err(e) = result {
                error!("HTTP server error: {}", e);
                return Err(e.into());
            }
            error!("HTTP server terminated");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Shutting down");
    Ok(())
}
