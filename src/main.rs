use std::sync::Arc;

use anyhow::Context;

use health_log::config::{Config, StoreBackend};
use health_log::store::{LogStore, MemoryLogStore, PgLogStore};
use health_log::{db, router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "health_log=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn LogStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            let pool = db::create_pool(database_url, config.db_max_connections)
                .await
                .context("Failed to create database pool")?;

            db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            Arc::new(PgLogStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; entries are lost on restart");
            Arc::new(MemoryLogStore::new())
        }
    };

    let addr = config.listen_addr();
    let app = router(AppState::new(store, config));

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
