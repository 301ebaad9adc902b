use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use homerent_backend::{
    api,
    config::{Config, StorageBackend},
    middleware::AppState,
    services::{
        KeyValueStorage, MemoryStorage, PgStorage, RentalStore, SessionService, SmsService,
        SystemClock,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homerent_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!("Starting HomeRent Backend...");

    let storage: Arc<dyn KeyValueStorage> = match config.storage_backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory storage, data is lost on exit");
            Arc::new(MemoryStorage::new())
        }
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for the postgres backend")?;

            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database successfully");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Migrations completed");

            Arc::new(PgStorage::connect(pool).await?)
        }
    };

    let store = RentalStore::open(storage.clone(), Arc::new(SystemClock)).await?;
    store.spawn_sync();

    let session = SessionService::new(
        storage,
        store.clone(),
        Duration::from_millis(config.login_delay_ms),
    );
    session.restore().await?;

    let state = AppState {
        store,
        session: Arc::new(session),
        sms: Arc::new(SmsService::new(config.clone())),
        config: config.clone(),
    };

    let app = api::app(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid HOST/PORT")?;
    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
