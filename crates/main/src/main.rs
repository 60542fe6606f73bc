//! Service entry point.

use std::sync::Arc;

use application::{RoomService, RoomServiceDependencies, SystemClock};
use config::AppConfig;
use infrastructure::{create_pg_pool, PgRoomRepository};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env_with_defaults();

    tracing::info!(
        "connecting to database: {}",
        config.database.url.split('@').last().unwrap_or("unknown")
    );
    let pg_pool = create_pg_pool(&config.database.url, config.database.max_connections).await?;

    sqlx::migrate!("../../migrations").run(&pg_pool).await?;

    let room_repository = Arc::new(PgRoomRepository::new(pg_pool));
    let room_service = RoomService::new(RoomServiceDependencies {
        room_repository,
        clock: Arc::new(SystemClock::default()),
    });

    let shutdown = CancellationToken::new();
    let state = AppState::new(Arc::new(room_service), shutdown.clone());

    let app = router(state);
    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!("room service listening on http://{}", address);

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            signal_token.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    Ok(())
}
