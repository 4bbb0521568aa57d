//! Infrastructure wiring: stores, audit log, mutation engine and realtime bus.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use cricket_infra::{
    BallLog, InMemoryBallLog, InMemoryScoreboardStore, PostgresBallLog, PostgresScoreboardStore,
    ScoreMutationEngine, ScoreboardStore, StoreError,
};

use crate::app::broadcast::BroadcastCoordinator;
use crate::config::AppConfig;

/// Mutation engine over type-erased backends, so in-memory and Postgres
/// wiring share one handler code path.
pub type Engine = ScoreMutationEngine<Arc<dyn ScoreboardStore>, Arc<dyn BallLog>>;

#[derive(Debug, Error)]
pub enum ServicesError {
    #[error("failed to connect to Postgres: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("failed to prepare schema: {0}")]
    Schema(#[from] StoreError),

    #[error("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")]
    MissingDatabaseUrl,
}

/// Everything a handler needs; cheap to clone.
#[derive(Clone)]
pub struct AppServices {
    pub engine: Arc<Engine>,
    pub coordinator: BroadcastCoordinator,
}

impl AppServices {
    pub fn new(engine: Engine, coordinator: BroadcastCoordinator) -> Self {
        Self {
            engine: Arc::new(engine),
            coordinator,
        }
    }
}

/// In-memory wiring (dev/test).
pub fn build_in_memory_services(config: &AppConfig) -> AppServices {
    let store: Arc<dyn ScoreboardStore> = Arc::new(InMemoryScoreboardStore::new());
    let log: Arc<dyn BallLog> = Arc::new(InMemoryBallLog::new());

    AppServices::new(
        ScoreMutationEngine::new(store, log),
        BroadcastCoordinator::new(config.realtime_capacity, config.error_scope),
    )
}

/// Postgres wiring: one pool shared by the scoreboard store and the ball log.
pub async fn build_persistent_services(config: &AppConfig) -> Result<AppServices, ServicesError> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or(ServicesError::MissingDatabaseUrl)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(database_url)
        .await?;

    let scoreboards = PostgresScoreboardStore::new(pool.clone());
    scoreboards.ensure_schema().await?;
    let balls = PostgresBallLog::new(pool);
    balls.ensure_schema().await?;

    let store: Arc<dyn ScoreboardStore> = Arc::new(scoreboards);
    let log: Arc<dyn BallLog> = Arc::new(balls);

    Ok(AppServices::new(
        ScoreMutationEngine::new(store, log),
        BroadcastCoordinator::new(config.realtime_capacity, config.error_scope),
    ))
}

pub async fn build_services(config: &AppConfig) -> Result<AppServices, ServicesError> {
    if config.use_persistent_stores {
        tracing::info!(max_connections = config.db_max_connections, "using Postgres stores");
        build_persistent_services(config).await
    } else {
        tracing::info!("using in-memory stores");
        Ok(build_in_memory_services(config))
    }
}
