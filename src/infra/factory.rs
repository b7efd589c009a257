use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::{PgConnectOptions, PgPoolOptions}, sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}};
use sqlx::{ConnectOptions, PgPool, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::error::AppError;
use crate::infra::repositories::{
    postgres_artist_pricing_repo::PostgresArtistPricingRepo, postgres_booking_repo::PostgresBookingRepo,
    sqlite_artist_pricing_repo::SqliteArtistPricingRepo, sqlite_booking_repo::SqliteBookingRepo,
};
use crate::state::AppState;

pub fn is_postgres_url(database_url: &str) -> bool {
    database_url.starts_with("postgres://") || database_url.starts_with("postgresql://")
}

pub async fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    if is_postgres_url(&config.database_url) {
        let pool = connect_postgres(config).await?;
        Ok(AppState::new(
            config.clone(),
            Arc::new(PostgresBookingRepo::new(pool.clone())),
            Arc::new(PostgresArtistPricingRepo::new(pool)),
        ))
    } else {
        let pool = connect_sqlite(config).await?;
        Ok(AppState::new(
            config.clone(),
            Arc::new(SqliteBookingRepo::new(pool.clone())),
            Arc::new(SqliteArtistPricingRepo::new(pool)),
        ))
    }
}

pub async fn connect_postgres(config: &Config) -> Result<PgPool, AppError> {
    info!("Initializing PostgreSQL connection...");

    let opts: PgConnectOptions = config
        .database_url
        .parse()
        .map_err(|e| AppError::Configuration(format!("Invalid Postgres URL: {}", e)))?;
    let opts = opts
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(opts)
        .await?;

    sqlx::migrate!("./migrations/postgres").run(&pool).await?;
    Ok(pool)
}

/// WAL mode plus a busy timeout so the compare-and-swap writes from several
/// pool connections queue instead of failing with `SQLITE_BUSY`.
pub async fn connect_sqlite(config: &Config) -> Result<SqlitePool, AppError> {
    info!("Initializing SQLite connection with WAL Mode...");

    let opts = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(|e| AppError::Configuration(format!("Invalid SQLite connection string: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(opts)
        .await?;

    sqlx::migrate!("./migrations/sqlite").run(&pool).await?;
    Ok(pool)
}
