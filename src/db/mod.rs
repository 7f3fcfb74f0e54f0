use std::time::Duration;

use anyhow::Context;
use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::errors::{AppError, ReasonCode};

pub mod departments;
pub mod profiles;
pub mod roles;
pub mod seed;

pub static MIGRATOR: Migrator = sqlx::migrate!();

pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .context("failed to connect to database")
}

/// Connects to `DATABASE_URL` and applies pending migrations.
pub async fn init() -> anyhow::Result<SqlitePool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let pool = connect(&database_url).await?;

    MIGRATOR.run(&pool).await.context("failed to run migrations")?;

    Ok(pool)
}

/// Maps constraint violations on a write to the conflict the caller should
/// see; anything else stays a database error.
pub(crate) fn write_error(err: sqlx::Error, duplicate: ReasonCode, what: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = match duplicate {
                ReasonCode::ProfileAlreadyExists => "Profile already exists for this user".to_string(),
                _ => format!("{what} name already exists"),
            };
            return AppError::conflict(duplicate, message);
        }
        if db_err.is_foreign_key_violation() {
            return AppError::conflict(
                ReasonCode::ReferentialConflict,
                format!("{what} references or is referenced by other records"),
            );
        }
    }
    AppError::Database(err)
}
