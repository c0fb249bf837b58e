//! CLI command implementations.

pub mod migrate;
pub mod seed;
pub mod staff;

use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Connect to a database named by `primary_key`, falling back to
/// `DATABASE_URL`.
pub async fn connect(primary_key: &'static str) -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let url = std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar(primary_key))?;

    Ok(PgPool::connect(&url).await?)
}
