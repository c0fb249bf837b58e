//! Database operations for the admin `PostgreSQL`.
//!
//! # Schemas
//!
//! - `backoffice` - Staff identities and bearer tokens (owned by this
//!   crate's migrations)
//! - `shop` - Orders and coupons (owned by the storefront migrations; the
//!   admin binary operates on them through the lifecycle and coupon
//!   repositories here)
//!
//! # Migrations
//!
//! The whole database shares one migration chain, stored in
//! `crates/storefront/migrations/`, and runs via:
//! ```bash
//! cargo run -p bagworks-cli -- migrate
//! ```

pub mod coupons;
pub mod orders;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use coupons::CouponRepository;
pub use orders::OrderRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate coupon code).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
