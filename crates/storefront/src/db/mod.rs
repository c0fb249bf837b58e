//! Database operations for the storefront `PostgreSQL`.
//!
//! # Schema: `shop`
//!
//! ## Tables
//!
//! - `customers` - Customer identities (populated by the external auth
//!   service)
//! - `api_tokens` - Externally-issued bearer tokens
//! - `addresses` - Customer shipping addresses
//! - `cart_items` - Server-held cart rows
//! - `coupons` - Promotions (managed by the admin binary)
//! - `orders`, `order_items`, `order_status_history`, `order_notes`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` (one chain
//! for the whole database, `backoffice` schema included) and run via:
//! ```bash
//! cargo run -p bagworks-cli -- migrate
//! ```

pub mod addresses;
pub mod carts;
pub mod coupons;
pub mod orders;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use carts::CartRepository;
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
