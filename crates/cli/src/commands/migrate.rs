//! Database migration command.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string for the Bagworks
//!   database
//!
//! Bagworks runs both binaries against one database: the `shop` schema
//! (customers, addresses, carts, coupons, orders) and the `backoffice`
//! schema (staff, tokens) share a single migration chain, stored in
//! `crates/storefront/migrations/`.

use super::{CommandError, connect};

/// Run all database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect("DATABASE_URL").await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
