//! Integration tests for Bagworks.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p bagworks-cli -- migrate
//! cargo run -p bagworks-cli -- seed coupons
//!
//! # Start both servers
//! cargo run -p bagworks-storefront &
//! cargo run -p bagworks-admin &
//!
//! # Run integration tests
//! cargo test -p bagworks-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - storefront API (default `http://localhost:3000`)
//! - `ADMIN_BASE_URL` - admin API (default `http://localhost:3001`)
//! - `CUSTOMER_TOKEN` - a valid customer bearer token
//! - `STAFF_TOKEN` - a valid staff bearer token (mint with
//!   `bagworks-cli staff create`)
//!
//! # Test Categories
//!
//! - `storefront_checkout` - Address book, cart, quote, and submission
//! - `admin_orders` - Lifecycle transitions, bulk operations, tracking,
//!   notes, payment overrides

/// Base URL for the storefront API (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the admin API (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Customer bearer token from the environment.
///
/// # Panics
///
/// Panics when `CUSTOMER_TOKEN` is unset; ignored tests require it.
#[must_use]
pub fn customer_token() -> String {
    std::env::var("CUSTOMER_TOKEN").expect("CUSTOMER_TOKEN must be set for integration tests")
}

/// Staff bearer token from the environment.
///
/// # Panics
///
/// Panics when `STAFF_TOKEN` is unset; ignored tests require it.
#[must_use]
pub fn staff_token() -> String {
    std::env::var("STAFF_TOKEN").expect("STAFF_TOKEN must be set for integration tests")
}
