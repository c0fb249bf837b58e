//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (verifies database)
//!
//! # Address book (requires customer bearer token)
//! GET    /user/addresses            - List addresses
//! POST   /user/addresses            - Create address
//! PATCH  /user/addresses/{id}/default - Make an address the default
//!
//! # Cart (requires customer bearer token)
//! GET    /cart                      - Cart contents with subtotal
//! POST   /cart/items                - Add item (merges quantities)
//! PATCH  /cart/items/{id}           - Set item quantity
//! DELETE /cart/items/{id}           - Remove item
//! DELETE /cart                      - Empty the cart
//!
//! # Checkout (requires customer bearer token)
//! POST /checkout/quote              - Price preview with optional coupon
//! POST /orders                      - Submit an order
//!
//! # Orders (requires customer bearer token)
//! GET  /orders                      - The customer's orders
//! GET  /orders/{id}                 - One order with its item snapshot
//! ```

pub mod addresses;
pub mod cart;
pub mod checkout;
pub mod orders;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Build the storefront router.
#[must_use]
pub fn routes() -> Router<AppState> {
    Router::new()
        // Address book
        .route(
            "/user/addresses",
            get(addresses::list).post(addresses::create),
        )
        .route(
            "/user/addresses/{id}/default",
            patch(addresses::set_default),
        )
        // Cart
        .route("/cart", get(cart::show).delete(cart::clear))
        .route("/cart/items", post(cart::add))
        .route(
            "/cart/items/{id}",
            patch(cart::update_quantity).delete(cart::remove),
        )
        // Checkout
        .route("/checkout/quote", post(checkout::quote))
        .route("/orders", post(checkout::submit).get(orders::index))
        .route("/orders/{id}", get(orders::show))
}
