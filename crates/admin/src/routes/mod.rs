//! HTTP route handlers for the admin API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (verifies database)
//!
//! # Order console (requires staff bearer token; writes need admin role)
//! GET   /orders                     - List with status/payment filters
//! GET   /orders/{id}                - Full order with history and notes
//! PATCH /orders/{id}/status         - Transition one order
//! PATCH /orders/bulk/status         - Transition many, per-order results
//! PATCH /orders/{id}/tracking       - Attach tracking (write-once)
//! POST  /orders/{id}/notes          - Append a note
//! PATCH /orders/{id}/payment-status - Audited manual override
//!
//! # Coupons (requires staff bearer token; writes need admin role)
//! GET    /coupons                   - List all
//! POST   /coupons                   - Create
//! GET    /coupons/{id}              - Show
//! PUT    /coupons/{id}              - Replace terms
//! DELETE /coupons/{id}              - Delete (blocked while referenced)
//! PATCH  /coupons/{id}/toggle       - Flip active flag
//! ```

pub mod coupons;
pub mod orders;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Build the admin router.
#[must_use]
pub fn routes() -> Router<AppState> {
    Router::new()
        // Order console
        .route("/orders", get(orders::index))
        .route("/orders/bulk/status", patch(orders::bulk_transition))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", patch(orders::transition))
        .route("/orders/{id}/tracking", patch(orders::attach_tracking))
        .route("/orders/{id}/notes", post(orders::add_note))
        .route(
            "/orders/{id}/payment-status",
            patch(orders::set_payment_status),
        )
        // Coupons
        .route("/coupons", get(coupons::index).post(coupons::create))
        .route(
            "/coupons/{id}",
            get(coupons::show)
                .put(coupons::update)
                .delete(coupons::destroy),
        )
        .route("/coupons/{id}/toggle", patch(coupons::toggle))
}
