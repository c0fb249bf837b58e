//! Checkout route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::CurrentCustomer;
use crate::models::OrderResponse;
use crate::services::CheckoutService;
use crate::services::checkout::{QuoteRequest, QuoteResponse, SubmitOrderRequest};
use crate::state::AppState;

/// Envelope for a successful order submission.
#[derive(Debug, Serialize)]
pub struct SubmitOrderResponse {
    pub success: bool,
    pub data: OrderResponse,
}

/// Price preview for the Payment stage.
#[instrument(skip(state, request))]
pub async fn quote(
    customer: CurrentCustomer,
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let response = CheckoutService::new(&state).quote(customer.id, request).await?;
    Ok(Json(response))
}

/// Submit an order.
#[instrument(skip(state, request))]
pub async fn submit(
    customer: CurrentCustomer,
    State(state): State<AppState>,
    Json(request): Json<SubmitOrderRequest>,
) -> Result<(StatusCode, Json<SubmitOrderResponse>)> {
    let order = CheckoutService::new(&state)
        .submit(customer.id, request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SubmitOrderResponse {
            success: true,
            data: order,
        }),
    ))
}
