//! Customer order route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use bagworks_core::OrderId;
use tracing::instrument;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::CurrentCustomer;
use crate::models::{OrderItemRecord, OrderResponse, OrderSummary};
use crate::state::AppState;

/// List the customer's orders, newest first.
#[instrument(skip(state))]
pub async fn index(
    customer: CurrentCustomer,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderSummary>>> {
    let records = OrderRepository::new(state.pool())
        .list_for_customer(customer.id)
        .await?;
    let summaries = records
        .iter()
        .map(|r| r.summary().map_err(AppError::Repository))
        .collect::<Result<Vec<_>>>()?;
    Ok(Json(summaries))
}

/// Show one of the customer's orders with its item snapshot.
#[instrument(skip(state))]
pub async fn show(
    customer: CurrentCustomer,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderResponse>> {
    let (record, items) = OrderRepository::new(state.pool())
        .get_for_customer(customer.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let items = items.iter().map(OrderItemRecord::line_item).collect();
    Ok(Json(record.into_response(items)?))
}
