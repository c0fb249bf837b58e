//! Order console route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use bagworks_core::{OrderId, OrderStatus, PaymentStatus};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::OrderRepository;
use crate::db::orders::{BulkTransitionResult, OrderFilter};
use crate::error::{AppError, Result};
use crate::middleware::{RequireStaff, RequireStaffWrite};
use crate::models::{AdminOrderResponse, NoteRecord, OrderSummary};
use crate::state::AppState;

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Paginated listing response.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

/// Status transition request body.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: OrderStatus,
}

/// Bulk status transition request body.
#[derive(Debug, Deserialize)]
pub struct BulkTransitionRequest {
    pub order_ids: Vec<OrderId>,
    pub status: OrderStatus,
}

/// Tracking attachment request body.
#[derive(Debug, Deserialize)]
pub struct TrackingRequest {
    pub tracking_id: String,
    pub courier_name: String,
}

/// Note request body.
#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub message: String,
}

/// Payment-status override request body.
#[derive(Debug, Deserialize)]
pub struct PaymentStatusRequest {
    pub status: PaymentStatus,
}

/// List orders with optional filters.
#[instrument(skip(_staff, state))]
pub async fn index(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PaginatedResponse<OrderSummary>>> {
    let page = query.page.unwrap_or(1).max(1);
    let filter = OrderFilter {
        status: query.status,
        payment_status: query.payment_status,
        page,
        per_page: query.per_page.unwrap_or(20),
    };
    let (records, total) = OrderRepository::new(state.pool()).list(&filter).await?;
    let data = records
        .iter()
        .map(|r| r.summary().map_err(AppError::Repository))
        .collect::<Result<Vec<_>>>()?;
    Ok(Json(PaginatedResponse { data, total, page }))
}

/// Show one order with items, history, and notes.
#[instrument(skip(_staff, state))]
pub async fn show(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<AdminOrderResponse>> {
    let (record, items, history, notes) = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    Ok(Json(record.into_response(&items, &history, &notes)?))
}

/// Move an order to a new status.
#[instrument(skip(staff, state))]
pub async fn transition(
    RequireStaffWrite(staff): RequireStaffWrite,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<OrderSummary>> {
    let record = OrderRepository::new(state.pool())
        .transition(id, request.status, &staff.actor())
        .await?;
    Ok(Json(record.summary()?))
}

/// Apply a status transition to many orders, reporting per-order results.
#[instrument(skip(staff, state, request))]
pub async fn bulk_transition(
    RequireStaffWrite(staff): RequireStaffWrite,
    State(state): State<AppState>,
    Json(request): Json<BulkTransitionRequest>,
) -> Result<Json<Vec<BulkTransitionResult>>> {
    if request.order_ids.is_empty() {
        return Err(AppError::BadRequest("order_ids cannot be empty".to_owned()));
    }
    let results = OrderRepository::new(state.pool())
        .bulk_transition(&request.order_ids, request.status, &staff.actor())
        .await;
    Ok(Json(results))
}

/// Attach tracking details (write-once).
#[instrument(skip(staff, state, request))]
pub async fn attach_tracking(
    RequireStaffWrite(staff): RequireStaffWrite,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<TrackingRequest>,
) -> Result<Json<OrderSummary>> {
    if request.tracking_id.trim().is_empty() || request.courier_name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "tracking_id and courier_name are required".to_owned(),
        ));
    }
    let record = OrderRepository::new(state.pool())
        .attach_tracking(id, request.tracking_id.trim(), request.courier_name.trim())
        .await?;
    tracing::debug!(actor = %staff.actor(), "tracking recorded");
    Ok(Json(record.summary()?))
}

/// Append a note to an order.
#[instrument(skip(staff, state, request))]
pub async fn add_note(
    RequireStaffWrite(staff): RequireStaffWrite,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<NoteRequest>,
) -> Result<(StatusCode, Json<NoteRecord>)> {
    if request.message.trim().is_empty() {
        return Err(AppError::BadRequest("message cannot be empty".to_owned()));
    }
    let note = OrderRepository::new(state.pool())
        .add_note(id, &staff.actor(), request.message.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// Manually override an order's payment status (audited).
#[instrument(skip(staff, state))]
pub async fn set_payment_status(
    RequireStaffWrite(staff): RequireStaffWrite,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<PaymentStatusRequest>,
) -> Result<Json<OrderSummary>> {
    let record = OrderRepository::new(state.pool())
        .set_payment_status(id, request.status, &staff.actor())
        .await?;
    Ok(Json(record.summary()?))
}
