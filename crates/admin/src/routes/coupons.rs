//! Coupon management route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bagworks_core::coupon::CouponKind;
use bagworks_core::{CategoryId, CouponId, Money};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::db::CouponRepository;
use crate::db::coupons::CouponInput;
use crate::error::{AppError, FieldError, Result};
use crate::middleware::{RequireStaff, RequireStaffWrite};
use crate::models::CouponResponse;
use crate::state::AppState;

/// Create/update coupon request body.
#[derive(Debug, Deserialize)]
pub struct CouponRequest {
    pub code: String,
    pub kind: CouponKind,
    pub value: Decimal,
    #[serde(default)]
    pub min_cart_value: Money,
    #[serde(default)]
    pub max_discount: Option<Money>,
    #[serde(default)]
    pub usage_limit: Option<u32>,
    pub valid_from: DateTime<Utc>,
    pub valid_till: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub applicable_category_ids: Vec<CategoryId>,
    #[serde(default)]
    pub first_order_only: bool,
    #[serde(default)]
    pub free_shipping: bool,
}

const fn default_true() -> bool {
    true
}

impl CouponRequest {
    /// Validate into a `CouponInput`, collecting every field failure.
    fn validate(self) -> std::result::Result<CouponInput, Vec<FieldError>> {
        let mut fields = Vec::new();

        if self.code.trim().is_empty() {
            fields.push(FieldError {
                field: "code",
                message: "code cannot be empty".to_owned(),
            });
        }
        match self.kind {
            CouponKind::Percentage => {
                if self.value <= Decimal::ZERO || self.value > Decimal::ONE_HUNDRED {
                    fields.push(FieldError {
                        field: "value",
                        message: "percentage value must be between 0 and 100".to_owned(),
                    });
                }
            }
            CouponKind::Flat => {
                if self.value <= Decimal::ZERO {
                    fields.push(FieldError {
                        field: "value",
                        message: "flat value must be positive".to_owned(),
                    });
                }
            }
        }
        if self.valid_from >= self.valid_till {
            fields.push(FieldError {
                field: "valid_till",
                message: "valid_till must be after valid_from".to_owned(),
            });
        }
        if self.min_cart_value < Money::ZERO {
            fields.push(FieldError {
                field: "min_cart_value",
                message: "minimum cart value cannot be negative".to_owned(),
            });
        }
        if self.max_discount.is_some_and(|m| m <= Money::ZERO) {
            fields.push(FieldError {
                field: "max_discount",
                message: "maximum discount must be positive when set".to_owned(),
            });
        }
        if self.usage_limit == Some(0) {
            fields.push(FieldError {
                field: "usage_limit",
                message: "usage limit must be at least 1 when set".to_owned(),
            });
        }

        if !fields.is_empty() {
            return Err(fields);
        }

        Ok(CouponInput {
            code: self.code,
            kind: self.kind,
            value: self.value,
            min_cart_value: self.min_cart_value,
            max_discount: self.max_discount,
            usage_limit: self.usage_limit.map(|l| i32::try_from(l).unwrap_or(i32::MAX)),
            valid_from: self.valid_from,
            valid_till: self.valid_till,
            is_active: self.is_active,
            applicable_category_ids: self
                .applicable_category_ids
                .iter()
                .map(|id| id.as_i64())
                .collect(),
            first_order_only: self.first_order_only,
            free_shipping: self.free_shipping,
        })
    }
}

/// List all coupons.
#[instrument(skip(_staff, state))]
pub async fn index(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
) -> Result<Json<Vec<CouponResponse>>> {
    let records = CouponRepository::new(state.pool()).list().await?;
    let coupons = records
        .into_iter()
        .map(|r| r.into_response().map_err(AppError::Repository))
        .collect::<Result<Vec<_>>>()?;
    Ok(Json(coupons))
}

/// Show one coupon.
#[instrument(skip(_staff, state))]
pub async fn show(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<CouponId>,
) -> Result<Json<CouponResponse>> {
    let record = CouponRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("coupon {id}")))?;
    Ok(Json(record.into_response()?))
}

/// Create a coupon.
#[instrument(skip(_staff, state, request))]
pub async fn create(
    RequireStaffWrite(_staff): RequireStaffWrite,
    State(state): State<AppState>,
    Json(request): Json<CouponRequest>,
) -> Result<(StatusCode, Json<CouponResponse>)> {
    let input = request.validate().map_err(AppError::Validation)?;
    let record = CouponRepository::new(state.pool()).create(&input).await?;
    tracing::info!(coupon_id = %record.id, code = %record.code, "Coupon created");
    Ok((StatusCode::CREATED, Json(record.into_response()?)))
}

/// Replace a coupon's terms.
#[instrument(skip(_staff, state, request))]
pub async fn update(
    RequireStaffWrite(_staff): RequireStaffWrite,
    State(state): State<AppState>,
    Path(id): Path<CouponId>,
    Json(request): Json<CouponRequest>,
) -> Result<Json<CouponResponse>> {
    let input = request.validate().map_err(AppError::Validation)?;
    let record = CouponRepository::new(state.pool()).update(id, &input).await?;
    Ok(Json(record.into_response()?))
}

/// Delete a coupon.
#[instrument(skip(_staff, state))]
pub async fn destroy(
    RequireStaffWrite(_staff): RequireStaffWrite,
    State(state): State<AppState>,
    Path(id): Path<CouponId>,
) -> Result<StatusCode> {
    CouponRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Flip a coupon's active flag.
#[instrument(skip(_staff, state))]
pub async fn toggle(
    RequireStaffWrite(_staff): RequireStaffWrite,
    State(state): State<AppState>,
    Path(id): Path<CouponId>,
) -> Result<Json<CouponResponse>> {
    let record = CouponRepository::new(state.pool()).toggle(id).await?;
    Ok(Json(record.into_response()?))
}
