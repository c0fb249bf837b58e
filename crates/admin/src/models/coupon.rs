//! Coupon row model and response shape.

use bagworks_core::coupon::CouponKind;
use bagworks_core::{CategoryId, CouponId, Money};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::RepositoryError;

/// A raw `shop.coupons` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CouponRecord {
    pub id: CouponId,
    pub code: String,
    pub kind: String,
    pub value: Decimal,
    pub min_cart_value: Money,
    pub max_discount: Option<Money>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_till: DateTime<Utc>,
    pub is_active: bool,
    pub applicable_category_ids: Vec<i64>,
    pub first_order_only: bool,
    pub free_shipping: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The back-office coupon shape.
#[derive(Debug, Clone, Serialize)]
pub struct CouponResponse {
    pub id: CouponId,
    pub code: String,
    pub kind: CouponKind,
    pub value: Decimal,
    pub min_cart_value: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_till: DateTime<Utc>,
    pub is_active: bool,
    pub applicable_category_ids: Vec<CategoryId>,
    pub first_order_only: bool,
    pub free_shipping: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CouponRecord {
    /// Convert the row into the response shape.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored kind is
    /// invalid.
    pub fn into_response(self) -> Result<CouponResponse, RepositoryError> {
        let kind: CouponKind = self.kind.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("invalid coupon kind in database: {e}"))
        })?;

        Ok(CouponResponse {
            id: self.id,
            code: self.code,
            kind,
            value: self.value,
            min_cart_value: self.min_cart_value,
            max_discount: self.max_discount,
            usage_limit: self.usage_limit,
            used_count: self.used_count,
            valid_from: self.valid_from,
            valid_till: self.valid_till,
            is_active: self.is_active,
            applicable_category_ids: self
                .applicable_category_ids
                .into_iter()
                .map(CategoryId::new)
                .collect(),
            first_order_only: self.first_order_only,
            free_shipping: self.free_shipping,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
