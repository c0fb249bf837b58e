//! Coupon administration repository.
//!
//! CRUD plus activation toggle. Codes normalize to uppercase on write;
//! `used_count` is deliberately untouchable from here - it only moves
//! through the storefront's guarded redemption.

use bagworks_core::coupon::{CouponKind, normalize_code};
use bagworks_core::{CouponId, Money};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::CouponRecord;

/// Validated input for creating or replacing a coupon.
#[derive(Debug, Clone)]
pub struct CouponInput {
    pub code: String,
    pub kind: CouponKind,
    pub value: Decimal,
    pub min_cart_value: Money,
    pub max_discount: Option<Money>,
    pub usage_limit: Option<i32>,
    pub valid_from: DateTime<Utc>,
    pub valid_till: DateTime<Utc>,
    pub is_active: bool,
    pub applicable_category_ids: Vec<i64>,
    pub first_order_only: bool,
    pub free_shipping: bool,
}

const COUPON_COLUMNS: &str = r"
    id, code, kind, value, min_cart_value, max_discount, usage_limit,
    used_count, valid_from, valid_till, is_active, applicable_category_ids,
    first_order_only, free_shipping, created_at, updated_at
";

/// Repository for coupon administration.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    /// Create a new coupon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all coupons, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<CouponRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, CouponRecord>(&format!(
            "SELECT {COUPON_COLUMNS} FROM shop.coupons ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a coupon by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CouponId) -> Result<Option<CouponRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, CouponRecord>(&format!(
            "SELECT {COUPON_COLUMNS} FROM shop.coupons WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Create a coupon.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code already exists,
    /// `RepositoryError::Database` for other failures.
    pub async fn create(&self, input: &CouponInput) -> Result<CouponRecord, RepositoryError> {
        let row = sqlx::query_as::<_, CouponRecord>(&format!(
            r"
            INSERT INTO shop.coupons
                (code, kind, value, min_cart_value, max_discount, usage_limit,
                 valid_from, valid_till, is_active, applicable_category_ids,
                 first_order_only, free_shipping)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {COUPON_COLUMNS}
            "
        ))
        .bind(normalize_code(&input.code))
        .bind(input.kind.to_string())
        .bind(input.value)
        .bind(input.min_cart_value)
        .bind(input.max_discount)
        .bind(input.usage_limit)
        .bind(input.valid_from)
        .bind(input.valid_till)
        .bind(input.is_active)
        .bind(&input.applicable_category_ids)
        .bind(input.first_order_only)
        .bind(input.free_shipping)
        .fetch_one(self.pool)
        .await
        .map_err(conflict_on_unique)?;
        Ok(row)
    }

    /// Replace a coupon's terms.
    ///
    /// `used_count` is preserved; only the storefront's redemption moves
    /// it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for unknown coupons,
    /// `RepositoryError::Conflict` on a duplicate code, and
    /// `RepositoryError::Database` for other failures.
    pub async fn update(
        &self,
        id: CouponId,
        input: &CouponInput,
    ) -> Result<CouponRecord, RepositoryError> {
        let row = sqlx::query_as::<_, CouponRecord>(&format!(
            r"
            UPDATE shop.coupons
            SET code = $2, kind = $3, value = $4, min_cart_value = $5,
                max_discount = $6, usage_limit = $7, valid_from = $8,
                valid_till = $9, is_active = $10,
                applicable_category_ids = $11, first_order_only = $12,
                free_shipping = $13, updated_at = NOW()
            WHERE id = $1
            RETURNING {COUPON_COLUMNS}
            "
        ))
        .bind(id)
        .bind(normalize_code(&input.code))
        .bind(input.kind.to_string())
        .bind(input.value)
        .bind(input.min_cart_value)
        .bind(input.max_discount)
        .bind(input.usage_limit)
        .bind(input.valid_from)
        .bind(input.valid_till)
        .bind(input.is_active)
        .bind(&input.applicable_category_ids)
        .bind(input.first_order_only)
        .bind(input.free_shipping)
        .fetch_optional(self.pool)
        .await
        .map_err(conflict_on_unique)?;
        row.ok_or(RepositoryError::NotFound)
    }

    /// Delete a coupon.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for unknown coupons and
    /// `RepositoryError::Conflict` if orders reference the coupon.
    pub async fn delete(&self, id: CouponId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.coupons WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "coupon is referenced by existing orders; deactivate it instead"
                            .to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Flip a coupon's active flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for unknown coupons,
    /// `RepositoryError::Database` for other failures.
    pub async fn toggle(&self, id: CouponId) -> Result<CouponRecord, RepositoryError> {
        let row = sqlx::query_as::<_, CouponRecord>(&format!(
            r"
            UPDATE shop.coupons
            SET is_active = NOT is_active, updated_at = NOW()
            WHERE id = $1
            RETURNING {COUPON_COLUMNS}
            "
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        row.ok_or(RepositoryError::NotFound)
    }
}

fn conflict_on_unique(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("coupon code already exists".to_owned());
    }
    RepositoryError::Database(err)
}
