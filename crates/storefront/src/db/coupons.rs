//! Coupon lookup and redemption.
//!
//! Lookup is read-only and case-insensitive (codes are stored uppercase).
//! Redemption is a single guarded `UPDATE`: the usage-limit check and the
//! increment happen in one statement, so concurrent checkouts can never
//! push `used_count` past `usage_limit`.

use bagworks_core::coupon::{Coupon, CouponKind, normalize_code};
use bagworks_core::{CategoryId, CouponId, Money};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use super::RepositoryError;

/// A raw `shop.coupons` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CouponRow {
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
}

impl CouponRow {
    /// Convert the row into the domain coupon.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored kind or
    /// counters are invalid.
    pub fn into_domain(self) -> Result<Coupon, RepositoryError> {
        let kind: CouponKind = self.kind.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("invalid coupon kind in database: {e}"))
        })?;
        let usage_limit = self
            .usage_limit
            .map(u32::try_from)
            .transpose()
            .map_err(|_| {
                RepositoryError::DataCorruption("negative usage_limit in database".to_owned())
            })?;
        let used_count = u32::try_from(self.used_count).map_err(|_| {
            RepositoryError::DataCorruption("negative used_count in database".to_owned())
        })?;

        Ok(Coupon {
            id: self.id,
            code: self.code,
            kind,
            value: self.value,
            min_cart_value: self.min_cart_value,
            max_discount: self.max_discount,
            usage_limit,
            used_count,
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
        })
    }
}

/// Repository for storefront coupon access.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    /// Create a new coupon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up a coupon by code, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure or
    /// `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, RepositoryError> {
        let row = sqlx::query_as::<_, CouponRow>(
            r"
            SELECT id, code, kind, value, min_cart_value, max_discount,
                   usage_limit, used_count, valid_from, valid_till,
                   is_active, applicable_category_ids, first_order_only,
                   free_shipping
            FROM shop.coupons
            WHERE code = $1
            ",
        )
        .bind(normalize_code(code))
        .fetch_optional(self.pool)
        .await?;

        row.map(CouponRow::into_domain).transpose()
    }

    /// Atomically redeem one use of a coupon inside a caller-owned
    /// transaction.
    ///
    /// Returns `false` when the usage limit was already reached (a
    /// concurrent checkout won the last slot) or the coupon was
    /// deactivated meanwhile; the caller rolls back and reports
    /// exhaustion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn redeem(conn: &mut PgConnection, id: CouponId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.coupons
            SET used_count = used_count + 1, updated_at = NOW()
            WHERE id = $1
              AND is_active
              AND (usage_limit IS NULL OR used_count < usage_limit)
            ",
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
