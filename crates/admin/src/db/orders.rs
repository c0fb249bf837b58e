//! Order lifecycle repository.
//!
//! The authoritative mutation surface for placed orders. Every transition
//! runs in a transaction that locks the order row (`SELECT ... FOR
//! UPDATE`), so two concurrent transitions on the same order serialize;
//! transitions on different orders proceed independently. The status
//! graph itself is [`bagworks_core::order::check_transition`] - the same
//! check the domain aggregate uses.

use bagworks_core::order::{OrderError, check_transition};
use bagworks_core::{OrderId, OrderStatus, PaymentStatus};
use serde::Serialize;
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{HistoryRecord, NoteRecord, OrderItemRecord, OrderRecord};

/// Errors from lifecycle operations: storage failures or rejected
/// domain rules.
#[derive(Debug, thiserror::Error)]
pub enum OrderOpError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Lifecycle(#[from] OrderError),
}

impl From<sqlx::Error> for OrderOpError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

impl From<OrderOpError> for crate::error::AppError {
    fn from(err: OrderOpError) -> Self {
        match err {
            OrderOpError::Repository(e) => Self::Repository(e),
            OrderOpError::Lifecycle(e) => Self::Lifecycle(e),
        }
    }
}

/// Per-order outcome of a bulk transition.
#[derive(Debug, Serialize)]
pub struct BulkTransitionResult {
    pub order_id: OrderId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BulkTransitionError>,
}

/// Error detail for a failed bulk entry.
#[derive(Debug, Serialize)]
pub struct BulkTransitionError {
    pub code: String,
    pub message: String,
}

/// Listing filters for the order console.
#[derive(Debug, Default, Clone)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub page: u32,
    pub per_page: u32,
}

const ORDER_COLUMNS: &str = r"
    id, order_number, customer_id, status, payment_method, payment_status,
    ship_name, ship_phone, ship_address_line, ship_address_line2,
    ship_city, ship_state, ship_pincode,
    mrp_total, subtotal, product_discount, coupon_discount,
    shipping, tax, grand_total, coupon_id, coupon_code,
    tracking_id, courier_name, tracking_at, created_at, updated_at
";

/// Repository for the order console.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders with optional status filters, newest first.
    ///
    /// Returns the page of records plus the total matching count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &OrderFilter,
    ) -> Result<(Vec<OrderRecord>, i64), RepositoryError> {
        let page = filter.page.max(1);
        let per_page = filter.per_page.clamp(1, 100);
        let status = filter.status.map(|s| s.to_string());
        let payment_status = filter.payment_status.map(|s| s.to_string());

        let records = sqlx::query_as::<_, OrderRecord>(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM shop.orders
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::TEXT IS NULL OR payment_status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "
        ))
        .bind(&status)
        .bind(&payment_status)
        .bind(i64::from(per_page))
        .bind(i64::from(page - 1) * i64::from(per_page))
        .fetch_all(self.pool)
        .await?;

        let (total,): (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*) FROM shop.orders
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::TEXT IS NULL OR payment_status = $2)
            ",
        )
        .bind(&status)
        .bind(&payment_status)
        .fetch_one(self.pool)
        .await?;

        Ok((records, total))
    }

    /// Load one order with its items, history, and notes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(
        &self,
        id: OrderId,
    ) -> Result<
        Option<(
            OrderRecord,
            Vec<OrderItemRecord>,
            Vec<HistoryRecord>,
            Vec<NoteRecord>,
        )>,
        RepositoryError,
    > {
        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRecord>(
            r"
            SELECT product_id, name, unit_selling_price, unit_mrp, quantity,
                   selected_color, selected_size, image_ref
            FROM shop.order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let history = sqlx::query_as::<_, HistoryRecord>(
            r"
            SELECT status, actor, created_at
            FROM shop.order_status_history
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let notes = sqlx::query_as::<_, NoteRecord>(
            r"
            SELECT author, message, created_at
            FROM shop.order_notes
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some((record, items, history, notes)))
    }

    /// Move an order to `target`, appending to its status history.
    ///
    /// The order row is locked for the duration of the transaction, so
    /// concurrent transitions on the same order serialize and each one
    /// validates against the status the previous one left behind.
    ///
    /// # Errors
    ///
    /// Returns `OrderOpError::Lifecycle` for graph violations
    /// (`order_already_terminal`, `invalid_transition`) and
    /// `OrderOpError::Repository` for storage failures or unknown orders.
    pub async fn transition(
        &self,
        id: OrderId,
        target: OrderStatus,
        actor: &str,
    ) -> Result<OrderRecord, OrderOpError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(String,)> =
            sqlx::query_as("SELECT status FROM shop.orders WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let (current,) = row.ok_or(RepositoryError::NotFound)?;
        let current: OrderStatus = current
            .parse()
            .map_err(RepositoryError::DataCorruption)?;

        check_transition(current, target)?;

        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            r"
            UPDATE shop.orders
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(target.to_string())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO shop.order_status_history (order_id, status, actor)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(id)
        .bind(target.to_string())
        .bind(actor)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(order_id = %id, from = %current, to = %target, actor, "Order transitioned");
        Ok(record)
    }

    /// Apply a transition to each order independently.
    ///
    /// One order's failure never aborts the rest; every entry gets its own
    /// success flag and, on failure, the specific error code and message.
    pub async fn bulk_transition(
        &self,
        ids: &[OrderId],
        target: OrderStatus,
        actor: &str,
    ) -> Vec<BulkTransitionResult> {
        let mut results = Vec::with_capacity(ids.len());
        for &id in ids {
            let outcome = self.transition(id, target, actor).await;
            results.push(match outcome {
                Ok(_) => BulkTransitionResult {
                    order_id: id,
                    success: true,
                    error: None,
                },
                Err(err) => BulkTransitionResult {
                    order_id: id,
                    success: false,
                    error: Some(bulk_error(&err)),
                },
            });
        }
        results
    }

    /// Attach tracking details, once per order.
    ///
    /// The guarded `UPDATE` only matches rows without tracking, so the
    /// write-once rule holds under concurrency.
    ///
    /// # Errors
    ///
    /// Returns `OrderOpError::Lifecycle(TrackingAlreadySet)` on a second
    /// attempt, `OrderOpError::Repository(NotFound)` for unknown orders.
    pub async fn attach_tracking(
        &self,
        id: OrderId,
        tracking_id: &str,
        courier_name: &str,
    ) -> Result<OrderRecord, OrderOpError> {
        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            r"
            UPDATE shop.orders
            SET tracking_id = $2, courier_name = $3, tracking_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND tracking_id IS NULL
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(tracking_id)
        .bind(courier_name)
        .fetch_optional(self.pool)
        .await?;

        if let Some(record) = record {
            tracing::info!(order_id = %id, tracking_id, courier_name, "Tracking attached");
            return Ok(record);
        }

        // No row updated: the order is missing or tracking is already set.
        let exists: Option<(Option<String>,)> =
            sqlx::query_as("SELECT tracking_id FROM shop.orders WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        match exists {
            None => Err(RepositoryError::NotFound.into()),
            Some(_) => Err(OrderError::TrackingAlreadySet.into()),
        }
    }

    /// Append a staff note. Independent of status, always permitted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for unknown orders and
    /// `RepositoryError::Database` for other failures.
    pub async fn add_note(
        &self,
        id: OrderId,
        author: &str,
        message: &str,
    ) -> Result<NoteRecord, RepositoryError> {
        let note = sqlx::query_as::<_, NoteRecord>(
            r"
            INSERT INTO shop.order_notes (order_id, author, message)
            VALUES ($1, $2, $3)
            RETURNING author, message, created_at
            ",
        )
        .bind(id)
        .bind(author)
        .bind(message)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;
        Ok(note)
    }

    /// Manually override the payment status for reconciliation.
    ///
    /// The override is always logged as a note for audit, in the same
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for unknown orders and
    /// `RepositoryError::Database` for other failures.
    pub async fn set_payment_status(
        &self,
        id: OrderId,
        status: PaymentStatus,
        actor: &str,
    ) -> Result<OrderRecord, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(String,)> =
            sqlx::query_as("SELECT payment_status FROM shop.orders WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let (previous,) = row.ok_or(RepositoryError::NotFound)?;

        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            r"
            UPDATE shop.orders
            SET payment_status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status.to_string())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO shop.order_notes (order_id, author, message)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(id)
        .bind(actor)
        .bind(format!(
            "payment status manually changed from {previous} to {status}"
        ))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(order_id = %id, from = %previous, to = %status, actor, "Payment status overridden");
        Ok(record)
    }
}

fn bulk_error(err: &OrderOpError) -> BulkTransitionError {
    match err {
        OrderOpError::Lifecycle(e) => BulkTransitionError {
            code: e.code().to_string(),
            message: e.to_string(),
        },
        OrderOpError::Repository(RepositoryError::NotFound) => BulkTransitionError {
            code: "not_found".to_string(),
            message: "order not found".to_string(),
        },
        OrderOpError::Repository(e) => BulkTransitionError {
            code: "internal".to_string(),
            message: e.to_string(),
        },
    }
}
