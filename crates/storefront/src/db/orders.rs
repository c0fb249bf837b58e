//! Order creation and customer-scoped reads.
//!
//! Order rows are written exactly once, inside the submission transaction,
//! together with their items and the initial status-history entry. After
//! that only the admin's lifecycle operations touch them.

use bagworks_core::checkout::OrderDraft;
use bagworks_core::{CustomerId, OrderId, OrderStatus};
use sqlx::{PgConnection, PgPool};

use super::RepositoryError;
use crate::models::{OrderItemRecord, OrderRecord};

/// Repository for storefront order access.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count a customer's prior non-cancelled orders.
    ///
    /// Used for the first-order coupon restriction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_prior_orders(
        &self,
        customer_id: CustomerId,
    ) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*) FROM shop.orders
            WHERE customer_id = $1 AND status <> 'cancelled'
            ",
        )
        .bind(customer_id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Persist an order draft inside a caller-owned transaction.
    ///
    /// Inserts the order row, its item snapshot, and the initial
    /// `pending` status-history entry. Nothing is committed here; the
    /// caller owns the transaction so coupon redemption and cart clearing
    /// land atomically with the order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn create_in(
        conn: &mut PgConnection,
        draft: &OrderDraft,
        order_number: &str,
    ) -> Result<OrderRecord, RepositoryError> {
        let record = sqlx::query_as::<_, OrderRecord>(
            r"
            INSERT INTO shop.orders
                (order_number, customer_id, status, payment_method, payment_status,
                 ship_name, ship_phone, ship_address_line, ship_address_line2,
                 ship_city, ship_state, ship_pincode,
                 mrp_total, subtotal, product_discount, coupon_discount,
                 shipping, tax, grand_total, coupon_id, coupon_code)
            VALUES ($1, $2, 'pending', $3, 'pending',
                    $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING id, order_number, customer_id, status, payment_method,
                      payment_status, ship_name, ship_phone, ship_address_line,
                      ship_address_line2, ship_city, ship_state, ship_pincode,
                      mrp_total, subtotal, product_discount, coupon_discount,
                      shipping, tax, grand_total, coupon_code, tracking_id,
                      courier_name, created_at, updated_at
            ",
        )
        .bind(order_number)
        .bind(draft.customer_id)
        .bind(draft.payment_method.to_string())
        .bind(&draft.shipping_address.name)
        .bind(&draft.shipping_address.phone)
        .bind(&draft.shipping_address.address_line)
        .bind(&draft.shipping_address.address_line2)
        .bind(&draft.shipping_address.city)
        .bind(&draft.shipping_address.state)
        .bind(&draft.shipping_address.pincode)
        .bind(draft.price.mrp_total)
        .bind(draft.price.subtotal)
        .bind(draft.price.product_discount)
        .bind(draft.price.coupon_discount)
        .bind(draft.price.shipping)
        .bind(draft.price.tax)
        .bind(draft.price.grand_total)
        .bind(draft.coupon.as_ref().map(|c| c.coupon_id))
        .bind(draft.coupon.as_ref().map(|c| c.code.clone()))
        .fetch_one(&mut *conn)
        .await?;

        for item in &draft.items {
            sqlx::query(
                r"
                INSERT INTO shop.order_items
                    (order_id, product_id, name, unit_selling_price, unit_mrp,
                     quantity, selected_color, selected_size, image_ref)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ",
            )
            .bind(record.id)
            .bind(item.product_id)
            .bind(&item.name)
            .bind(item.unit_selling_price)
            .bind(item.unit_mrp)
            .bind(i32::try_from(item.quantity).unwrap_or(i32::MAX))
            .bind(&item.selected_color)
            .bind(&item.selected_size)
            .bind(&item.image_ref)
            .execute(&mut *conn)
            .await?;
        }

        sqlx::query(
            r"
            INSERT INTO shop.order_status_history (order_id, status, actor)
            VALUES ($1, $2, 'storefront')
            ",
        )
        .bind(record.id)
        .bind(OrderStatus::Pending.to_string())
        .execute(&mut *conn)
        .await?;

        Ok(record)
    }

    /// List a customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<OrderRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRecord>(
            r"
            SELECT id, order_number, customer_id, status, payment_method,
                   payment_status, ship_name, ship_phone, ship_address_line,
                   ship_address_line2, ship_city, ship_state, ship_pincode,
                   mrp_total, subtotal, product_discount, coupon_discount,
                   shipping, tax, grand_total, coupon_code, tracking_id,
                   courier_name, created_at, updated_at
            FROM shop.orders
            WHERE customer_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get one of a customer's orders with its item snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_customer(
        &self,
        customer_id: CustomerId,
        id: OrderId,
    ) -> Result<Option<(OrderRecord, Vec<OrderItemRecord>)>, RepositoryError> {
        let record = sqlx::query_as::<_, OrderRecord>(
            r"
            SELECT id, order_number, customer_id, status, payment_method,
                   payment_status, ship_name, ship_phone, ship_address_line,
                   ship_address_line2, ship_city, ship_state, ship_pincode,
                   mrp_total, subtotal, product_discount, coupon_discount,
                   shipping, tax, grand_total, coupon_code, tracking_id,
                   courier_name, created_at, updated_at
            FROM shop.orders
            WHERE id = $1 AND customer_id = $2
            ",
        )
        .bind(id)
        .bind(customer_id)
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

        Ok(Some((record, items)))
    }
}
