//! Cart repository.

use bagworks_core::{CartItemId, CategoryId, CustomerId, Money, ProductId};
use sqlx::{PgConnection, PgPool};

use super::RepositoryError;
use crate::models::CartItem;

/// Input for adding an item to the cart.
#[derive(Debug, Clone)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub unit_selling_price: Money,
    pub unit_mrp: Money,
    pub quantity: u32,
    pub selected_color: Option<String>,
    pub selected_size: Option<String>,
    pub image_ref: String,
}

/// Repository for cart operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a customer's cart rows, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, customer_id: CustomerId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItem>(
            r"
            SELECT * FROM shop.cart_items
            WHERE customer_id = $1
            ORDER BY created_at
            ",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Add an item, merging quantities when the product is already carted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        customer_id: CustomerId,
        item: &NewCartItem,
    ) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItem>(
            r"
            INSERT INTO shop.cart_items
                (customer_id, product_id, category_id, name,
                 unit_selling_price, unit_mrp, quantity,
                 selected_color, selected_size, image_ref)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (customer_id, product_id) DO UPDATE
            SET quantity = shop.cart_items.quantity + EXCLUDED.quantity,
                selected_color = EXCLUDED.selected_color,
                selected_size = EXCLUDED.selected_size,
                updated_at = NOW()
            RETURNING *
            ",
        )
        .bind(customer_id)
        .bind(item.product_id)
        .bind(item.category_id)
        .bind(&item.name)
        .bind(item.unit_selling_price)
        .bind(item.unit_mrp)
        .bind(i32::try_from(item.quantity).unwrap_or(i32::MAX))
        .bind(&item.selected_color)
        .bind(&item.selected_size)
        .bind(&item.image_ref)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// Set the quantity on a cart row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row does not exist for
    /// this customer, `RepositoryError::Database` on query failure.
    pub async fn update_quantity(
        &self,
        customer_id: CustomerId,
        id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, RepositoryError> {
        sqlx::query_as::<_, CartItem>(
            r"
            UPDATE shop.cart_items
            SET quantity = $3, updated_at = NOW()
            WHERE id = $1 AND customer_id = $2
            RETURNING *
            ",
        )
        .bind(id)
        .bind(customer_id)
        .bind(i32::try_from(quantity).unwrap_or(i32::MAX))
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Remove a cart row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row does not exist for
    /// this customer, `RepositoryError::Database` on query failure.
    pub async fn remove(
        &self,
        customer_id: CustomerId,
        id: CartItemId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM shop.cart_items
            WHERE id = $1 AND customer_id = $2
            ",
        )
        .bind(id)
        .bind(customer_id)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Empty a customer's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, customer_id: CustomerId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM shop.cart_items WHERE customer_id = $1")
            .bind(customer_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Empty a customer's cart inside a caller-owned transaction.
    ///
    /// Used by order submission so cart clearing commits or rolls back
    /// together with the order insert and coupon redemption.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_in(
        conn: &mut PgConnection,
        customer_id: CustomerId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM shop.cart_items WHERE customer_id = $1")
            .bind(customer_id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
