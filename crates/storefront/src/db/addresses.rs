//! Address repository.
//!
//! Maintains the at-most-one-default invariant with a clear-then-set
//! sequence inside a single transaction; a partial unique index on
//! `(customer_id) WHERE is_default` backs the same invariant in the
//! database.

use bagworks_core::{AddressId, CustomerId};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{Address, NewAddress};

/// Repository for address-book operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a customer's addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, customer_id: CustomerId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, Address>(
            r"
            SELECT * FROM shop.addresses
            WHERE customer_id = $1
            ORDER BY is_default DESC, created_at DESC
            ",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get one of a customer's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        customer_id: CustomerId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, Address>(
            r"
            SELECT * FROM shop.addresses
            WHERE id = $1 AND customer_id = $2
            ",
        )
        .bind(id)
        .bind(customer_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Insert a new address.
    ///
    /// When the new address is marked default, every other default for the
    /// same customer is cleared first, in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn insert(
        &self,
        customer_id: CustomerId,
        new: &NewAddress,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if new.is_default {
            sqlx::query(
                r"
                UPDATE shop.addresses
                SET is_default = FALSE, updated_at = NOW()
                WHERE customer_id = $1 AND is_default
                ",
            )
            .bind(customer_id)
            .execute(&mut *tx)
            .await?;
        }

        let address = sqlx::query_as::<_, Address>(
            r"
            INSERT INTO shop.addresses
                (customer_id, name, phone, address_line, address_line2,
                 city, state, pincode, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            ",
        )
        .bind(customer_id)
        .bind(&new.name)
        .bind(&new.phone)
        .bind(&new.address_line)
        .bind(&new.address_line2)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.pincode)
        .bind(new.is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(address)
    }

    /// Make an existing address the customer's default.
    ///
    /// No-op if the address is already default. The clear and the set run
    /// in one transaction so concurrent calls cannot leave zero or two
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist
    /// for this customer, `RepositoryError::Database` on query failure.
    pub async fn set_default(
        &self,
        customer_id: CustomerId,
        id: AddressId,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            UPDATE shop.addresses
            SET is_default = FALSE, updated_at = NOW()
            WHERE customer_id = $1 AND is_default AND id <> $2
            ",
        )
        .bind(customer_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let address = sqlx::query_as::<_, Address>(
            r"
            UPDATE shop.addresses
            SET is_default = TRUE, updated_at = NOW()
            WHERE id = $1 AND customer_id = $2
            RETURNING *
            ",
        )
        .bind(id)
        .bind(customer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(address)
    }
}
