//! Address row model.

use bagworks_core::order::AddressSnapshot;
use bagworks_core::{AddressId, CustomerId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A stored address-book entry.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Address {
    pub id: AddressId,
    pub customer_id: CustomerId,
    pub name: String,
    pub phone: String,
    pub address_line: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    /// Freeze this address into an order snapshot.
    #[must_use]
    pub fn snapshot(&self) -> AddressSnapshot {
        AddressSnapshot {
            name: self.name.clone(),
            phone: self.phone.clone(),
            address_line: self.address_line.clone(),
            address_line2: self.address_line2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            pincode: self.pincode.clone(),
        }
    }
}

/// Validated input for creating an address.
///
/// Built by the route handler after `Phone`/`Pincode` parsing; the stored
/// row keeps plain strings.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub name: String,
    pub phone: String,
    pub address_line: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub is_default: bool,
}
