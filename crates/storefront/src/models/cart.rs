//! Cart row model.

use bagworks_core::pricing::LineItem;
use bagworks_core::{CartItemId, CategoryId, CustomerId, Money, ProductId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A server-held cart row.
///
/// Prices are snapshotted when the item is added; checkout prices from
/// these rows, not the live catalog.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartItem {
    pub id: CartItemId,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub unit_selling_price: Money,
    pub unit_mrp: Money,
    pub quantity: i32,
    pub selected_color: Option<String>,
    pub selected_size: Option<String>,
    pub image_ref: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartItem {
    /// Project the row into a pricing line item.
    #[must_use]
    pub fn line_item(&self) -> LineItem {
        LineItem {
            product_id: self.product_id,
            name: self.name.clone(),
            unit_selling_price: self.unit_selling_price,
            unit_mrp: self.unit_mrp,
            quantity: u32::try_from(self.quantity).unwrap_or(0),
            selected_color: self.selected_color.clone(),
            selected_size: self.selected_size.clone(),
            image_ref: self.image_ref.clone(),
        }
    }
}
