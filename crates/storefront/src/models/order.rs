//! Order row models and the customer-facing response shape.

use bagworks_core::order::AddressSnapshot;
use bagworks_core::pricing::{LineItem, PriceBreakdown};
use bagworks_core::{
    CustomerId, Money, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::RepositoryError;

/// A raw `shop.orders` row.
///
/// Status columns stay as text here; [`OrderRecord::into_response`] parses
/// them, reporting bad stored values as data corruption.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRecord {
    pub id: OrderId,
    pub order_number: String,
    pub customer_id: Option<CustomerId>,
    pub status: String,
    pub payment_method: String,
    pub payment_status: String,
    pub ship_name: String,
    pub ship_phone: String,
    pub ship_address_line: String,
    pub ship_address_line2: Option<String>,
    pub ship_city: String,
    pub ship_state: String,
    pub ship_pincode: String,
    pub mrp_total: Money,
    pub subtotal: Money,
    pub product_discount: Money,
    pub coupon_discount: Money,
    pub shipping: Money,
    pub tax: Money,
    pub grand_total: Money,
    pub coupon_code: Option<String>,
    pub tracking_id: Option<String>,
    pub courier_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A raw `shop.order_items` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItemRecord {
    pub product_id: ProductId,
    pub name: String,
    pub unit_selling_price: Money,
    pub unit_mrp: Money,
    pub quantity: i32,
    pub selected_color: Option<String>,
    pub selected_size: Option<String>,
    pub image_ref: String,
}

impl OrderItemRecord {
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

/// The customer-facing order shape.
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub items: Vec<LineItem>,
    pub shipping_address: AddressSnapshot,
    pub price: PriceBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A lightweight order listing row.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub grand_total: Money,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Project the row into a listing summary.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a stored status fails
    /// to parse.
    pub fn summary(&self) -> Result<OrderSummary, RepositoryError> {
        Ok(OrderSummary {
            id: self.id,
            order_number: self.order_number.clone(),
            status: self
                .status
                .parse()
                .map_err(RepositoryError::DataCorruption)?,
            payment_status: self
                .payment_status
                .parse()
                .map_err(RepositoryError::DataCorruption)?,
            grand_total: self.grand_total,
            created_at: self.created_at,
        })
    }

    /// Assemble the response shape from the row and its item snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a stored status or
    /// payment method fails to parse.
    pub fn into_response(self, items: Vec<LineItem>) -> Result<OrderResponse, RepositoryError> {
        let status: OrderStatus = self
            .status
            .parse()
            .map_err(RepositoryError::DataCorruption)?;
        let payment_status: PaymentStatus = self
            .payment_status
            .parse()
            .map_err(RepositoryError::DataCorruption)?;
        let payment_method: PaymentMethod = self
            .payment_method
            .parse()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(OrderResponse {
            id: self.id,
            order_number: self.order_number,
            status,
            payment_method,
            payment_status,
            items,
            shipping_address: AddressSnapshot {
                name: self.ship_name,
                phone: self.ship_phone,
                address_line: self.ship_address_line,
                address_line2: self.ship_address_line2,
                city: self.ship_city,
                state: self.ship_state,
                pincode: self.ship_pincode,
            },
            price: PriceBreakdown {
                mrp_total: self.mrp_total,
                subtotal: self.subtotal,
                product_discount: self.product_discount,
                coupon_discount: self.coupon_discount,
                shipping: self.shipping,
                tax: self.tax,
                grand_total: self.grand_total,
            },
            coupon_code: self.coupon_code,
            tracking_id: self.tracking_id,
            courier_name: self.courier_name,
            created_at: self.created_at,
        })
    }
}
