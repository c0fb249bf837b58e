//! Order row models and the back-office response shapes.

use bagworks_core::order::{AddressSnapshot, OrderNote, StatusChange, Tracking};
use bagworks_core::pricing::{LineItem, PriceBreakdown};
use bagworks_core::{
    CouponId, CustomerId, Money, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::RepositoryError;

/// A raw `shop.orders` row as the back office sees it.
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
    pub coupon_id: Option<CouponId>,
    pub coupon_code: Option<String>,
    pub tracking_id: Option<String>,
    pub courier_name: Option<String>,
    pub tracking_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Parse the stored order status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` on a bad stored value.
    pub fn order_status(&self) -> Result<OrderStatus, RepositoryError> {
        self.status.parse().map_err(RepositoryError::DataCorruption)
    }

    fn tracking(&self) -> Option<Tracking> {
        match (&self.tracking_id, &self.courier_name, self.tracking_at) {
            (Some(tracking_id), Some(courier_name), Some(at)) => Some(Tracking {
                tracking_id: tracking_id.clone(),
                courier_name: courier_name.clone(),
                at,
            }),
            _ => None,
        }
    }
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
    fn line_item(&self) -> LineItem {
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

/// A raw `shop.order_status_history` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HistoryRecord {
    pub status: String,
    pub actor: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    fn status_change(&self) -> Result<StatusChange, RepositoryError> {
        Ok(StatusChange {
            status: self
                .status
                .parse()
                .map_err(RepositoryError::DataCorruption)?,
            at: self.created_at,
            actor: self.actor.clone(),
        })
    }
}

/// A raw `shop.order_notes` row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct NoteRecord {
    pub author: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl NoteRecord {
    fn note(&self) -> OrderNote {
        OrderNote {
            author: self.author.clone(),
            message: self.message.clone(),
            at: self.created_at,
        }
    }
}

/// A lightweight order listing row for the console.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: String,
    pub customer_id: Option<CustomerId>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub grand_total: Money,
    pub created_at: DateTime<Utc>,
}

/// The full back-office order shape.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOrderResponse {
    pub id: OrderId,
    pub order_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub items: Vec<LineItem>,
    pub shipping_address: AddressSnapshot,
    pub price: PriceBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<Tracking>,
    pub status_history: Vec<StatusChange>,
    pub notes: Vec<OrderNote>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Project the row into a listing summary.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` on a bad stored value.
    pub fn summary(&self) -> Result<OrderSummary, RepositoryError> {
        Ok(OrderSummary {
            id: self.id,
            order_number: self.order_number.clone(),
            customer_id: self.customer_id,
            status: self.order_status()?,
            payment_status: self
                .payment_status
                .parse()
                .map_err(RepositoryError::DataCorruption)?,
            payment_method: self
                .payment_method
                .parse()
                .map_err(RepositoryError::DataCorruption)?,
            grand_total: self.grand_total,
            created_at: self.created_at,
        })
    }

    /// Assemble the full back-office shape from the row and its
    /// satellites.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` on a bad stored value.
    pub fn into_response(
        self,
        items: &[OrderItemRecord],
        history: &[HistoryRecord],
        notes: &[NoteRecord],
    ) -> Result<AdminOrderResponse, RepositoryError> {
        let status = self.order_status()?;
        let payment_status: PaymentStatus = self
            .payment_status
            .parse()
            .map_err(RepositoryError::DataCorruption)?;
        let payment_method: PaymentMethod = self
            .payment_method
            .parse()
            .map_err(RepositoryError::DataCorruption)?;
        let status_history = history
            .iter()
            .map(HistoryRecord::status_change)
            .collect::<Result<Vec<_>, _>>()?;
        let tracking = self.tracking();

        Ok(AdminOrderResponse {
            id: self.id,
            order_number: self.order_number,
            customer_id: self.customer_id,
            status,
            payment_status,
            payment_method,
            items: items.iter().map(OrderItemRecord::line_item).collect(),
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
            tracking,
            status_history,
            notes: notes.iter().map(NoteRecord::note).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
