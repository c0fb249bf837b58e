//! Order aggregate and lifecycle engine.
//!
//! An [`Order`] is created once, from an immutable checkout snapshot, and
//! then mutated only through the transition operations here. Status
//! history is append-only; tracking is write-once; notes are always
//! permitted. Payment status is owned by the gateway callback collaborator
//! and only exposed here as a read surface plus an audited manual
//! override.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pricing::{LineItem, PriceBreakdown};
use crate::types::{CustomerId, OrderId, OrderStatus, PaymentMethod, PaymentStatus};

/// The shipping address frozen into an order at submission time.
///
/// Deliberately plain strings: the live address book validates on entry,
/// and later edits to the live address must never reach a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSnapshot {
    pub name: String,
    pub phone: String,
    pub address_line: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// One append-only status history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
    pub at: DateTime<Utc>,
    pub actor: String,
}

/// A timestamped staff note on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderNote {
    pub author: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Write-once shipment tracking details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracking {
    pub tracking_id: String,
    pub courier_name: String,
    pub at: DateTime<Utc>,
}

/// Errors from order lifecycle operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The order is in a terminal status; nothing may follow.
    #[error("order is already in terminal status {status}")]
    AlreadyTerminal {
        /// Current terminal status.
        status: OrderStatus,
    },
    /// The requested edge does not exist in the status graph.
    #[error("cannot transition order from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },
    /// Tracking details were already attached.
    #[error("tracking is already set for this order")]
    TrackingAlreadySet,
}

impl OrderError {
    /// Stable machine-readable code for API responses.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::AlreadyTerminal { .. } => "order_already_terminal",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::TrackingAlreadySet => "tracking_already_set",
        }
    }
}

/// Check a status transition without an order in hand.
///
/// Shared by [`Order::transition`] and the repositories, so the graph is
/// enforced identically wherever a transition is attempted.
///
/// # Errors
///
/// Returns [`OrderError::AlreadyTerminal`] for terminal orders and
/// [`OrderError::InvalidTransition`] for edges outside the graph.
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
    if from.is_terminal() {
        return Err(OrderError::AlreadyTerminal { status: from });
    }
    if !from.can_transition_to(to) {
        return Err(OrderError::InvalidTransition { from, to });
    }
    Ok(())
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    pub items: Vec<LineItem>,
    pub shipping_address: AddressSnapshot,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub price: PriceBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking: Option<Tracking>,
    pub notes: Vec<OrderNote>,
    pub status_history: Vec<StatusChange>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Move the order to `target`, recording the change in history.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::AlreadyTerminal`] if the order is terminal or
    /// [`OrderError::InvalidTransition`] if the edge is not in the graph.
    pub fn transition(
        &mut self,
        target: OrderStatus,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        check_transition(self.status, target)?;
        self.status = target;
        self.status_history.push(StatusChange {
            status: target,
            at: now,
            actor: actor.to_owned(),
        });
        self.updated_at = now;
        Ok(())
    }

    /// Attach shipment tracking details, once.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::TrackingAlreadySet`] on any second attempt.
    pub fn attach_tracking(
        &mut self,
        tracking_id: &str,
        courier_name: &str,
        now: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        if self.tracking.is_some() {
            return Err(OrderError::TrackingAlreadySet);
        }
        self.tracking = Some(Tracking {
            tracking_id: tracking_id.to_owned(),
            courier_name: courier_name.to_owned(),
            at: now,
        });
        self.updated_at = now;
        Ok(())
    }

    /// Append a staff note. Independent of status, always permitted.
    pub fn add_note(&mut self, author: &str, message: &str, now: DateTime<Utc>) {
        self.notes.push(OrderNote {
            author: author.to_owned(),
            message: message.to_owned(),
            at: now,
        });
        self.updated_at = now;
    }

    /// Manually override the payment status for reconciliation.
    ///
    /// The override is always logged as a note for audit.
    pub fn set_payment_status(&mut self, status: PaymentStatus, actor: &str, now: DateTime<Utc>) {
        let previous = self.payment_status;
        self.payment_status = status;
        self.add_note(
            actor,
            &format!("payment status manually changed from {previous} to {status}"),
            now,
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::{Money, ProductId};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 10, 0, 0).unwrap()
    }

    fn sample_order() -> Order {
        let item = LineItem {
            product_id: ProductId::new(1),
            name: "Leather Satchel".to_owned(),
            unit_selling_price: Money::from_rupees_i64(2500),
            unit_mrp: Money::from_rupees_i64(3000),
            quantity: 1,
            selected_color: Some("tan".to_owned()),
            selected_size: None,
            image_ref: "satchel.jpg".to_owned(),
        };
        let price = PriceBreakdown {
            mrp_total: Money::from_rupees_i64(3000),
            subtotal: Money::from_rupees_i64(2500),
            product_discount: Money::from_rupees_i64(500),
            coupon_discount: Money::ZERO,
            shipping: Money::ZERO,
            tax: Money::from_rupees_i64(450),
            grand_total: Money::from_rupees_i64(2950),
        };
        Order {
            id: OrderId::new(1),
            order_number: "ORD-20260601-0001".to_owned(),
            customer_id: Some(CustomerId::new(1)),
            items: vec![item],
            shipping_address: AddressSnapshot {
                name: "Asha Rao".to_owned(),
                phone: "9876543210".to_owned(),
                address_line: "12 MG Road".to_owned(),
                address_line2: None,
                city: "Bengaluru".to_owned(),
                state: "Karnataka".to_owned(),
                pincode: "560001".to_owned(),
            },
            payment_method: PaymentMethod::Upi,
            payment_status: PaymentStatus::Pending,
            status: OrderStatus::Pending,
            price,
            tracking: None,
            notes: vec![],
            status_history: vec![StatusChange {
                status: OrderStatus::Pending,
                at: now(),
                actor: "storefront".to_owned(),
            }],
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn test_happy_path_step_by_step() {
        let mut order = sample_order();
        for target in [
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Packed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            order.transition(target, "staff:1", now()).unwrap();
            assert_eq!(order.status, target);
        }
        // Creation entry plus five transitions.
        assert_eq!(order.status_history.len(), 6);
    }

    #[test]
    fn test_direct_delivery_rejected() {
        let mut order = sample_order();
        assert_eq!(
            order.transition(OrderStatus::Delivered, "staff:1", now()),
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered,
            })
        );
        // Nothing recorded on rejection.
        assert_eq!(order.status_history.len(), 1);
    }

    #[test]
    fn test_terminal_order_rejects_everything() {
        let mut order = sample_order();
        order.transition(OrderStatus::Cancelled, "staff:1", now()).unwrap();
        assert_eq!(
            order.transition(OrderStatus::Confirmed, "staff:1", now()),
            Err(OrderError::AlreadyTerminal {
                status: OrderStatus::Cancelled,
            })
        );
    }

    #[test]
    fn test_returned_then_refunded() {
        let mut order = sample_order();
        order.transition(OrderStatus::Returned, "staff:1", now()).unwrap();
        order.transition(OrderStatus::Refunded, "staff:1", now()).unwrap();
        assert_eq!(order.status, OrderStatus::Refunded);
    }

    #[test]
    fn test_tracking_is_write_once() {
        let mut order = sample_order();
        order
            .attach_tracking("AWB123456", "BlueDart", now())
            .unwrap();
        assert_eq!(
            order.attach_tracking("AWB999999", "Delhivery", now()),
            Err(OrderError::TrackingAlreadySet)
        );
        let tracking = order.tracking.unwrap();
        assert_eq!(tracking.tracking_id, "AWB123456");
        assert_eq!(tracking.courier_name, "BlueDart");
    }

    #[test]
    fn test_notes_always_permitted() {
        let mut order = sample_order();
        order.transition(OrderStatus::Cancelled, "staff:1", now()).unwrap();
        order.add_note("staff:2", "customer requested cancellation", now());
        assert_eq!(order.notes.len(), 1);
    }

    #[test]
    fn test_payment_override_is_audited() {
        let mut order = sample_order();
        order.set_payment_status(PaymentStatus::Paid, "staff:1", now());
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        let note = order.notes.first().unwrap();
        assert!(note.message.contains("pending"));
        assert!(note.message.contains("paid"));
    }

    #[test]
    fn test_check_transition_matches_graph() {
        assert!(check_transition(OrderStatus::Pending, OrderStatus::Confirmed).is_ok());
        assert!(matches!(
            check_transition(OrderStatus::Delivered, OrderStatus::Refunded),
            Err(OrderError::AlreadyTerminal { .. })
        ));
        assert!(matches!(
            check_transition(OrderStatus::Pending, OrderStatus::Shipped),
            Err(OrderError::InvalidTransition { .. })
        ));
    }
}
