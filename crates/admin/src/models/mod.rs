//! Row models and response shapes.

pub mod coupon;
pub mod order;
pub mod staff;

pub use coupon::{CouponRecord, CouponResponse};
pub use order::{
    AdminOrderResponse, HistoryRecord, NoteRecord, OrderItemRecord, OrderRecord, OrderSummary,
};
pub use staff::{Staff, StaffRole};
