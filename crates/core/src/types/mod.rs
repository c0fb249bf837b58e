//! Core domain types.
//!
//! Newtype wrappers that make invalid states unrepresentable: typed IDs,
//! fixed-point money, validated contact fields, and status enums.

pub mod contact;
pub mod id;
pub mod money;
pub mod status;

pub use contact::{Phone, PhoneError, Pincode, PincodeError};
pub use id::*;
pub use money::{Money, MoneyError};
pub use status::{OrderStatus, PaymentMethod, PaymentStatus};
