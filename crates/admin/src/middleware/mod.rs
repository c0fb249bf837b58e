//! HTTP middleware and extractors.

pub mod auth;

pub use auth::{RequireStaff, RequireStaffWrite, StaffContext};
