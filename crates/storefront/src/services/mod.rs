//! Application services composing repositories and the domain engine.

pub mod checkout;

pub use checkout::CheckoutService;
