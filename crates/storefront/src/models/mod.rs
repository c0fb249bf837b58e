//! Row models and response shapes.

pub mod address;
pub mod cart;
pub mod order;

pub use address::{Address, NewAddress};
pub use cart::CartItem;
pub use order::{OrderItemRecord, OrderRecord, OrderResponse, OrderSummary};
