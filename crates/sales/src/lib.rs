//! Door sales orders domain module.
//!
//! This crate contains business rules for orders and their door line items,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod aggregate;
pub mod order;

pub use aggregate::{LineItem, OrderTotals, aggregate};
pub use order::{Door, DoorSpec, Order, OrderDraft, OrderHeader};
