//! `doorsales-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod money;

pub use error::{DomainError, DomainResult};
pub use id::{DoorId, OrderId, UserId};
pub use money::{normalize_money, Decimal, MAX_MONEY, MONEY_SCALE};
