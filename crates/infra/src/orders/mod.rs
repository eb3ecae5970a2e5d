//! Order persistence.

use std::sync::Arc;

use doorsales_core::OrderId;
use doorsales_sales::{Order, OrderDraft};

use crate::error::RepositoryError;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryOrderRepository;
pub use postgres::PostgresOrderRepository;

/// Orders with their doors.
///
/// Implementations must:
/// - write an order and its doors atomically (all or nothing)
/// - on update, save the order row, delete its doors, and insert the new
///   doors as one atomic step; a failure leaves the previous state untouched
/// - remove an order's doors together with the order
/// - return orders as committed (re-read after writes)
#[async_trait::async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, draft: &OrderDraft) -> Result<Order, RepositoryError>;

    /// All orders, newest (highest id) first.
    async fn list(&self) -> Result<Vec<Order>, RepositoryError>;

    async fn get(&self, id: OrderId) -> Result<Order, RepositoryError>;

    async fn update(&self, id: OrderId, draft: &OrderDraft) -> Result<Order, RepositoryError>;

    /// `NotFound` when no order with this id exists.
    async fn delete(&self, id: OrderId) -> Result<(), RepositoryError>;
}

#[async_trait::async_trait]
impl<S> OrderRepository for Arc<S>
where
    S: OrderRepository + ?Sized,
{
    async fn create(&self, draft: &OrderDraft) -> Result<Order, RepositoryError> {
        (**self).create(draft).await
    }

    async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        (**self).list().await
    }

    async fn get(&self, id: OrderId) -> Result<Order, RepositoryError> {
        (**self).get(id).await
    }

    async fn update(&self, id: OrderId, draft: &OrderDraft) -> Result<Order, RepositoryError> {
        (**self).update(id, draft).await
    }

    async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        (**self).delete(id).await
    }
}
