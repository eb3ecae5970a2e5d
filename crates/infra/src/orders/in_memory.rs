use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;

use doorsales_core::{DoorId, OrderId};
use doorsales_sales::{Door, Order, OrderDraft};

use super::OrderRepository;
use crate::error::{RepositoryError, lock_poisoned};

#[derive(Debug, Default)]
struct State {
    last_order_id: i64,
    last_door_id: i64,
    orders: BTreeMap<OrderId, Order>,
}

impl State {
    fn next_order_id(&mut self) -> OrderId {
        self.last_order_id += 1;
        OrderId::new(self.last_order_id)
    }

    fn doors_for(&mut self, order_id: OrderId, draft: &OrderDraft) -> Vec<Door> {
        draft
            .doors()
            .iter()
            .map(|spec| {
                self.last_door_id += 1;
                Door::from_spec(DoorId::new(self.last_door_id), order_id, spec)
            })
            .collect()
    }
}

/// In-memory order repository.
///
/// Intended for tests/dev. Every operation runs under a single lock, which
/// gives the same all-or-nothing behavior as a database transaction. Ids are
/// never reused, mirroring serial columns.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    state: RwLock<State>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, draft: &OrderDraft) -> Result<Order, RepositoryError> {
        let mut state = self.state.write().map_err(|_| lock_poisoned())?;

        let id = state.next_order_id();
        let doors = state.doors_for(id, draft);
        let header = draft.header();
        let totals = draft.totals();

        let order = Order {
            id,
            customer: header.customer.clone(),
            phone: header.phone.clone(),
            date: header.date.clone(),
            count: totals.count,
            price: totals.price,
            prepayment: header.prepayment,
            comment: header.comment.clone(),
            status: header.status.clone(),
            created_at: Utc::now(),
            doors,
        };
        state.orders.insert(id, order.clone());

        Ok(order)
    }

    async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let state = self.state.read().map_err(|_| lock_poisoned())?;
        Ok(state.orders.values().rev().cloned().collect())
    }

    async fn get(&self, id: OrderId) -> Result<Order, RepositoryError> {
        let state = self.state.read().map_err(|_| lock_poisoned())?;
        state.orders.get(&id).cloned().ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, id: OrderId, draft: &OrderDraft) -> Result<Order, RepositoryError> {
        let mut state = self.state.write().map_err(|_| lock_poisoned())?;

        if !state.orders.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }

        let doors = state.doors_for(id, draft);
        let header = draft.header();
        let totals = draft.totals();

        let order = state.orders.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        order.customer = header.customer.clone();
        order.phone = header.phone.clone();
        order.date = header.date.clone();
        order.count = totals.count;
        order.price = totals.price;
        order.prepayment = header.prepayment;
        order.comment = header.comment.clone();
        order.status = header.status.clone();
        order.doors = doors;

        Ok(order.clone())
    }

    async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().map_err(|_| lock_poisoned())?;
        state
            .orders
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorsales_core::Decimal;
    use doorsales_sales::{DoorSpec, OrderHeader};

    fn header(customer: &str) -> OrderHeader {
        OrderHeader {
            customer: customer.to_string(),
            phone: "+7 900 111-22-33".to_string(),
            date: "2024-05-01".to_string(),
            prepayment: Decimal::new(100, 0),
            comment: Some("call before delivery".to_string()),
            status: "new".to_string(),
        }
    }

    fn door(model: &str, price: i64, count: i32) -> DoorSpec {
        DoorSpec {
            door_type: "interior".to_string(),
            model: model.to_string(),
            price: Decimal::new(price, 0),
            color: "white".to_string(),
            width: 80,
            height: 200,
            leaf_type: "solid".to_string(),
            count,
        }
    }

    fn draft(customer: &str, doors: Vec<DoorSpec>) -> OrderDraft {
        OrderDraft::new(header(customer), doors).unwrap()
    }

    #[tokio::test]
    async fn create_then_get_round_trips_doors_and_totals() {
        let repo = InMemoryOrderRepository::new();
        let created = repo
            .create(&draft("Anna", vec![door("X", 100, 2), door("Y", 50, 1)]))
            .await
            .unwrap();

        let fetched = repo.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.count, 3);
        assert_eq!(fetched.price, Decimal::new(250, 0));
        assert_eq!(fetched.doors.len(), 2);
        assert!(fetched.doors.iter().all(|d| d.order_id == created.id));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let repo = InMemoryOrderRepository::new();
        assert!(repo.list().await.unwrap().is_empty());

        let first = repo.create(&draft("A", vec![door("X", 1, 1)])).await.unwrap();
        let second = repo.create(&draft("B", vec![door("X", 1, 1)])).await.unwrap();
        let third = repo.create(&draft("C", vec![door("X", 1, 1)])).await.unwrap();

        let ids: Vec<_> = repo.list().await.unwrap().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn update_replaces_doors_wholesale() {
        let repo = InMemoryOrderRepository::new();
        let created = repo
            .create(&draft("Anna", vec![door("A1", 100, 1), door("A2", 100, 1)]))
            .await
            .unwrap();
        let old_door_ids: Vec<_> = created.doors.iter().map(|d| d.id).collect();

        let updated = repo
            .update(created.id, &draft("Anna K.", vec![door("B1", 300, 3)]))
            .await
            .unwrap();

        assert_eq!(updated.customer, "Anna K.");
        assert_eq!(updated.count, 3);
        assert_eq!(updated.price, Decimal::new(900, 0));
        assert_eq!(updated.created_at, created.created_at);

        let fetched = repo.get(created.id).await.unwrap();
        assert_eq!(fetched.doors.len(), 1);
        assert_eq!(fetched.doors[0].model, "B1");
        assert!(fetched.doors.iter().all(|d| !old_door_ids.contains(&d.id)));
    }

    #[tokio::test]
    async fn update_of_missing_order_is_not_found_and_changes_nothing() {
        let repo = InMemoryOrderRepository::new();
        let created = repo.create(&draft("Anna", vec![door("X", 100, 1)])).await.unwrap();

        let err = repo
            .update(OrderId::new(999), &draft("Ghost", vec![door("Y", 1, 1)]))
            .await
            .unwrap_err();
        assert_eq!(err, RepositoryError::NotFound);
        assert_eq!(repo.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn delete_twice_is_ok_then_not_found() {
        let repo = InMemoryOrderRepository::new();
        let created = repo.create(&draft("Anna", vec![door("X", 100, 1)])).await.unwrap();

        assert_eq!(repo.delete(created.id).await, Ok(()));
        assert_eq!(repo.delete(created.id).await, Err(RepositoryError::NotFound));
        assert_eq!(repo.get(created.id).await, Err(RepositoryError::NotFound));
        assert_eq!(repo.delete(OrderId::new(12345)).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let repo = InMemoryOrderRepository::new();
        let a = repo.create(&draft("A", vec![door("X", 1, 1)])).await.unwrap();
        repo.delete(a.id).await.unwrap();
        let b = repo.create(&draft("B", vec![door("X", 1, 1)])).await.unwrap();
        assert!(b.id > a.id);
        assert!(b.doors[0].id > a.doors[0].id);
    }
}
