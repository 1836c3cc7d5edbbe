//! In-memory order repository used by tests and `USE_INMEMORY` deployments.
//!
//! Mirrors the Postgres implementation's contract (`save` is atomic with
//! respect to readers of this process) without a real transaction — there
//! is only one lock, held for the duration of `save`.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use orders_domain::{Order, OrderEvent, OrderId, OrderItem};

use crate::error::StoreResult;
use crate::repository::OrderRepository;

struct StoredOrder {
    id: OrderId,
    created_at: DateTime<Utc>,
    items: Vec<OrderItem>,
}

/// In-memory order repository. Also records every event handed to `save`
/// so tests can assert on outbox-equivalent behavior (P7) without a
/// database.
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<String, StoredOrder>>,
    recorded_events: RwLock<Vec<OrderEvent>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
            recorded_events: RwLock::new(Vec::new()),
        }
    }

    pub fn recorded_events(&self) -> Vec<OrderEvent> {
        self.recorded_events.read().expect("lock poisoned").clone()
    }

    pub fn clear(&self) {
        self.orders.write().expect("lock poisoned").clear();
        self.recorded_events.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: &Order, events: &[OrderEvent]) -> StoreResult<()> {
        let mut orders = self.orders.write().expect("lock poisoned");
        orders.insert(
            order.id().as_str().to_string(),
            StoredOrder {
                id: order.id().clone(),
                created_at: order.created_at(),
                items: order.items().to_vec(),
            },
        );
        drop(orders);

        self.recorded_events
            .write()
            .expect("lock poisoned")
            .extend_from_slice(events);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Order>> {
        let orders = self.orders.read().expect("lock poisoned");
        Ok(orders
            .get(id)
            .map(|stored| Order::reconstitute(stored.id.clone(), stored.created_at, stored.items.clone())))
    }

    async fn exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.orders.read().expect("lock poisoned").contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orders_domain::{Currency, Money, ProductId, Quantity};
    use rust_decimal_macros::dec;

    fn create_test_order() -> (Order, Vec<OrderEvent>) {
        let mut order = Order::create(None);
        let events = order.pull_domain_events();
        (order, events)
    }

    #[tokio::test]
    async fn save_then_find_round_trips() {
        let repo = InMemoryOrderRepository::new();
        let (order, events) = create_test_order();
        repo.save(&order, &events).await.unwrap();

        let found = repo.find_by_id(order.id().as_str()).await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().id(), order.id());
    }

    #[tokio::test]
    async fn find_by_id_returns_none_when_absent() {
        let repo = InMemoryOrderRepository::new();
        assert!(repo.find_by_id("ORD-MISSING").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn exists_reflects_saved_orders() {
        let repo = InMemoryOrderRepository::new();
        let (order, events) = create_test_order();
        assert!(!repo.exists(order.id().as_str()).await.unwrap());
        repo.save(&order, &events).await.unwrap();
        assert!(repo.exists(order.id().as_str()).await.unwrap());
    }

    #[tokio::test]
    async fn save_records_events_for_later_inspection() {
        let repo = InMemoryOrderRepository::new();
        let (mut order, events) = create_test_order();
        repo.save(&order, &events).await.unwrap();

        order
            .add_item(
                ProductId::create("SKU-1").unwrap(),
                Quantity::create(2).unwrap(),
                Money::create(dec!(10), Currency::Usd).unwrap(),
            )
            .unwrap();
        let more_events = order.pull_domain_events();
        repo.save(&order, &more_events).await.unwrap();

        assert_eq!(repo.recorded_events().len(), 2);
    }

    #[tokio::test]
    async fn save_preserves_items_round_trip() {
        let repo = InMemoryOrderRepository::new();
        let (mut order, events) = create_test_order();
        order
            .add_item(
                ProductId::create("SKU-1").unwrap(),
                Quantity::create(3).unwrap(),
                Money::create(dec!(5), Currency::Usd).unwrap(),
            )
            .unwrap();
        let mut all_events = events;
        all_events.extend(order.pull_domain_events());
        repo.save(&order, &all_events).await.unwrap();

        let found = repo.find_by_id(order.id().as_str()).await.unwrap().unwrap();
        assert_eq!(found.item_count(), 1);
        assert_eq!(found.items()[0].quantity().value(), 3);
    }
}
