use async_trait::async_trait;

use orders_domain::{Order, OrderEvent};

use crate::error::StoreResult;

/// Persistence port for the order aggregate.
///
/// `save` is the transactional-outbox write path: implementations persist
/// the aggregate's current state and the events it produced in one
/// transaction. The trait itself is storage-agnostic — the Postgres
/// implementation is where the transaction actually lives.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist `order`'s current state and enqueue `events` atomically.
    /// `events` is exactly what the caller drained from the aggregate via
    /// `pull_domain_events()` — the repository does not re-derive it.
    async fn save(&self, order: &Order, events: &[OrderEvent]) -> StoreResult<()>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Order>>;

    async fn exists(&self, id: &str) -> StoreResult<bool>;
}
