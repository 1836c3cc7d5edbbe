//! Appends event rows inside the caller's own transaction.
//!
//! There is no separate "outbox commit" — the rows this module inserts
//! become visible (or disappear on rollback) exactly when the caller's
//! transaction does. That's the entire transactional-outbox guarantee.

use orders_domain::OrderEvent;
use sqlx::{Postgres, Transaction};

use crate::types::{OutboxResult, OutboxRow};

/// Insert one event row within `tx`.
pub async fn publish(tx: &mut Transaction<'_, Postgres>, event: &OrderEvent) -> OutboxResult<()> {
    let row = OutboxRow::from_event(event)?;
    sqlx::query(
        r#"
        INSERT INTO outbox (id, aggregate_type, aggregate_id, event_type, payload, created_at, published_at)
        VALUES ($1, $2, $3, $4, $5, $6, NULL)
        "#,
    )
    .bind(row.id)
    .bind(&row.aggregate_type)
    .bind(&row.aggregate_id)
    .bind(&row.event_type)
    .bind(&row.payload)
    .bind(row.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Insert every event in `events`, in order, within `tx`.
pub async fn publish_all(tx: &mut Transaction<'_, Postgres>, events: &[OrderEvent]) -> OutboxResult<()> {
    for event in events {
        publish(tx, event).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orders_domain::OrderId;

    #[test]
    fn aggregate_type_derivation_strips_known_suffixes() {
        let event = OrderEvent::order_created(OrderId::create("ORD-1").unwrap());
        let row = OutboxRow::from_event(&event).unwrap();
        assert_eq!(row.aggregate_type, "Order");
        assert_eq!(row.event_type, "OrderCreated");
        assert_eq!(row.aggregate_id, "OrderCreated");
    }

    // Integration coverage for `publish`/`publish_all` against a live
    // transaction lives in orders-testkit, which owns the seeded pool.
}
