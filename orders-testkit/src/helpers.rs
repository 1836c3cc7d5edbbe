//! Seeding helpers for database-backed tests.

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use anyhow::Result;

/// Insert `count` pending outbox rows directly, bypassing the writer —
/// used to set up dispatcher tests (P8, P9, P10, S6) without going through
/// a use case first.
pub async fn seed_pending_outbox_rows(pool: &PgPool, aggregate_type: &str, count: usize) -> Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO outbox (id, aggregate_type, aggregate_id, event_type, payload, created_at, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, NULL)
            "#,
        )
        .bind(id)
        .bind(aggregate_type)
        .bind("OrderCreated")
        .bind("OrderCreated")
        .bind(json!({"seq": i}))
        .bind(Utc::now())
        .execute(pool)
        .await?;
        ids.push(id);
    }
    Ok(ids)
}

/// Fetch the `published_at` timestamp for a row, for asserting on P8/P9.
pub async fn published_at(pool: &PgPool, id: Uuid) -> Result<Option<DateTime<Utc>>> {
    let row: Option<DateTime<Utc>> = sqlx::query_scalar("SELECT published_at FROM outbox WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(row)
}

/// Count outbox rows that are still unpublished.
pub async fn pending_outbox_count(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM outbox WHERE published_at IS NULL")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
