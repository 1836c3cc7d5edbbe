//! The downstream collaborator the dispatcher publishes claimed events to.
//!
//! This crate ships no production broker client — the real sink (Kafka,
//! SQS, a webhook, whatever) is external and specified only by this trait.
//! `NoopEventSink` is the in-memory reference adapter used by tests and by
//! `USE_INMEMORY` deployments.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::Mutex;

use crate::types::OutboxRow;

#[async_trait]
pub trait EventSink: Send + Sync {
    /// Publish one claimed row. The sink must be idempotent on `row.id` —
    /// at-least-once delivery means it may see the same row more than once.
    async fn publish(&self, row: &OutboxRow) -> Result<(), String>;
}

/// In-memory sink: records every delivered row, optionally echoes to
/// stdout, and simulates the latency of a real network call so dispatcher
/// tests exercise realistic interleavings.
pub struct NoopEventSink {
    delivered: Mutex<Vec<OutboxRow>>,
    echo: bool,
}

impl NoopEventSink {
    pub fn new(echo: bool) -> Arc<Self> {
        Arc::new(Self {
            delivered: Mutex::new(Vec::new()),
            echo,
        })
    }

    pub async fn delivered(&self) -> Vec<OutboxRow> {
        self.delivered.lock().await.clone()
    }

    pub async fn delivered_count(&self) -> usize {
        self.delivered.lock().await.len()
    }
}

#[async_trait]
impl EventSink for NoopEventSink {
    async fn publish(&self, row: &OutboxRow) -> Result<(), String> {
        let jitter_ms = rand::thread_rng().gen_range(5..=25);
        tokio::time::sleep(Duration::from_millis(jitter_ms)).await;
        if self.echo {
            tracing::debug!(event_id = %row.id, event_type = %row.event_type, "noop sink delivered event");
        }
        self.delivered.lock().await.push(row.clone());
        Ok(())
    }
}

/// Use-case-facing sink for Postgres-backed deployments.
///
/// `PostgresOrderRepository::save` already appends the same events to the
/// `outbox` table inside the write transaction, and the dispatcher drains
/// that table as the sole delivery path. Handing the use cases this sink
/// instead of the dispatcher's own keeps the write path from delivering
/// each event a second time.
pub struct AlreadyWrittenSink;

#[async_trait]
impl EventSink for AlreadyWrittenSink {
    async fn publish(&self, _row: &OutboxRow) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn sample_row() -> OutboxRow {
        OutboxRow {
            id: Uuid::new_v4(),
            aggregate_type: "Order".to_string(),
            aggregate_id: "OrderCreated".to_string(),
            event_type: "OrderCreated".to_string(),
            payload: json!({}),
            created_at: Utc::now(),
            published_at: None,
        }
    }

    #[tokio::test]
    async fn noop_sink_records_every_delivery() {
        let sink = NoopEventSink::new(false);
        let row = sample_row();
        sink.publish(&row).await.unwrap();
        assert_eq!(sink.delivered_count().await, 1);
    }
}
