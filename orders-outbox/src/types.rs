//! Row shapes and errors for the outbox table.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use orders_domain::OrderEvent;

/// One row of the `outbox` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OutboxRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl OutboxRow {
    /// Derive `aggregate_type` from an event's own type string by stripping
    /// one of the known suffixes. A fragile, deliberately-preserved
    /// heuristic — see `DESIGN.md` on the class-name-derived aggregate
    /// type this crate reimplements without runtime reflection.
    pub fn aggregate_type_for(event_type: &str) -> String {
        const SUFFIXES: &[&str] = &[
            "Created", "Updated", "Deleted", "Added", "Removed", "Changed", "Increased", "Decreased",
        ];
        for suffix in SUFFIXES {
            if let Some(stripped) = event_type.strip_suffix(suffix) {
                if !stripped.is_empty() {
                    return stripped.to_string();
                }
            }
        }
        event_type.to_string()
    }

    pub fn from_event(event: &OrderEvent) -> Result<Self, OutboxError> {
        let event_type = event.event_type().to_string();
        Ok(Self {
            id: Uuid::new_v4(),
            aggregate_type: Self::aggregate_type_for(&event_type),
            aggregate_id: event.aggregate_id(),
            event_type,
            payload: serde_json::to_value(event.to_primitives())?,
            created_at: Utc::now(),
            published_at: None,
        })
    }
}

/// Aggregate counts surfaced by [`crate::dispatcher::OutboxDispatcher::get_stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutboxStats {
    pub pending_events: i64,
    pub published_events: i64,
    pub oldest_pending_event: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum OutboxError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to serialize event payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("sink failed to publish event {event_id}: {reason}")]
    Sink { event_id: Uuid, reason: String },
}

pub type OutboxResult<T> = Result<T, OutboxError>;
