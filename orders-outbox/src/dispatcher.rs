//! Concurrent, poll-based outbox dispatcher.
//!
//! Each worker is a `tokio::task` that repeatedly claims a batch of pending
//! rows under `FOR UPDATE SKIP LOCKED`, hands them to the sink, and stamps
//! them published — all in one transaction. Workers never see each other's
//! claimed rows, so running N of them in the same process (or N processes
//! against the same table) is safe by construction; this uses the same
//! start/shutdown-token shape as a single-loop poller, generalized to more
//! than one worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use sqlx::PgPool;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::sink::EventSink;
use crate::types::{OutboxResult, OutboxRow, OutboxStats};

#[derive(Debug, Clone, Copy)]
pub struct DispatcherConfig {
    pub batch_size: i64,
    pub poll_interval: Duration,
    pub workers: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            poll_interval: Duration::from_millis(5000),
            workers: 1,
        }
    }
}

pub struct OutboxDispatcher {
    pool: PgPool,
    sink: Arc<dyn EventSink>,
    config: DispatcherConfig,
    shutdown_token: CancellationToken,
    handles: Mutex<Vec<JoinHandle<()>>>,
    started: AtomicBool,
}

impl OutboxDispatcher {
    pub fn new(pool: PgPool, sink: Arc<dyn EventSink>, config: DispatcherConfig) -> Arc<Self> {
        Arc::new(Self {
            pool,
            sink,
            config,
            shutdown_token: CancellationToken::new(),
            handles: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
        })
    }

    /// Spawn `config.workers` poll loops. Idempotent: a second call logs a
    /// warning and returns without spawning anything new.
    pub async fn start(self: &Arc<Self>) {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::warn!("outbox dispatcher already started, ignoring duplicate start()");
            return;
        }

        let mut handles = self.handles.lock().await;
        for worker_id in 0..self.config.workers {
            let dispatcher = Arc::clone(self);
            handles.push(tokio::spawn(async move {
                dispatcher.run_worker(worker_id).await;
            }));
        }
    }

    /// Cooperatively stop every worker: cancel the shared token, then await
    /// each in-flight poll loop to finish its current claim.
    pub async fn stop(&self) {
        self.shutdown_token.cancel();
        let mut handles = self.handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(err) = handle.await {
                tracing::warn!(?err, "outbox worker task panicked during shutdown");
            }
        }
        self.started.store(false, Ordering::SeqCst);
    }

    async fn run_worker(&self, worker_id: usize) {
        tracing::debug!(worker_id, "outbox dispatcher worker starting");
        loop {
            if self.shutdown_token.is_cancelled() {
                break;
            }

            match self.claim_and_publish_batch().await {
                Ok(0) => {
                    tokio::select! {
                        _ = self.shutdown_token.cancelled() => break,
                        _ = tokio::time::sleep(self.config.poll_interval) => {}
                    }
                }
                Ok(processed) => {
                    tracing::debug!(worker_id, processed, "outbox batch drained");
                }
                Err(err) => {
                    tracing::error!(worker_id, %err, "outbox dispatcher batch failed, retrying after backoff");
                    tokio::select! {
                        _ = self.shutdown_token.cancelled() => break,
                        _ = tokio::time::sleep(self.config.poll_interval) => {}
                    }
                }
            }
        }
        tracing::debug!(worker_id, "outbox dispatcher worker stopped");
    }

    /// Claim up to `batch_size` unpublished rows, publish them in order, and
    /// mark them published — all within one transaction. Returns the number
    /// of rows processed (0 means the outbox was empty).
    async fn claim_and_publish_batch(&self) -> OutboxResult<usize> {
        let mut tx = self.pool.begin().await?;

        let rows: Vec<OutboxRow> = sqlx::query_as(
            r#"
            SELECT id, aggregate_type, aggregate_id, event_type, payload, created_at, published_at
            FROM outbox
            WHERE published_at IS NULL
            ORDER BY created_at ASC
            LIMIT $1
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(self.config.batch_size)
        .fetch_all(&mut *tx)
        .await?;

        if rows.is_empty() {
            tx.commit().await?;
            return Ok(0);
        }

        for row in &rows {
            if let Err(reason) = self.sink.publish(row).await {
                tracing::warn!(event_id = %row.id, reason, "outbox sink publish failed, rolling back batch");
                tx.rollback().await?;
                return Err(crate::types::OutboxError::Sink {
                    event_id: row.id,
                    reason,
                });
            }
        }

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        sqlx::query("UPDATE outbox SET published_at = now() WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(rows.len())
    }

    /// Drain the outbox synchronously, claiming batches until one comes
    /// back empty. Used by tests and one-shot invocations.
    pub async fn process_once(&self) -> OutboxResult<usize> {
        let mut total = 0;
        loop {
            let processed = self.claim_and_publish_batch().await?;
            if processed == 0 {
                break;
            }
            total += processed;
        }
        Ok(total)
    }

    pub async fn get_stats(&self) -> OutboxResult<OutboxStats> {
        let row: (i64, i64, Option<chrono::DateTime<Utc>>) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE published_at IS NULL) AS pending,
                COUNT(*) FILTER (WHERE published_at IS NOT NULL) AS published,
                MIN(created_at) FILTER (WHERE published_at IS NULL) AS oldest_pending
            FROM outbox
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(OutboxStats {
            pending_events: row.0,
            published_events: row.1,
            oldest_pending_event: row.2,
        })
    }

    /// Delete published rows older than `older_than_days`. Never touches
    /// unpublished rows. Returns the number of rows deleted.
    pub async fn cleanup_published(&self, older_than_days: i64) -> OutboxResult<u64> {
        let cutoff = Utc::now() - ChronoDuration::days(older_than_days);
        let result = sqlx::query("DELETE FROM outbox WHERE published_at IS NOT NULL AND published_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// Integration coverage against a live database lives in
// tests/dispatcher_integration.rs: claim ordering, concurrent non-duplication,
// cleanup_published's published-only deletion, and get_stats.
