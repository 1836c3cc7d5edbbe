//! Test helpers for database-backed integration tests: schema setup and
//! outbox seeding.

mod helpers;

pub use helpers::{pending_outbox_count, published_at, seed_pending_outbox_rows};

use anyhow::Result;
use sqlx::PgPool;

/// Run migrations against a fresh test database.
pub async fn setup_test_db(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../orders-db/migrations").run(pool).await?;
    Ok(())
}
