//! Database lifecycle management: pool construction, migration running, and
//! status checking.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{info, warn};

pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Process-wide connection pool defaults: bounded size, a short idle
/// timeout so the pool sheds unused connections, and a connect timeout so
/// acquiring a client never blocks indefinitely.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .idle_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Run all pending migrations from the `migrations/` directory.
/// Idempotent: every migration uses `IF NOT EXISTS`, so re-running is a
/// no-op beyond sqlx's own migration bookkeeping.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    info!("running database migrations");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("migrations completed successfully");
    Ok(())
}

/// Check database connectivity and report applied migration versions.
pub async fn status(pool: &PgPool) -> Result<()> {
    let result: i64 = sqlx::query_scalar("SELECT 1").fetch_one(pool).await?;
    if result != 1 {
        return Err(anyhow::anyhow!("database connectivity check failed"));
    }
    info!("database connectivity: OK");

    let rows = sqlx::query(
        r#"
        SELECT version, description, success
        FROM _sqlx_migrations
        ORDER BY version DESC
        LIMIT 10
        "#,
    )
    .fetch_all(pool)
    .await;

    match rows {
        Ok(migrations) if !migrations.is_empty() => {
            info!("latest migrations:");
            for row in migrations {
                let version: i64 = row.get("version");
                let description: String = row.get("description");
                let success: bool = row.get("success");
                info!("  {} v{}: {}", if success { "\u{2713}" } else { "\u{2717}" }, version, description);
            }
        }
        Ok(_) => warn!("no migrations recorded yet (run `ordersd db migrate` first)"),
        Err(err) if err.to_string().contains("_sqlx_migrations") => {
            warn!("migration table not found (run `ordersd db migrate` first)");
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
