//! Orders daemon.
//!
//! # Usage
//!
//! ```bash
//! ordersd
//! ordersd db migrate
//! ordersd db status
//! ```
//!
//! # Environment Variables
//!
//! - `APP_ENV`: development, production, or test (default: development)
//! - `PORT`: HTTP port (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required unless USE_INMEMORY)
//! - `USE_INMEMORY`: use the in-memory repository and outbox instead of Postgres
//! - `LOG_LEVEL`: trace, debug, info, warn, error, or fatal (default: info)
//! - `OUTBOX_BATCH_SIZE`: rows claimed per dispatcher poll (default: 10)
//! - `OUTBOX_POLL_INTERVAL_MS`: sleep between empty polls (default: 5000)
//! - `OUTBOX_WORKERS`: concurrent dispatcher poll loops (default: 1)
//! - `PRICING_BASE_URL`: optional, logged but not called by the bundled catalog adapter

mod db;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ordersd::{Config, Daemon};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "db" {
        return db::run_db_command(args).await;
    }

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(config.environment.to_string() != "production"))
        .with(EnvFilter::new(config.log_level.replace("fatal", "error")))
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        port = config.port,
        "orders daemon starting"
    );

    let daemon = Daemon::new(config).await?;
    daemon.run().await?;

    Ok(())
}
