//! Runtime orchestrator: wires ports to adapters, serves HTTP, and runs the
//! outbox dispatcher until a shutdown signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;

use orders_app::{AddItemToOrder, CreateOrder, StaticPricingCatalog, SystemClock, TracingLogger};
use orders_outbox::{AlreadyWrittenSink, DispatcherConfig, EventSink, NoopEventSink, OutboxDispatcher};
use orders_store::{InMemoryOrderRepository, OrderRepository, PostgresOrderRepository};

use crate::api::{create_router, ApiState};
use crate::config::Config;
use crate::error::{DaemonError, DaemonResult};

pub struct Daemon {
    config: Config,
    pool: Option<PgPool>,
}

impl Daemon {
    pub async fn new(config: Config) -> DaemonResult<Self> {
        let pool = if config.use_inmemory {
            None
        } else {
            let url = config
                .database_url
                .as_deref()
                .expect("Config::from_env guarantees DATABASE_URL when not in-memory");
            let pool = orders_db::connect(url)
                .await
                .map_err(|err| DaemonError::Config(vec![err.to_string()]))?;
            Some(pool)
        };

        Ok(Self { config, pool })
    }

    /// Run until SIGINT/SIGTERM: serve HTTP, run the outbox dispatcher (when
    /// backed by Postgres), then shut both down cooperatively.
    pub async fn run(self) -> DaemonResult<()> {
        info!(
            environment = %self.config.environment,
            port = self.config.port,
            use_inmemory = self.config.use_inmemory,
            "starting orders daemon"
        );

        if let Some(pool) = &self.pool {
            orders_db::migrate(pool).await.map_err(|err| DaemonError::Config(vec![err.to_string()]))?;
        }

        let repository: Arc<dyn OrderRepository> = match &self.pool {
            Some(pool) => Arc::new(PostgresOrderRepository::new(pool.clone())),
            None => Arc::new(InMemoryOrderRepository::new()),
        };

        // The dispatcher sink is the only delivery path once Postgres is
        // backing the repository: `PostgresOrderRepository::save` already
        // appended these events to the `outbox` table, and the dispatcher
        // drains it. The use cases get a no-op sink in that configuration
        // so the same event isn't delivered twice; in the in-memory
        // configuration there is no outbox table, so the use cases deliver
        // directly and share the dispatcher's own sink.
        let dispatcher_sink = NoopEventSink::new(true);
        let use_case_sink: Arc<dyn EventSink> = if self.pool.is_some() {
            Arc::new(AlreadyWrittenSink)
        } else {
            dispatcher_sink.clone()
        };
        let pricing = Arc::new(StaticPricingCatalog::new());
        let clock = Arc::new(SystemClock);
        let logger = Arc::new(TracingLogger);

        let create_order = Arc::new(CreateOrder::new(
            repository.clone(),
            use_case_sink.clone(),
            clock.clone(),
            logger.clone(),
        ));
        let add_item_to_order = Arc::new(AddItemToOrder::new(repository, use_case_sink, pricing, clock, logger));

        let dispatcher = self.pool.as_ref().map(|pool| {
            OutboxDispatcher::new(
                pool.clone(),
                dispatcher_sink,
                DispatcherConfig {
                    batch_size: self.config.outbox_batch_size,
                    poll_interval: self.config.outbox_poll_interval,
                    workers: self.config.outbox_workers,
                },
            )
        });

        if let Some(dispatcher) = &dispatcher {
            dispatcher.start().await;
            info!(workers = self.config.outbox_workers, "outbox dispatcher started");
        }

        let state = Arc::new(ApiState {
            create_order,
            add_item_to_order,
            started_at: Instant::now(),
        });
        let router = create_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = TcpListener::bind(addr).await.map_err(|err| DaemonError::Config(vec![err.to_string()]))?;
        info!(%addr, "HTTP listener bound");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| DaemonError::Config(vec![err.to_string()]))?;

        info!("HTTP listener stopped, shutting down outbox dispatcher");
        if let Some(dispatcher) = dispatcher {
            dispatcher.stop().await;
        }

        if let Some(pool) = self.pool {
            pool.close().await;
        }

        info!("shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install ctrl_c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
