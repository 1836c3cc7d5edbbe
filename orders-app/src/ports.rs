//! Narrow interfaces the use cases depend on.
//!
//! `OrderRepository` (`orders-store`) and `EventSink` (`orders-outbox`) are
//! ports too, but they're defined alongside their adapters in their own
//! crates; this module holds the remaining ports the application layer
//! owns directly.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use orders_domain::{Currency, Money, ProductId};

/// Wall-clock access, injected so use cases are deterministic in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Structured logging seam. In production this simply forwards to
/// `tracing`; tests can substitute a recording implementation.
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Product price lookups. The real catalog is an external collaborator;
/// this crate ships only the port and a small static reference adapter
/// (see `StaticPricingCatalog`) sufficient to exercise the use cases.
#[async_trait]
pub trait Pricing: Send + Sync {
    async fn find_price(&self, product_id: &ProductId) -> Option<Money>;
}

/// Fixed-catalog reference adapter. Seeded with a handful of SKUs so the
/// end-to-end scenarios in the test suite (S2, S4) have something to price
/// against without a real downstream pricing service.
pub struct StaticPricingCatalog {
    prices: RwLock<HashMap<String, Money>>,
}

impl StaticPricingCatalog {
    pub fn new() -> Self {
        let mut prices = HashMap::new();
        prices.insert(
            "LAPTOP-001".to_string(),
            Money::create(rust_decimal::Decimal::new(129999, 2), Currency::Usd).unwrap(),
        );
        prices.insert(
            "MOUSE-001".to_string(),
            Money::create(rust_decimal::Decimal::new(2999, 2), Currency::Usd).unwrap(),
        );
        prices.insert(
            "KEYBOARD-EU-001".to_string(),
            Money::create(rust_decimal::Decimal::new(7999, 2), Currency::Eur).unwrap(),
        );
        Self {
            prices: RwLock::new(prices),
        }
    }

    pub fn seed(&self, product_id: impl Into<String>, price: Money) {
        self.prices.write().expect("lock poisoned").insert(product_id.into(), price);
    }
}

impl Default for StaticPricingCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Pricing for StaticPricingCatalog {
    async fn find_price(&self, product_id: &ProductId) -> Option<Money> {
        self.prices.read().expect("lock poisoned").get(product_id.as_str()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_catalog_finds_seeded_sku() {
        let catalog = StaticPricingCatalog::new();
        let price = catalog.find_price(&ProductId::create("LAPTOP-001").unwrap()).await;
        assert!(price.is_some());
    }

    #[tokio::test]
    async fn static_catalog_returns_none_for_unknown_sku() {
        let catalog = StaticPricingCatalog::new();
        let price = catalog.find_price(&ProductId::create("UNKNOWN").unwrap()).await;
        assert!(price.is_none());
    }
}
