//! The two write use cases this core exposes.

use std::sync::Arc;

use orders_domain::{Order, OrderId, ProductId, Quantity};
use orders_outbox::{EventSink, OutboxRow};
use orders_store::OrderRepository;

use crate::error::{AppError, AppResult};
use crate::ports::{Clock, Logger, Pricing};

pub struct CreateOrderInput {
    pub order_id: Option<String>,
}

pub struct CreateOrder {
    repository: Arc<dyn OrderRepository>,
    sink: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    logger: Arc<dyn Logger>,
}

impl CreateOrder {
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        sink: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            repository,
            sink,
            clock,
            logger,
        }
    }

    pub async fn execute(&self, input: CreateOrderInput) -> AppResult<Order> {
        // An empty string (or absent field) means "generate one"; a
        // whitespace-only string is a validation failure. Both branches are
        // deliberate — see DESIGN.md, Q2.
        let order_id = match input.order_id {
            Some(raw) if !raw.is_empty() => Some(OrderId::create(raw)?),
            _ => None,
        };

        if let Some(ref id) = order_id {
            if self.repository.exists(id.as_str()).await? {
                return Err(AppError::conflict(
                    format!("order '{id}' already exists"),
                    "duplicate_order_id",
                ));
            }
        }

        let mut order = Order::create_at(order_id, self.clock.now());
        let events = order.pull_domain_events();

        self.repository.save(&order, &events).await?;

        // Event publication failures never fail the use case: the write is
        // already durable and, in persistent deployments, the outbox
        // dispatcher owns recovery.
        for event in &events {
            if let Ok(row) = OutboxRow::from_event(event) {
                if let Err(reason) = self.sink.publish(&row).await {
                    self.logger
                        .warn(&format!("best-effort event publish failed for order {}: {reason}", order.id()));
                }
            }
        }

        Ok(order)
    }
}

pub struct AddItemToOrderInput {
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
}

pub struct AddItemToOrder {
    repository: Arc<dyn OrderRepository>,
    sink: Arc<dyn EventSink>,
    pricing: Arc<dyn Pricing>,
    clock: Arc<dyn Clock>,
    logger: Arc<dyn Logger>,
}

impl AddItemToOrder {
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        sink: Arc<dyn EventSink>,
        pricing: Arc<dyn Pricing>,
        clock: Arc<dyn Clock>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            repository,
            sink,
            pricing,
            clock,
            logger,
        }
    }

    pub async fn execute(&self, input: AddItemToOrderInput) -> AppResult<Order> {
        let order_id = OrderId::create(input.order_id).map_err(|err| AppError::validation_field(err.to_string(), "orderId"))?;
        let product_id =
            ProductId::create(input.product_id).map_err(|err| AppError::validation_field(err.to_string(), "productId"))?;
        let quantity =
            Quantity::create(input.quantity).map_err(|err| AppError::validation_field(err.to_string(), "quantity"))?;

        let mut order = self
            .repository
            .find_by_id(order_id.as_str())
            .await?
            .ok_or_else(|| AppError::not_found("Order", order_id.as_str()))?;

        let unit_price = self
            .pricing
            .find_price(&product_id)
            .await
            .ok_or_else(|| AppError::not_found("Product", product_id.as_str()))?;

        order.add_item_at(product_id, quantity, unit_price, self.clock.now())?;

        let events = order.pull_domain_events();
        self.repository.save(&order, &events).await?;

        for event in &events {
            if let Ok(row) = OutboxRow::from_event(event) {
                if let Err(reason) = self.sink.publish(&row).await {
                    self.logger
                        .warn(&format!("best-effort event publish failed for order {}: {reason}", order.id()));
                }
            }
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orders_outbox::NoopEventSink;
    use orders_store::InMemoryOrderRepository;

    use crate::ports::{StaticPricingCatalog, SystemClock, TracingLogger};

    type Wiring = (
        Arc<InMemoryOrderRepository>,
        Arc<NoopEventSink>,
        Arc<StaticPricingCatalog>,
        Arc<SystemClock>,
        Arc<TracingLogger>,
    );

    fn wired() -> Wiring {
        (
            Arc::new(InMemoryOrderRepository::new()),
            NoopEventSink::new(false),
            Arc::new(StaticPricingCatalog::new()),
            Arc::new(SystemClock),
            Arc::new(TracingLogger),
        )
    }

    #[tokio::test]
    async fn create_order_without_id_generates_one() {
        let (repo, sink, _, clock, logger) = wired();
        let use_case = CreateOrder::new(repo.clone(), sink, clock, logger);
        let order = use_case.execute(CreateOrderInput { order_id: None }).await.unwrap();
        assert!(order.id().as_str().starts_with("ORD-"));
    }

    #[tokio::test]
    async fn create_order_with_whitespace_id_fails_validation() {
        let (repo, sink, _, clock, logger) = wired();
        let use_case = CreateOrder::new(repo, sink, clock, logger);
        let result = use_case
            .execute(CreateOrderInput {
                order_id: Some("   ".to_string()),
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn create_order_rejects_duplicate_id() {
        let (repo, sink, _, clock, logger) = wired();
        let use_case = CreateOrder::new(repo, sink, clock, logger);
        let input = || CreateOrderInput {
            order_id: Some("ORD-DUP".to_string()),
        };
        use_case.execute(input()).await.unwrap();
        let result = use_case.execute(input()).await;
        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn add_item_fails_when_order_missing() {
        let (repo, sink, pricing, clock, logger) = wired();
        let use_case = AddItemToOrder::new(repo, sink, pricing, clock, logger);
        let result = use_case
            .execute(AddItemToOrderInput {
                order_id: "ORD-MISSING".to_string(),
                product_id: "LAPTOP-001".to_string(),
                quantity: 1,
            })
            .await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn add_item_fails_when_product_unpriced() {
        let (repo, sink, pricing, clock, logger) = wired();
        let create = CreateOrder::new(repo.clone(), sink.clone(), clock.clone(), logger.clone());
        let order = create
            .execute(CreateOrderInput {
                order_id: Some("ORD-NOPRICE".to_string()),
            })
            .await
            .unwrap();

        let use_case = AddItemToOrder::new(repo, sink, pricing, clock, logger);
        let result = use_case
            .execute(AddItemToOrderInput {
                order_id: order.id().as_str().to_string(),
                product_id: "NOT-IN-CATALOG".to_string(),
                quantity: 1,
            })
            .await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn add_item_succeeds_and_prices_from_catalog() {
        let (repo, sink, pricing, clock, logger) = wired();
        let create = CreateOrder::new(repo.clone(), sink.clone(), clock.clone(), logger.clone());
        let order = create
            .execute(CreateOrderInput {
                order_id: Some("ORD-PRICED".to_string()),
            })
            .await
            .unwrap();

        let use_case = AddItemToOrder::new(repo, sink, pricing, clock, logger);
        let order = use_case
            .execute(AddItemToOrderInput {
                order_id: order.id().as_str().to_string(),
                product_id: "LAPTOP-001".to_string(),
                quantity: 2,
            })
            .await
            .unwrap();

        assert_eq!(order.item_count(), 1);
        assert_eq!(order.total_quantity(), 2);
    }
}
