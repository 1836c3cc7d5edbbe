//! PostgreSQL-backed order repository.
//!
//! `save` is where the transactional-outbox guarantee actually lives: order
//! row, item rows, and outbox rows are written in one transaction, so a
//! reader never observes business state without its corresponding events
//! (or the reverse).

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use orders_domain::{Currency, Money, Order, OrderEvent, OrderId, OrderItem, ProductId, Quantity};
use orders_outbox::publish_all;

use crate::error::{StoreError, StoreResult};
use crate::repository::OrderRepository;

pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn save(&self, order: &Order, events: &[OrderEvent]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from)?;

        // Default-on-empty: an order with no items is stored as 0 USD
        // rather than failing the save. See DESIGN.md, Q3.
        let (total_amount, currency): (Decimal, &str) = match order.calculate_total() {
            Ok(total) => (total.amount(), total.currency().code()),
            Err(_) => (Decimal::ZERO, "USD"),
        };

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, status, total_amount, currency, created_at, updated_at)
            VALUES ($1, NULL, 'created', $2, $3, $4, now())
            ON CONFLICT (id) DO UPDATE
            SET total_amount = EXCLUDED.total_amount,
                currency = EXCLUDED.currency,
                updated_at = now()
            "#,
        )
        .bind(order.id().as_str())
        .bind(total_amount)
        .bind(currency)
        .bind(order.created_at())
        .execute(&mut *tx)
        .await
        .map_err(StoreError::from)?;

        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order.id().as_str())
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from)?;

        for item in order.items() {
            let subtotal = item.subtotal().map_err(StoreError::Domain)?;
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, quantity, unit_price, total_price, currency, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(order.id().as_str())
            .bind(item.product_id().as_str())
            .bind(item.quantity().value() as i32)
            .bind(item.unit_price().amount())
            .bind(subtotal.amount())
            .bind(item.unit_price().currency().code())
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from)?;
        }

        publish_all(&mut tx, events)
            .await
            .map_err(|err| StoreError::Database(err.to_string()))?;

        tx.commit().await.map_err(StoreError::from)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Order>> {
        let order_row = sqlx::query("SELECT id, created_at FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from)?;

        let Some(order_row) = order_row else {
            return Ok(None);
        };

        let item_rows = sqlx::query(
            r#"
            SELECT product_id, quantity, unit_price, currency
            FROM order_items
            WHERE order_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)?;

        let mut items = Vec::with_capacity(item_rows.len());
        for row in item_rows {
            match reconstruct_item(&row) {
                Ok(item) => items.push(item),
                Err(err) => {
                    tracing::warn!(order_id = id, %err, "dropping order item row that failed to reconstruct");
                }
            }
        }

        let order_id = OrderId::create(order_row.get::<String, _>("id")).map_err(StoreError::Domain)?;
        let created_at = order_row.get("created_at");

        Ok(Some(Order::reconstitute(order_id, created_at, items)))
    }

    async fn exists(&self, id: &str) -> StoreResult<bool> {
        let row = sqlx::query("SELECT 1 FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from)?;
        Ok(row.is_some())
    }
}

fn reconstruct_item(row: &sqlx::postgres::PgRow) -> StoreResult<OrderItem> {
    let product_id = ProductId::create(row.get::<String, _>("product_id")).map_err(StoreError::Domain)?;
    let quantity = Quantity::create(i64::from(row.get::<i32, _>("quantity"))).map_err(StoreError::Domain)?;
    let currency = Currency::create(&row.get::<String, _>("currency")).map_err(StoreError::Domain)?;
    let unit_price = Money::create(row.get::<Decimal, _>("unit_price"), currency).map_err(StoreError::Domain)?;
    Ok(OrderItem::new(product_id, quantity, unit_price))
}
