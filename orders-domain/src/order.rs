//! The `Order` aggregate: the only component in this crate allowed to
//! mutate order state, and the sole source of domain events.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::{DomainError, DomainResult};
use crate::events::OrderEvent;
use crate::value_objects::{Currency, Money, OrderId, ProductId, Quantity};

/// One line item on an order. Immutable — incrementing a quantity produces
/// a new `OrderItem` value, it never mutates one in place.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    product_id: ProductId,
    quantity: Quantity,
    unit_price: Money,
}

impl OrderItem {
    pub fn new(product_id: ProductId, quantity: Quantity, unit_price: Money) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
        }
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn subtotal(&self) -> DomainResult<Money> {
        self.unit_price.multiply(self.quantity)
    }
}

impl std::fmt::Display for OrderItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subtotal = self
            .subtotal()
            .map(|m| m.to_string())
            .unwrap_or_else(|_| "?".to_string());
        write!(
            f,
            "{} x{} @ {} = {}",
            self.product_id, self.quantity, self.unit_price, subtotal
        )
    }
}

/// The order aggregate root.
///
/// Items are kept in insertion order (a `Vec`, not a map) because line order
/// is observable in the order view; product lookup falls back to a linear
/// scan, which is fine at the line counts this aggregate is expected to
/// hold.
#[derive(Debug, Clone)]
pub struct Order {
    id: OrderId,
    created_at: DateTime<Utc>,
    items: Vec<OrderItem>,
    pending_events: Vec<OrderEvent>,
}

impl Order {
    /// Create a fresh order. Generates an id when none is supplied and
    /// emits `OrderCreated`.
    pub fn create(id: Option<OrderId>) -> Self {
        Self::create_at(id, Utc::now())
    }

    /// Like [`Self::create`] but takes the creation instant explicitly — the
    /// seam the application layer's `Clock` port injects through.
    pub fn create_at(id: Option<OrderId>, now: DateTime<Utc>) -> Self {
        let id = id.unwrap_or_else(OrderId::generate);
        let mut order = Self {
            id: id.clone(),
            created_at: now,
            items: Vec::new(),
            pending_events: Vec::new(),
        };
        order.pending_events.push(OrderEvent::order_created_at(id, now));
        order
    }

    /// Rebuild an order from storage. Emits no events — reconstitution is
    /// not a business fact.
    pub fn reconstitute(id: OrderId, created_at: DateTime<Utc>, items: Vec<OrderItem>) -> Self {
        Self {
            id,
            created_at,
            items,
            pending_events: Vec::new(),
        }
    }

    pub fn id(&self) -> &OrderId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Add a line item, merging into an existing line for the same product.
    ///
    /// Check order is contractual, not incidental:
    /// 1. zero unit price is always rejected;
    /// 2. a second currency is rejected against the order's established one;
    /// 3. an existing line for the product is merged (quantity summed, the
    ///    *original* unit price kept) and emits `OrderItemQuantityIncreased`;
    /// 4. otherwise a new line is appended and emits `OrderItemAdded`.
    pub fn add_item(&mut self, product_id: ProductId, quantity: Quantity, unit_price: Money) -> DomainResult<()> {
        self.add_item_at(product_id, quantity, unit_price, Utc::now())
    }

    /// Like [`Self::add_item`] but takes the occurrence instant explicitly —
    /// the seam the application layer's `Clock` port injects through.
    pub fn add_item_at(
        &mut self,
        product_id: ProductId,
        quantity: Quantity,
        unit_price: Money,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if unit_price.is_zero() {
            return Err(DomainError::ZeroUnitPrice);
        }

        if let Some(existing) = self.items.first() {
            if existing.unit_price.currency() != unit_price.currency() {
                return Err(DomainError::OrderCurrencyMismatch {
                    existing: existing.unit_price.currency().code().to_string(),
                    new: unit_price.currency().code().to_string(),
                });
            }
        }

        if let Some(position) = self.items.iter().position(|item| item.product_id == product_id) {
            let previous = self.items[position].clone();
            let new_quantity = previous.quantity.add(quantity)?;
            self.items[position] = OrderItem::new(product_id.clone(), new_quantity, previous.unit_price);
            self.pending_events.push(OrderEvent::order_item_quantity_increased_at(
                self.id.clone(),
                product_id,
                previous.quantity,
                new_quantity,
                now,
            ));
        } else {
            self.items
                .push(OrderItem::new(product_id.clone(), quantity, unit_price));
            self.pending_events.push(OrderEvent::order_item_added_at(
                self.id.clone(),
                product_id,
                quantity,
                unit_price,
                now,
            ));
        }

        Ok(())
    }

    /// Sum of line subtotals grouped by currency code. Lines whose subtotal
    /// computation fails are skipped rather than aborting the whole sum.
    pub fn calculate_totals_by_currency(&self) -> BTreeMap<String, Money> {
        let mut totals: BTreeMap<String, Money> = BTreeMap::new();
        for item in &self.items {
            let Ok(subtotal) = item.subtotal() else {
                continue;
            };
            let code = subtotal.currency().code().to_string();
            let entry = totals
                .entry(code)
                .or_insert_with(|| Money::zero(subtotal.currency()));
            if let Ok(sum) = entry.add(subtotal) {
                *entry = sum;
            }
        }
        totals
    }

    /// The single-currency total, or an error when the order is empty or
    /// spans more than one currency.
    pub fn calculate_total(&self) -> DomainResult<Money> {
        let totals = self.calculate_totals_by_currency();
        match totals.len() {
            0 => Err(DomainError::EmptyOrder),
            1 => Ok(*totals.values().next().expect("len checked above")),
            _ => Err(DomainError::MixedCurrencyTotal),
        }
    }

    /// Drain and return pending events. A second call on an unchanged
    /// aggregate returns an empty vector.
    pub fn pull_domain_events(&mut self) -> Vec<OrderEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity.value()).sum()
    }

    pub fn has_product(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.product_id == product_id)
    }
}
