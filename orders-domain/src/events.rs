//! Domain events emitted by the [`crate::order::Order`] aggregate.
//!
//! Events are a tagged enum, not a reflected class hierarchy — nothing here
//! depends on a runtime type name. `aggregate_id()` deliberately returns the
//! event's own type string rather than the order id; this mirrors an
//! observed quirk of the system this crate reimplements and is preserved
//! verbatim rather than "fixed" (see `DESIGN.md`, Q1).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::value_objects::{Money, OrderId, ProductId, Quantity};

/// A domain event raised by the order aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    OrderCreated {
        order_id: OrderId,
        occurred_at: DateTime<Utc>,
    },
    OrderItemAdded {
        order_id: OrderId,
        product_id: ProductId,
        quantity: Quantity,
        unit_price: Money,
        occurred_at: DateTime<Utc>,
    },
    OrderItemQuantityIncreased {
        order_id: OrderId,
        product_id: ProductId,
        previous_quantity: Quantity,
        new_quantity: Quantity,
        occurred_at: DateTime<Utc>,
    },
}

impl OrderEvent {
    pub fn order_created(order_id: OrderId) -> Self {
        Self::order_created_at(order_id, Utc::now())
    }

    /// Like [`Self::order_created`] but takes the occurrence instant
    /// explicitly — the seam the application layer's `Clock` port injects
    /// through, so the aggregate never reaches for ambient wall-clock time
    /// when a caller supplies one.
    pub fn order_created_at(order_id: OrderId, occurred_at: DateTime<Utc>) -> Self {
        Self::OrderCreated { order_id, occurred_at }
    }

    pub fn order_item_added(order_id: OrderId, product_id: ProductId, quantity: Quantity, unit_price: Money) -> Self {
        Self::order_item_added_at(order_id, product_id, quantity, unit_price, Utc::now())
    }

    pub fn order_item_added_at(
        order_id: OrderId,
        product_id: ProductId,
        quantity: Quantity,
        unit_price: Money,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self::OrderItemAdded {
            order_id,
            product_id,
            quantity,
            unit_price,
            occurred_at,
        }
    }

    pub fn order_item_quantity_increased(
        order_id: OrderId,
        product_id: ProductId,
        previous_quantity: Quantity,
        new_quantity: Quantity,
    ) -> Self {
        Self::order_item_quantity_increased_at(order_id, product_id, previous_quantity, new_quantity, Utc::now())
    }

    pub fn order_item_quantity_increased_at(
        order_id: OrderId,
        product_id: ProductId,
        previous_quantity: Quantity,
        new_quantity: Quantity,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self::OrderItemQuantityIncreased {
            order_id,
            product_id,
            previous_quantity,
            new_quantity,
            occurred_at,
        }
    }

    /// Stable class-like name, used both for the wire tag and as the source
    /// of the derived outbox `aggregate_type` (strip-suffix heuristic lives
    /// in `orders-outbox`, operating on this string).
    pub fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderCreated { .. } => "OrderCreated",
            OrderEvent::OrderItemAdded { .. } => "OrderItemAdded",
            OrderEvent::OrderItemQuantityIncreased { .. } => "OrderItemQuantityIncreased",
        }
    }

    /// The event type string, not the order id. Preserved verbatim — see
    /// the module doc comment and `DESIGN.md` Q1.
    pub fn aggregate_id(&self) -> String {
        self.event_type().to_string()
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderCreated { occurred_at, .. }
            | OrderEvent::OrderItemAdded { occurred_at, .. }
            | OrderEvent::OrderItemQuantityIncreased { occurred_at, .. } => *occurred_at,
        }
    }

    pub fn order_id(&self) -> &OrderId {
        match self {
            OrderEvent::OrderCreated { order_id, .. }
            | OrderEvent::OrderItemAdded { order_id, .. }
            | OrderEvent::OrderItemQuantityIncreased { order_id, .. } => order_id,
        }
    }

    /// `{aggregateId, occurredAt, data}` as specified for `toPrimitives()`.
    pub fn to_primitives(&self) -> serde_json::Value {
        json!({
            "aggregateId": self.aggregate_id(),
            "occurredAt": self.occurred_at().to_rfc3339(),
            "data": self,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::value_objects::Currency;

    #[test]
    fn aggregate_id_is_the_event_type_not_the_order_id() {
        let order_id = OrderId::create("ORD-1").unwrap();
        let event = OrderEvent::order_created(order_id);
        assert_eq!(event.aggregate_id(), "OrderCreated");
    }

    #[test]
    fn to_primitives_carries_order_id_inside_data() {
        let order_id = OrderId::create("ORD-2").unwrap();
        let product_id = ProductId::create("SKU-1").unwrap();
        let price = Money::create(dec!(9.99), Currency::Usd).unwrap();
        let event = OrderEvent::order_item_added(order_id.clone(), product_id, Quantity::create(2).unwrap(), price);
        let primitives = event.to_primitives();
        assert_eq!(primitives["data"]["order_id"], order_id.as_str());
        assert_eq!(primitives["aggregateId"], "OrderItemAdded");
    }
}
