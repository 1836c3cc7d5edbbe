//! Order domain: validated value objects, the `Order` aggregate, and the
//! domain events it emits. No persistence, no transport — those live in
//! `orders-store`, `orders-outbox`, and `ordersd`.

pub mod error;
pub mod events;
pub mod order;
pub mod value_objects;

pub use error::{DomainError, DomainResult};
pub use events::OrderEvent;
pub use order::{Order, OrderItem};
pub use value_objects::{Currency, Money, MoneyView, OrderId, ProductId, Quantity};
