use thiserror::Error;

/// Failures raised by domain value objects and the [`crate::order::Order`] aggregate.
///
/// These are the only errors the domain layer can produce; they carry no
/// transport concerns (no status codes, no field paths) — mapping a
/// `DomainError` onto a validation/not-found/conflict/infra taxonomy is the
/// application layer's job, not this one's.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("order id must not be empty")]
    InvalidOrderId,

    #[error("product id must not be empty")]
    InvalidProductId,

    #[error("quantity must be a positive integer, got {0}")]
    InvalidQuantity(i64),

    #[error("currency code '{0}' is not recognized")]
    InvalidCurrency(String),

    #[error("money amount must be finite and non-negative")]
    InvalidMoneyAmount,

    #[error("cannot combine amounts in different currencies: {0} vs {1}")]
    CurrencyMismatch(String, String),

    #[error("unit price must not be zero")]
    ZeroUnitPrice,

    #[error("item currency {new} does not match order currency {existing}")]
    OrderCurrencyMismatch { existing: String, new: String },

    #[error("cannot compute a total for an order with no items")]
    EmptyOrder,

    #[error("order total spans more than one currency")]
    MixedCurrencyTotal,
}

pub type DomainResult<T> = Result<T, DomainError>;
