//! Validated value primitives.
//!
//! Every primitive here validates its invariants at construction time and is
//! immutable afterwards. There is no way to hold an `OrderId`, `Quantity`,
//! `Currency`, or `Money` that violates its own invariant — downstream code
//! never re-checks what the constructor already guaranteed.

use std::fmt;

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

const BASE36_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).expect("base36 alphabet is ASCII")
}

/// Opaque order identifier.
///
/// Either supplied by the caller (trimmed, rejected if empty) or generated in
/// the `ORD-<base36 timestamp>-<7 char base36 random>` shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Validate a caller-supplied identifier.
    ///
    /// Whitespace is trimmed before the emptiness check, so a string of only
    /// whitespace is rejected — this is deliberate, see Q2 in `DESIGN.md`.
    pub fn create(raw: impl Into<String>) -> DomainResult<Self> {
        let trimmed = raw.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidOrderId);
        }
        Ok(Self(trimmed))
    }

    /// Generate a fresh identifier. Collision-free under normal clocks: the
    /// timestamp component changes every millisecond and the random suffix
    /// covers the remaining risk.
    pub fn generate() -> Self {
        let millis = Utc::now().timestamp_millis().max(0) as u64;
        let mut rng = rand::thread_rng();
        let suffix: String = (0..7)
            .map(|_| BASE36_ALPHABET[rng.gen_range(0..36)] as char)
            .collect();
        Self(format!("ORD-{}-{}", to_base36(millis), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a product in the pricing catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn create(raw: impl Into<String>) -> DomainResult<Self> {
        let trimmed = raw.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidProductId);
        }
        Ok(Self(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A strictly positive integer quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub fn create(value: i64) -> DomainResult<Self> {
        if value <= 0 || value > i64::from(u32::MAX) {
            return Err(DomainError::InvalidQuantity(value));
        }
        Ok(Self(value as u32))
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Add two quantities, saturating is never needed in practice (orders
    /// don't carry billions of units) but overflow still fails loudly.
    pub fn add(&self, other: Quantity) -> DomainResult<Quantity> {
        self.0
            .checked_add(other.0)
            .map(Quantity)
            .ok_or(DomainError::InvalidQuantity(i64::from(self.0) + i64::from(other.0)))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of supported ISO-4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Jpy,
    Mxn,
    Ars,
    Clp,
}

impl Currency {
    /// Normalizes to upper-case but does not trim: a code with surrounding
    /// whitespace is rejected rather than silently cleaned up.
    pub fn create(raw: &str) -> DomainResult<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "USD" if raw == raw.trim() => Ok(Currency::Usd),
            "EUR" if raw == raw.trim() => Ok(Currency::Eur),
            "GBP" if raw == raw.trim() => Ok(Currency::Gbp),
            "JPY" if raw == raw.trim() => Ok(Currency::Jpy),
            "MXN" if raw == raw.trim() => Ok(Currency::Mxn),
            "ARS" if raw == raw.trim() => Ok(Currency::Ars),
            "CLP" if raw == raw.trim() => Ok(Currency::Clp),
            _ => Err(DomainError::InvalidCurrency(raw.to_string())),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Mxn => "MXN",
            Currency::Ars => "ARS",
            Currency::Clp => "CLP",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Jpy => "¥",
            Currency::Mxn => "MX$",
            Currency::Ars => "AR$",
            Currency::Clp => "CL$",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Currency::Usd => "US Dollar",
            Currency::Eur => "Euro",
            Currency::Gbp => "British Pound",
            Currency::Jpy => "Japanese Yen",
            Currency::Mxn => "Mexican Peso",
            Currency::Ars => "Argentine Peso",
            Currency::Clp => "Chilean Peso",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// An exact monetary amount carrying its currency.
///
/// Stored internally as [`Decimal`] for exact arithmetic (the same choice
/// the domain makes for `Price`/`Quantity` elsewhere), but serialized as a
/// JSON number rather than a decimal string — see `DESIGN.md` for why the
/// wire contract and the in-memory representation deliberately diverge here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    pub fn create(amount: Decimal, currency: Currency) -> DomainResult<Self> {
        if !amount.is_sign_positive() && !amount.is_zero() {
            return Err(DomainError::InvalidMoneyAmount);
        }
        Ok(Self { amount, currency })
    }

    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn add(&self, other: Money) -> DomainResult<Money> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch(
                self.currency.code().to_string(),
                other.currency.code().to_string(),
            ));
        }
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency,
        })
    }

    pub fn multiply(&self, factor: Quantity) -> DomainResult<Money> {
        let factor = Decimal::from(factor.value());
        Ok(Money {
            amount: self.amount * factor,
            currency: self.currency,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", self.currency.symbol(), self.amount)
    }
}

/// Wire shape for `Money`, matching the `{amount, currency}` contract
/// exactly: `amount` is emitted as a JSON number, not a decimal string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoneyView {
    pub amount: f64,
    pub currency: String,
}

impl From<Money> for MoneyView {
    fn from(money: Money) -> Self {
        Self {
            amount: money.amount.to_string().parse().unwrap_or(0.0),
            currency: money.currency.code().to_string(),
        }
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        MoneyView::from(*self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let view = MoneyView::deserialize(deserializer)?;
        let currency = Currency::create(&view.currency).map_err(serde::de::Error::custom)?;
        let amount = Decimal::try_from(view.amount).map_err(serde::de::Error::custom)?;
        Money::create(amount, currency).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_id_generate_has_expected_shape() {
        let id = OrderId::generate();
        assert!(id.as_str().starts_with("ORD-"));
        let parts: Vec<&str> = id.as_str().splitn(3, '-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 7);
    }

    #[test]
    fn order_id_rejects_whitespace_only() {
        assert!(OrderId::create("   ").is_err());
    }

    #[test]
    fn order_id_trims_surrounding_whitespace() {
        let id = OrderId::create("  ORD-FOO  ").unwrap();
        assert_eq!(id.as_str(), "ORD-FOO");
    }

    #[test]
    fn quantity_rejects_zero_and_negative() {
        assert!(Quantity::create(0).is_err());
        assert!(Quantity::create(-1).is_err());
        assert!(Quantity::create(3).is_ok());
    }

    #[test]
    fn currency_rejects_surrounding_whitespace() {
        assert!(Currency::create(" USD").is_err());
        assert!(Currency::create("USD ").is_err());
        assert!(Currency::create("usd").is_ok());
    }

    #[test]
    fn currency_rejects_unknown_code() {
        assert!(matches!(
            Currency::create("XYZ"),
            Err(DomainError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn money_rejects_negative_amount() {
        assert!(Money::create(dec!(-1), Currency::Usd).is_err());
    }

    #[test]
    fn money_allows_zero() {
        assert!(Money::create(dec!(0), Currency::Usd).is_ok());
    }

    #[test]
    fn money_add_requires_matching_currency() {
        let usd = Money::create(dec!(10), Currency::Usd).unwrap();
        let eur = Money::create(dec!(10), Currency::Eur).unwrap();
        assert!(usd.add(eur).is_err());
    }

    #[test]
    fn money_multiply_scales_by_quantity() {
        let price = Money::create(dec!(12.50), Currency::Usd).unwrap();
        let subtotal = price.multiply(Quantity::create(3).unwrap()).unwrap();
        assert_eq!(subtotal.amount(), dec!(37.50));
    }

    #[test]
    fn money_display_matches_symbol_and_two_decimals() {
        let price = Money::create(dec!(5), Currency::Usd).unwrap();
        assert_eq!(price.to_string(), "$5.00");
    }
}
