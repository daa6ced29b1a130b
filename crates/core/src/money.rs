//! Money value object (decimal amount + ISO currency code).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A non-negative amount in a single currency.
///
/// Comparisons are only defined within the same currency; comparing across
/// currencies is a [`DomainError::Validation`], never a silent `false`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl ValueObject for Money {}

impl Money {
    /// Build a money value, validating the amount and the currency code.
    pub fn new(amount: Decimal, currency: impl AsRef<str>) -> DomainResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::validation("amount cannot be negative"));
        }

        let currency = currency.as_ref().trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::validation(format!(
                "currency must be a 3-letter code, got '{currency}'"
            )));
        }

        Ok(Self {
            amount: amount.normalize(),
            currency: currency.to_ascii_uppercase(),
        })
    }

    /// Zero in ISO 4217 `XXX` (no currency); the state of an aggregate that
    /// has not been created yet.
    pub fn unset() -> Self {
        Self {
            amount: Decimal::ZERO,
            currency: "XXX".to_string(),
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn same_currency(&self, other: &Money) -> bool {
        self.currency == other.currency
    }

    /// Strict magnitude comparison; both values must share a currency.
    pub fn is_less_than(&self, other: &Money) -> DomainResult<bool> {
        self.ensure_same_currency(other)?;
        Ok(self.amount < other.amount)
    }

    fn ensure_same_currency(&self, other: &Money) -> DomainResult<()> {
        if !self.same_currency(other) {
            return Err(DomainError::validation(format!(
                "currency mismatch: {} vs {}",
                self.currency, other.currency
            )));
        }
        Ok(())
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
