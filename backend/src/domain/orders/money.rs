//! Non-negative monetary amounts in minor currency units.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::OrderValidationError;

/// Amount in minor currency units (for example cents).
///
/// Amounts are integers so totals are exact sums of line prices.
///
/// # Examples
///
/// ```
/// use orders_backend::domain::Money;
///
/// let total = Money::new(10)?.checked_add(Money::new(5)?)?;
/// assert_eq!(total.minor_units(), 15);
/// # Ok::<(), orders_backend::domain::OrderValidationError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Money(i64);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Validate a raw minor-unit value.
    pub fn new(minor_units: i64) -> Result<Self, OrderValidationError> {
        if minor_units < 0 {
            return Err(OrderValidationError::NegativeAmount { value: minor_units });
        }
        Ok(Self(minor_units))
    }

    /// Raw value in minor units.
    pub fn minor_units(self) -> i64 {
        self.0
    }

    /// Add two amounts, failing on overflow.
    pub fn checked_add(self, other: Self) -> Result<Self, OrderValidationError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(OrderValidationError::TotalOverflow)
    }

    /// Sum amounts, failing on overflow.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Self>) -> Result<Self, OrderValidationError> {
        amounts
            .into_iter()
            .try_fold(Self::ZERO, |total, amount| total.checked_add(amount))
    }
}

impl TryFrom<i64> for Money {
    type Error = OrderValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
