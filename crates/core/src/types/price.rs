//! Type-safe price representation using integer-cent fixed point.
//!
//! Prices are held as a whole number of cents so that line totals and cart
//! totals are exact. [`rust_decimal::Decimal`] is only used at the text
//! boundary (parsing, display and serialization).

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("invalid price {0:?}: expected a decimal amount such as 4.50")]
    Invalid(String),
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount has more than two fractional digits.
    #[error("price cannot have more than two decimal places")]
    TooPrecise,
    /// The amount is above [`Price::MAX_CENTS`].
    #[error("price cannot exceed {}", Price::MAX)]
    TooLarge,
}

/// A non-negative price in the cafe's currency.
///
/// ## Examples
///
/// ```
/// use parlour_core::Price;
///
/// let scoop = Price::parse("4.50").unwrap();
/// assert_eq!(scoop.cents(), 450);
/// assert_eq!(scoop.to_string(), "4.50");
///
/// let line = scoop.checked_mul(2).unwrap();
/// assert_eq!(line.to_string(), "9.00");
///
/// assert!(Price::parse("-1").is_err());
/// assert!(Price::parse("4.505").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Price {
    cents: i64,
}

impl Price {
    /// Zero.
    pub const ZERO: Self = Self { cents: 0 };

    /// Largest accepted catalog price, in cents (1,000,000.00).
    pub const MAX_CENTS: i64 = 100_000_000;

    /// Largest accepted catalog price.
    pub const MAX: Self = Self {
        cents: Self::MAX_CENTS,
    };

    /// Create a price from a whole number of cents.
    ///
    /// Totals may exceed [`Price::MAX`]; only the sign is checked here.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `cents` is below zero.
    pub const fn from_cents(cents: i64) -> Result<Self, PriceError> {
        if cents < 0 {
            return Err(PriceError::Negative);
        }
        Ok(Self { cents })
    }

    /// Create a catalog price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative, has more than two
    /// fractional digits, or exceeds [`Price::MAX`].
    pub fn from_decimal(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }

        if amount.normalize().scale() > 2 {
            return Err(PriceError::TooPrecise);
        }

        if amount > Self::MAX.amount() {
            return Err(PriceError::TooLarge);
        }

        let cents = (amount * Decimal::ONE_HUNDRED)
            .to_i64()
            .ok_or(PriceError::TooLarge)?;

        Ok(Self { cents })
    }

    /// Parse a catalog price such as `4.50`, `4.5`, `4` or `$4.50`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Invalid`] if the input is not a decimal number,
    /// otherwise the errors of [`Price::from_decimal`].
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);

        let amount =
            Decimal::from_str(digits).map_err(|_| PriceError::Invalid(s.to_owned()))?;

        Self::from_decimal(amount)
    }

    /// The price as a whole number of cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.cents
    }

    /// The price as a decimal amount with two fractional digits.
    #[must_use]
    pub fn amount(self) -> Decimal {
        Decimal::new(self.cents, 2)
    }

    /// Returns `true` for a zero price.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.cents == 0
    }

    /// Multiply by a quantity, returning `None` on overflow or a negative
    /// quantity.
    #[must_use]
    pub const fn checked_mul(self, quantity: i64) -> Option<Self> {
        if quantity < 0 {
            return None;
        }
        match self.cents.checked_mul(quantity) {
            Some(cents) => Some(Self { cents }),
            None => None,
        }
    }

    /// Add two prices, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.cents.checked_add(other.cents) {
            Some(cents) => Some(Self { cents }),
            None => None,
        }
    }

    /// Sum an iterator of prices, returning `None` on overflow.
    pub fn checked_sum<I>(prices: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        prices
            .into_iter()
            .try_fold(Self::ZERO, |total, price| total.checked_add(price))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.amount())
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&self.amount(), serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::from_decimal(amount).map_err(serde::de::Error::custom)
    }
}
