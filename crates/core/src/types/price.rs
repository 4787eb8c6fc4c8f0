//! Type-safe price representation using decimal arithmetic.
//!
//! The whole catalog trades in US dollars, so `Price` carries no currency
//! code. Amounts are kept in dollars (not cents) because that is how the
//! backing store holds them; the payment proxy converts to cents at the
//! processor boundary.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`] from user input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price is not a valid number")]
    Invalid,
    /// The input parsed but is below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// A dollar amount.
///
/// Displays the way the storefront shows money: `$` then the amount with
/// thousands separators, fractional cents only when present.
///
/// ```
/// use maison_core::Price;
///
/// assert_eq!(Price::from_dollars(1234).to_string(), "$ 1,234");
/// assert_eq!(Price::parse("19.50").unwrap().to_string(), "$ 19.5");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a raw decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole-dollar amount.
    #[must_use]
    pub fn from_dollars(dollars: i64) -> Self {
        Self(Decimal::from(dollars))
    }

    /// Parse a price from user input (an item form's price field).
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Invalid`] when the trimmed input is not a
    /// decimal number and [`PriceError::Negative`] when it is below zero.
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let amount: Decimal = input.trim().parse().map_err(|_| PriceError::Invalid)?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// The raw decimal amount in dollars.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount as an `f64`, for JSON payloads that expect a plain number.
    ///
    /// Returns `None` if the amount does not fit (never the case for
    /// catalog-scale prices).
    #[must_use]
    pub fn to_f64(&self) -> Option<f64> {
        self.0.to_f64()
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn times(&self, qty: u32) -> Self {
        Self(self.0 * Decimal::from(qty))
    }

    /// True when the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, qty: u32) -> Self {
        self.times(qty)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|p| p.0).sum())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let normalized = self.0.normalize();
        let digits = normalized.abs().to_string();
        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (digits.as_str(), None),
        };

        let sign = if normalized.is_sign_negative() && !normalized.is_zero() {
            "-"
        } else {
            ""
        };
        let grouped = group_thousands(whole);

        match fraction {
            Some(fraction) => write!(f, "$ {sign}{grouped}.{fraction}"),
            None => write!(f, "$ {sign}{grouped}"),
        }
    }
}

/// Insert a comma every three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
