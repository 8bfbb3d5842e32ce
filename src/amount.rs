//! Protect before using zero or negative amount for deposits, withdraws and prices.

use std::{borrow::Borrow, fmt, ops::Deref};

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Represent strictly positive financial amount of money
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Create new amount from `num` with `scale` decimal places.
    ///
    /// Returns error for `num == 0`.
    pub fn new(num: u64, scale: u32) -> Result<Amount, NonPositiveAmountErr> {
        Decimal::from_i128_with_scale(num.into(), scale).try_into()
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("amount must be greater than zero")]
/// represent error when operation want to use zero or negative amount of money
pub struct NonPositiveAmountErr;

impl TryFrom<Decimal> for Amount {
    type Error = NonPositiveAmountErr;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.is_sign_negative() || value.is_zero() {
            Err(NonPositiveAmountErr)
        } else {
            Ok(Self(value))
        }
    }
}

impl From<Amount> for Decimal {
    fn from(this: Amount) -> Self {
        this.0
    }
}

impl Borrow<Decimal> for Amount {
    fn borrow(&self) -> &Decimal {
        &self.0
    }
}

impl Deref for Amount {
    type Target = Decimal;
    fn deref(&self) -> &Self::Target {
        self.borrow()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
