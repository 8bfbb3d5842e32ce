//! Possible errors

use crate::{amount::NonPositiveAmountErr, Symbol};
use thiserror::Error;

/// Errors returned by a [`crate::price::PriceSource`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PriceErr {
    /// Price source does not know this symbol
    #[error("unknown share symbol: {0}")]
    UnknownSymbol(Symbol),
}

/// Group errors for cash balance
#[allow(missing_docs)]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BalanceErr {
    #[error("not enough funds available for this operation")]
    NotEnoughAvailableFunds,
    #[error("cash balance overflow")]
    Overflow,
}

/// Group errors for share holdings
#[allow(missing_docs)]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HoldingsErr {
    #[error("not enough shares held for this operation")]
    NotEnoughShares,
    #[error("share quantity overflow")]
    Overflow,
}

/// Symbol can not be used for requested operation
#[allow(missing_docs)]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SymbolErr {
    #[error(transparent)]
    Price(#[from] PriceErr),
    #[error("symbol {0} is not held")]
    NotHeld(Symbol),
}

/// Malformed input to an account operation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArgumentErr {
    /// Money amount was zero or negative
    #[error(transparent)]
    NonPositiveAmount(#[from] NonPositiveAmountErr),
    /// Share quantity was zero or negative
    #[error("quantity must be greater than zero")]
    NonPositiveQuantity,
    /// Input record did not carry a field required by its operation
    #[error("missing field `{0}`")]
    MissingField(&'static str),
}

/// Group all errors that can occurs within account module
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountErr {
    /// Operation requires an account created with [`crate::account::Account::create_account`]
    #[error("account is not created yet")]
    NotInitialized,
    /// Account can be created only once
    #[error("account already created with initial deposit")]
    AlreadyInitialized,
    #[allow(missing_docs)]
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentErr),
    /// Cash balance is lower than required amount
    #[error("insufficient funds")]
    InsufficientFunds,
    /// Held quantity is lower than required quantity
    #[error("insufficient shares held")]
    InsufficientHoldings,
    #[allow(missing_docs)]
    #[error("invalid symbol: {0}")]
    InvalidSymbol(#[from] SymbolErr),
    /// Computed value does not fit into numeric range
    #[error("value overflow")]
    Overflow,
}

impl From<NonPositiveAmountErr> for AccountErr {
    fn from(err: NonPositiveAmountErr) -> Self {
        ArgumentErr::from(err).into()
    }
}

impl From<BalanceErr> for AccountErr {
    fn from(err: BalanceErr) -> Self {
        match err {
            BalanceErr::NotEnoughAvailableFunds => AccountErr::InsufficientFunds,
            BalanceErr::Overflow => AccountErr::Overflow,
        }
    }
}

impl From<PriceErr> for AccountErr {
    fn from(err: PriceErr) -> Self {
        SymbolErr::from(err).into()
    }
}

impl From<HoldingsErr> for AccountErr {
    fn from(err: HoldingsErr) -> Self {
        match err {
            HoldingsErr::NotEnoughShares => AccountErr::InsufficientHoldings,
            HoldingsErr::Overflow => AccountErr::Overflow,
        }
    }
}
