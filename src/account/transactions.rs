//! Represents transactions
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::{amount::Amount, Quantity, Symbol};

/// Immutable record of one successful account operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    timestamp: DateTime<Utc>,
    amount: Decimal,
    kind: TransKind,
}

impl Transaction {
    pub(crate) fn deposit(amount: Amount) -> Self {
        Self::now(amount.into(), TransKind::Deposit)
    }

    pub(crate) fn withdrawal(amount: Amount) -> Self {
        Self::now(amount.into(), TransKind::Withdrawal)
    }

    pub(crate) fn buy(total_cost: Decimal, trade: Trade) -> Self {
        Self::now(total_cost, TransKind::Buy(trade))
    }

    pub(crate) fn sell(proceeds: Decimal, trade: Trade) -> Self {
        Self::now(proceeds, TransKind::Sell(trade))
    }

    fn now(amount: Decimal, kind: TransKind) -> Self {
        Self {
            timestamp: Utc::now(),
            amount,
            kind,
        }
    }

    /// when operation was applied
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// operation type with trade details
    pub fn kind(&self) -> &TransKind {
        &self.kind
    }

    /// Cash moved by deposit or withdrawal, total trade value for buy or sell
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// traded symbol, `None` for cash operations
    pub fn symbol(&self) -> Option<&str> {
        self.trade().map(|t| t.symbol.as_str())
    }

    /// traded quantity, `None` for cash operations
    pub fn quantity(&self) -> Option<Quantity> {
        self.trade().map(|t| t.quantity)
    }

    /// price used for the trade, `None` for cash operations
    pub fn price_per_share(&self) -> Option<Decimal> {
        self.trade().map(|t| t.price_per_share)
    }

    fn trade(&self) -> Option<&Trade> {
        match &self.kind {
            TransKind::Deposit | TransKind::Withdrawal => None,
            TransKind::Buy(trade) | TransKind::Sell(trade) => Some(trade),
        }
    }
}

/// Type of [`Transaction`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransKind {
    /// increase cash balance
    Deposit,
    /// decrease cash balance
    Withdrawal,
    /// exchange cash for shares
    Buy(Trade),
    /// exchange shares for cash
    Sell(Trade),
}

impl TransKind {
    /// lowercase name of operation
    pub fn as_str(&self) -> &'static str {
        match self {
            TransKind::Deposit => "deposit",
            TransKind::Withdrawal => "withdrawal",
            TransKind::Buy(_) => "buy",
            TransKind::Sell(_) => "sell",
        }
    }
}

impl fmt::Display for TransKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shares exchanged by buy or sell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    /// traded symbol
    pub symbol: Symbol,
    /// number of shares, never zero
    pub quantity: Quantity,
    /// price of one share at the moment of trade
    pub price_per_share: Decimal,
}
