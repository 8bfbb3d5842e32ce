//! Trading account and its transaction history

pub(crate) mod balance;
pub(crate) mod holdings;
pub(crate) mod trading_account;
pub(crate) mod transactions;

pub use trading_account::Account;
pub use transactions::{Trade, TransKind, Transaction};
