//!Simulated single-user trading account driven by csv commands

#![deny(missing_docs)]

pub mod account;
pub mod amount;
pub mod csv;
pub mod errors;
pub mod price;

/// Share ticker, for example `AAPL`
pub type Symbol = String;
/// Number of shares
pub type Quantity = u64;
