//! Share price lookup used by trading and portfolio valuation

use std::{collections::HashMap, sync::Arc};

use rust_decimal::Decimal;

use crate::{amount::Amount, errors::PriceErr, Symbol};

/// Source of the current price of one share
pub trait PriceSource {
    /// current price of one share of `symbol`
    ///
    /// Returns [`PriceErr::UnknownSymbol`] when `symbol` can not be priced.
    fn share_price(&self, symbol: &str) -> Result<Decimal, PriceErr>;
}

impl<P: PriceSource + ?Sized> PriceSource for &P {
    fn share_price(&self, symbol: &str) -> Result<Decimal, PriceErr> {
        (**self).share_price(symbol)
    }
}

impl<P: PriceSource + ?Sized> PriceSource for Arc<P> {
    fn share_price(&self, symbol: &str) -> Result<Decimal, PriceErr> {
        (**self).share_price(symbol)
    }
}

/// In memory price table
#[derive(Debug, Clone, Default)]
pub struct FixedPrices {
    // every price is positive, values come only from `Amount` or `reference`
    prices: HashMap<Symbol, Decimal>,
}

impl FixedPrices {
    /// Empty table, every lookup fails
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed prices for `AAPL`, `TSLA` and `GOOGL`
    pub fn reference() -> Self {
        let prices = [("AAPL", 150), ("TSLA", 700), ("GOOGL", 2800)]
            .into_iter()
            .map(|(symbol, price)| (symbol.to_owned(), Decimal::new(price, 0)))
            .collect();
        Self { prices }
    }

    /// Register price of `symbol`, replacing the previous one
    pub fn set_price(&mut self, symbol: impl Into<Symbol>, price: Amount) {
        self.prices.insert(symbol.into(), price.into());
    }

    /// Number of priced symbols
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// True if no symbol is priced
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl PriceSource for FixedPrices {
    fn share_price(&self, symbol: &str) -> Result<Decimal, PriceErr> {
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| PriceErr::UnknownSymbol(symbol.to_owned()))
    }
}

impl FromIterator<(Symbol, Amount)> for FixedPrices {
    fn from_iter<T: IntoIterator<Item = (Symbol, Amount)>>(iter: T) -> Self {
        Self {
            prices: iter
                .into_iter()
                .map(|(symbol, price)| (symbol, price.into()))
                .collect(),
        }
    }
}
