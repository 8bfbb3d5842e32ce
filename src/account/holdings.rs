use std::collections::HashMap;

use crate::{errors::HoldingsErr, Quantity, Symbol};

/// Shares owned per symbol. Zero quantities are never stored.
#[derive(Debug, Clone, Default)]
pub struct Holdings {
    shares: HashMap<Symbol, Quantity>,
}

impl Holdings {
    /// quantity held after buying `quantity` more of `symbol`
    pub fn checked_add(&self, symbol: &str, quantity: Quantity) -> Result<Quantity, HoldingsErr> {
        self.held(symbol)
            .checked_add(quantity)
            .ok_or(HoldingsErr::Overflow)
    }

    /// quantity left after selling `quantity` of `symbol`, symbol not held has zero shares
    pub fn checked_remove(
        &self,
        symbol: &str,
        quantity: Quantity,
    ) -> Result<Quantity, HoldingsErr> {
        self.held(symbol)
            .checked_sub(quantity)
            .ok_or(HoldingsErr::NotEnoughShares)
    }

    /// true if any share of `symbol` is held
    pub fn contains(&self, symbol: &str) -> bool {
        self.shares.contains_key(symbol)
    }

    /// store quantity previously computed by [`Holdings::checked_add`] or
    /// [`Holdings::checked_remove`], zero removes the entry
    pub fn set(&mut self, symbol: &str, quantity: Quantity) {
        if quantity == 0 {
            self.shares.remove(symbol);
        } else if let Some(held) = self.shares.get_mut(symbol) {
            *held = quantity;
        } else {
            self.shares.insert(symbol.to_owned(), quantity);
        }
    }
}

impl Holdings {
    pub fn held(&self, symbol: &str) -> Quantity {
        self.shares.get(symbol).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Quantity)> {
        self.shares.iter()
    }

    pub fn snapshot(&self) -> HashMap<Symbol, Quantity> {
        self.shares.clone()
    }
}
