use crate::errors::BalanceErr;
use rust_decimal::Decimal;

/// Represents current cash balance, never negative
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Balance {
    available: Decimal,
}

impl Balance {
    /// balance after depositing `amount`, `self` stays unchanged
    pub fn checked_deposit(&self, amount: &Decimal) -> Result<Balance, BalanceErr> {
        let available = self
            .available
            .checked_add(*amount)
            .ok_or(BalanceErr::Overflow)?;
        // near Decimal::MAX the sum is rounded and may silently drop part of `amount`
        if available.checked_sub(self.available) != Some(*amount) {
            return Err(BalanceErr::Overflow);
        }
        Ok(Self { available })
    }

    /// balance after withdrawing `amount`, `self` stays unchanged
    pub fn checked_withdraw(&self, amount: &Decimal) -> Result<Balance, BalanceErr> {
        if self.available < *amount {
            return Err(BalanceErr::NotEnoughAvailableFunds);
        }

        let available = self
            .available
            .checked_sub(*amount)
            .ok_or(BalanceErr::Overflow)?;
        if self.available.checked_sub(available) != Some(*amount) {
            return Err(BalanceErr::Overflow);
        }
        Ok(Self { available })
    }
}

impl Balance {
    pub fn available(&self) -> Decimal {
        self.available
    }
}
