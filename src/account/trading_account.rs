//! Represents single user trading account
use super::balance::Balance;
use super::holdings::Holdings;
use super::transactions::*;
use crate::{
    amount::Amount,
    errors::{AccountErr, ArgumentErr, SymbolErr},
    price::PriceSource,
    Quantity, Symbol,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

/// Cash, shares and history of one trading account
///
/// Every mutating operation either succeeds and records exactly one [`Transaction`] or fails
/// without touching the account.
#[derive(Debug, Clone)]
pub struct Account<P> {
    prices: P,
    // `None` until `create_account`
    initial_deposit: Option<Amount>,
    balance: Balance,
    holdings: Holdings,
    trans_history: Vec<Transaction>,
}

impl<P: PriceSource> Account<P> {
    /// Create new empty, not yet initialized [`Account`] priced by `prices`
    pub fn new(prices: P) -> Self {
        Self {
            prices,
            initial_deposit: None,
            balance: Default::default(),
            holdings: Default::default(),
            trans_history: Vec::new(),
        }
    }

    /// Price source used for trades and valuation
    pub fn price_source(&self) -> &P {
        &self.prices
    }

    /// Mutable access to price source, for example to register new prices
    pub fn price_source_mut(&mut self) -> &mut P {
        &mut self.prices
    }

    /// Initialize account with first deposit. Can succeed only once.
    pub fn create_account(&mut self, deposit: Decimal) -> Result<(), AccountErr> {
        self.try_create_account(deposit)
            .inspect_err(|e| debug!(%deposit, error = %e, "create account rejected"))
    }

    /// Increase cash balance by `amount`
    pub fn deposit(&mut self, amount: Decimal) -> Result<(), AccountErr> {
        self.try_deposit(amount)
            .inspect_err(|e| debug!(%amount, error = %e, "deposit rejected"))
    }

    /// Decrease cash balance by `amount`
    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), AccountErr> {
        self.try_withdraw(amount)
            .inspect_err(|e| debug!(%amount, error = %e, "withdraw rejected"))
    }

    /// Buy `quantity` shares of `symbol` at current price
    pub fn buy(&mut self, symbol: &str, quantity: Quantity) -> Result<(), AccountErr> {
        self.try_buy(symbol, quantity)
            .inspect_err(|e| debug!(symbol, quantity, error = %e, "buy rejected"))
    }

    /// Sell `quantity` held shares of `symbol` at current price
    pub fn sell(&mut self, symbol: &str, quantity: Quantity) -> Result<(), AccountErr> {
        self.try_sell(symbol, quantity)
            .inspect_err(|e| debug!(symbol, quantity, error = %e, "sell rejected"))
    }

    fn try_create_account(&mut self, deposit: Decimal) -> Result<(), AccountErr> {
        if self.is_initialized() {
            return Err(AccountErr::AlreadyInitialized);
        }
        let deposit = Amount::try_from(deposit)?;
        let balance = Balance::default().checked_deposit(&deposit)?;

        self.initial_deposit = Some(deposit);
        self.balance = balance;
        self.record(Transaction::deposit(deposit));
        debug!(deposit = %deposit, "account created");
        Ok(())
    }

    fn try_deposit(&mut self, amount: Decimal) -> Result<(), AccountErr> {
        self.check_initialized()?;
        let amount = Amount::try_from(amount)?;
        let balance = self.balance.checked_deposit(&amount)?;

        self.balance = balance;
        self.record(Transaction::deposit(amount));
        debug!(%amount, "deposit applied");
        Ok(())
    }

    fn try_withdraw(&mut self, amount: Decimal) -> Result<(), AccountErr> {
        self.check_initialized()?;
        let amount = Amount::try_from(amount)?;
        let balance = self.balance.checked_withdraw(&amount)?;

        self.balance = balance;
        self.record(Transaction::withdrawal(amount));
        debug!(%amount, "withdraw applied");
        Ok(())
    }

    fn try_buy(&mut self, symbol: &str, quantity: Quantity) -> Result<(), AccountErr> {
        self.check_initialized()?;
        check_quantity(quantity)?;
        let price = self.prices.share_price(symbol)?;
        // cost that does not fit into Decimal is above any balance
        let total_cost = price
            .checked_mul(Decimal::from(quantity))
            .ok_or(AccountErr::InsufficientFunds)?;
        let balance = self.balance.checked_withdraw(&total_cost)?;
        let held = self.holdings.checked_add(symbol, quantity)?;

        self.balance = balance;
        self.holdings.set(symbol, held);
        self.record(Transaction::buy(
            total_cost,
            Trade {
                symbol: symbol.to_owned(),
                quantity,
                price_per_share: price,
            },
        ));
        debug!(symbol, quantity, %total_cost, "buy applied");
        Ok(())
    }

    fn try_sell(&mut self, symbol: &str, quantity: Quantity) -> Result<(), AccountErr> {
        self.check_initialized()?;
        check_quantity(quantity)?;
        if !self.holdings.contains(symbol) {
            return Err(SymbolErr::NotHeld(symbol.to_owned()).into());
        }
        let price = self.prices.share_price(symbol)?;
        let held = self.holdings.checked_remove(symbol, quantity)?;
        let proceeds = price
            .checked_mul(Decimal::from(quantity))
            .ok_or(AccountErr::Overflow)?;
        let balance = self.balance.checked_deposit(&proceeds)?;

        self.balance = balance;
        self.holdings.set(symbol, held);
        self.record(Transaction::sell(
            proceeds,
            Trade {
                symbol: symbol.to_owned(),
                quantity,
                price_per_share: price,
            },
        ));
        debug!(symbol, quantity, %proceeds, "sell applied");
        Ok(())
    }

    /// Cash plus value of all holdings at current prices, zero for not initialized account
    ///
    /// Fails if any held symbol can not be priced, partial sum is never returned.
    pub fn get_portfolio_value(&self) -> Result<Decimal, AccountErr> {
        if !self.is_initialized() {
            return Ok(Decimal::ZERO);
        }

        self.holdings
            .iter()
            .try_fold(
                self.balance.available(),
                |total, (symbol, quantity)| -> Result<Decimal, AccountErr> {
                    let price = self.prices.share_price(symbol)?;
                    price
                        .checked_mul(Decimal::from(*quantity))
                        .and_then(|value| total.checked_add(value))
                        .ok_or(AccountErr::Overflow)
                },
            )
    }

    /// Portfolio value minus initial deposit, zero for not initialized account
    pub fn get_profit_loss(&self) -> Result<Decimal, AccountErr> {
        match self.initial_deposit {
            None => Ok(Decimal::ZERO),
            Some(initial) => Ok(self.get_portfolio_value()? - *initial),
        }
    }

    /// Copy of currently held shares
    pub fn get_holdings(&self) -> HashMap<Symbol, Quantity> {
        self.holdings.snapshot()
    }

    /// Copy of transaction history in order of execution
    pub fn get_transactions(&self) -> Vec<Transaction> {
        self.trans_history.clone()
    }

    /// Cash available for withdraw or buy
    pub fn get_cash_balance(&self) -> Decimal {
        self.balance.available()
    }

    /// First deposit, `None` before [`Account::create_account`]
    pub fn initial_deposit(&self) -> Option<Decimal> {
        self.initial_deposit.map(Decimal::from)
    }

    /// true after successful [`Account::create_account`]
    pub fn is_initialized(&self) -> bool {
        self.initial_deposit.is_some()
    }

    fn record(&mut self, trans: Transaction) {
        self.trans_history.push(trans);
    }

    fn check_initialized(&self) -> Result<(), AccountErr> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(AccountErr::NotInitialized)
        }
    }
}

fn check_quantity(quantity: Quantity) -> Result<(), ArgumentErr> {
    if quantity == 0 {
        Err(ArgumentErr::NonPositiveQuantity)
    } else {
        Ok(())
    }
}

#[cfg(test)]
impl Account<crate::price::FixedPrices> {
    /// New account with reference prices, cash 700.0 and 2 AAPL shares
    pub fn new_test_account() -> Self {
        let mut a = Account::new(crate::price::FixedPrices::reference());
        a.create_account(Decimal::new(1000, 0)).unwrap();
        a.buy("AAPL", 2).unwrap();

        assert_eq!(a.get_cash_balance(), Decimal::new(700, 0));

        a
    }
}

#[cfg(test)]
mod test {
    use super::Account;
    use crate::amount::{Amount, NonPositiveAmountErr};
    use crate::errors::{AccountErr, ArgumentErr, PriceErr, SymbolErr};
    use crate::price::FixedPrices;
    use rust_decimal::Decimal;
    use std::collections::HashMap;

    fn new_account() -> Account<FixedPrices> {
        Account::new(FixedPrices::reference())
    }

    fn assert_unchanged(a: &Account<FixedPrices>, snapshot: &Account<FixedPrices>) {
        assert_eq!(a.get_cash_balance(), snapshot.get_cash_balance());
        assert_eq!(a.get_holdings(), snapshot.get_holdings());
        assert_eq!(a.get_transactions(), snapshot.get_transactions());
    }

    #[test]
    fn new_account_is_empty() {
        let a = new_account();

        assert!(!a.is_initialized());
        assert_eq!(a.initial_deposit(), None);
        assert_eq!(a.get_cash_balance(), Decimal::ZERO);
        assert!(a.get_holdings().is_empty());
        assert!(a.get_transactions().is_empty());
        assert_eq!(a.get_portfolio_value().unwrap(), Decimal::ZERO);
        assert_eq!(a.get_profit_loss().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn not_initialized_rejects_mutations() {
        let mut a = new_account();

        assert_eq!(a.deposit(Decimal::ONE).unwrap_err(), AccountErr::NotInitialized);
        assert_eq!(a.withdraw(Decimal::ONE).unwrap_err(), AccountErr::NotInitialized);
        assert_eq!(a.buy("AAPL", 1).unwrap_err(), AccountErr::NotInitialized);
        assert_eq!(a.sell("AAPL", 1).unwrap_err(), AccountErr::NotInitialized);
        // initialization is checked before arguments
        assert_eq!(a.deposit(Decimal::ZERO).unwrap_err(), AccountErr::NotInitialized);
        assert_eq!(a.buy("MSFT", 0).unwrap_err(), AccountErr::NotInitialized);
        assert!(a.get_transactions().is_empty());
    }

    #[test]
    fn create_account() {
        let mut a = new_account();
        a.create_account(Decimal::new(1000, 0)).unwrap();

        assert!(a.is_initialized());
        assert_eq!(a.initial_deposit(), Some(Decimal::new(1000, 0)));
        assert_eq!(a.get_cash_balance(), Decimal::new(1000, 0));
        assert_eq!(a.get_profit_loss().unwrap(), Decimal::ZERO);

        let trans = a.get_transactions();
        assert_eq!(trans.len(), 1);
        assert_eq!(trans[0].kind().as_str(), "deposit");
        assert_eq!(trans[0].amount(), Decimal::new(1000, 0));
        assert_eq!(trans[0].symbol(), None);
        assert_eq!(trans[0].quantity(), None);
    }

    #[test]
    fn create_account_errors() {
        let mut a = new_account();
        assert_eq!(
            a.create_account(Decimal::ZERO).unwrap_err(),
            AccountErr::InvalidArgument(ArgumentErr::NonPositiveAmount(NonPositiveAmountErr))
        );
        assert!(matches!(
            a.create_account(Decimal::new(-5, 0)).unwrap_err(),
            AccountErr::InvalidArgument(ArgumentErr::NonPositiveAmount(_))
        ));
        assert!(!a.is_initialized());

        a.create_account(Decimal::new(100, 0)).unwrap();
        assert_eq!(
            a.create_account(Decimal::new(500, 0)).unwrap_err(),
            AccountErr::AlreadyInitialized
        );
        assert_eq!(
            a.create_account(Decimal::ZERO).unwrap_err(),
            AccountErr::AlreadyInitialized
        );
        assert_eq!(a.initial_deposit(), Some(Decimal::new(100, 0)));
        assert_eq!(a.get_transactions().len(), 1);
    }

    #[test]
    fn deposit_then_withdraw_restores_balance() {
        let mut a = new_account();
        a.create_account(Decimal::new(100, 0)).unwrap();

        a.deposit(Decimal::new(255, 1)).unwrap();
        assert_eq!(a.get_cash_balance(), Decimal::new(1255, 1));
        a.withdraw(Decimal::new(255, 1)).unwrap();

        assert_eq!(a.get_cash_balance(), Decimal::new(100, 0));
        let trans = a.get_transactions();
        assert_eq!(trans.len(), 3);
        assert_eq!(trans[1].kind().as_str(), "deposit");
        assert_eq!(trans[2].kind().as_str(), "withdrawal");
        assert_eq!(trans[2].amount(), Decimal::new(255, 1));
    }

    #[test]
    fn cash_argument_errors() {
        let mut a = new_account();
        a.create_account(Decimal::new(100, 0)).unwrap();
        let snapshot = a.clone();

        assert!(matches!(
            a.deposit(Decimal::ZERO).unwrap_err(),
            AccountErr::InvalidArgument(_)
        ));
        assert!(matches!(
            a.withdraw(Decimal::new(-1, 0)).unwrap_err(),
            AccountErr::InvalidArgument(_)
        ));
        assert_unchanged(&a, &snapshot);
    }

    #[test]
    fn withdraw_above_balance() {
        let mut a = new_account();
        a.create_account(Decimal::new(100, 0)).unwrap();
        let snapshot = a.clone();

        assert_eq!(
            a.withdraw(Decimal::new(150, 0)).unwrap_err(),
            AccountErr::InsufficientFunds
        );
        assert_unchanged(&a, &snapshot);

        a.withdraw(Decimal::new(100, 0)).unwrap();
        assert_eq!(a.get_cash_balance(), Decimal::ZERO);
    }

    #[test]
    fn deposit_lost_to_rounding_is_not_recorded() {
        let mut a = new_account();
        a.create_account(Decimal::MAX - Decimal::ONE).unwrap();
        let snapshot = a.clone();

        assert_eq!(
            a.deposit(Decimal::new(4, 1)).unwrap_err(),
            AccountErr::Overflow
        );
        assert_unchanged(&a, &snapshot);
        assert_eq!(a.get_transactions().len(), 1);
    }

    #[test]
    fn buy_then_sell_everything() {
        let mut a = new_account();
        a.create_account(Decimal::new(1000, 0)).unwrap();

        a.buy("AAPL", 2).unwrap();
        assert_eq!(a.get_cash_balance(), Decimal::new(700, 0));
        assert_eq!(a.get_holdings(), HashMap::from([("AAPL".to_owned(), 2)]));
        assert_eq!(a.get_transactions().len(), 2);
        assert_eq!(a.get_portfolio_value().unwrap(), Decimal::new(1000, 0));

        a.sell("AAPL", 2).unwrap();
        assert_eq!(a.get_cash_balance(), Decimal::new(1000, 0));
        assert!(a.get_holdings().is_empty());
        assert_eq!(a.get_profit_loss().unwrap(), Decimal::ZERO);

        let trans = a.get_transactions();
        assert_eq!(trans.len(), 3);
        for t in &trans[1..] {
            assert_eq!(t.symbol(), Some("AAPL"));
            assert_eq!(t.quantity(), Some(2));
            assert_eq!(t.price_per_share(), Some(Decimal::new(150, 0)));
            assert_eq!(t.amount(), Decimal::new(300, 0));
        }
        assert_eq!(trans[1].kind().as_str(), "buy");
        assert_eq!(trans[2].kind().as_str(), "sell");
    }

    #[test]
    fn partial_sell_keeps_entry() {
        let mut a = Account::new_test_account();

        a.sell("AAPL", 1).unwrap();
        assert_eq!(a.get_holdings(), HashMap::from([("AAPL".to_owned(), 1)]));
        assert_eq!(a.get_cash_balance(), Decimal::new(850, 0));
    }

    #[test]
    fn buy_errors() {
        let mut a = Account::new_test_account();
        let snapshot = a.clone();

        assert_eq!(
            a.buy("AAPL", 0).unwrap_err(),
            AccountErr::InvalidArgument(ArgumentErr::NonPositiveQuantity)
        );
        // argument shape is checked before symbol
        assert_eq!(
            a.buy("MSFT", 0).unwrap_err(),
            AccountErr::InvalidArgument(ArgumentErr::NonPositiveQuantity)
        );
        assert_eq!(
            a.buy("MSFT", 1).unwrap_err(),
            AccountErr::InvalidSymbol(SymbolErr::Price(PriceErr::UnknownSymbol("MSFT".into())))
        );
        // 700 cash, 5 AAPL cost 750
        assert_eq!(a.buy("AAPL", 5).unwrap_err(), AccountErr::InsufficientFunds);
        // symbol is checked before funds
        assert!(matches!(
            a.buy("MSFT", u64::MAX).unwrap_err(),
            AccountErr::InvalidSymbol(_)
        ));
        assert_eq!(
            a.buy("GOOGL", u64::MAX).unwrap_err(),
            AccountErr::InsufficientFunds
        );
        assert_unchanged(&a, &snapshot);
    }

    #[test]
    fn sell_errors() {
        let mut a = Account::new_test_account();
        let snapshot = a.clone();

        assert_eq!(
            a.sell("AAPL", 0).unwrap_err(),
            AccountErr::InvalidArgument(ArgumentErr::NonPositiveQuantity)
        );
        assert_eq!(
            a.sell("TSLA", 1).unwrap_err(),
            AccountErr::InvalidSymbol(SymbolErr::NotHeld("TSLA".into()))
        );
        // not held is reported before the price lookup
        assert_eq!(
            a.sell("XYZ", 1).unwrap_err(),
            AccountErr::InvalidSymbol(SymbolErr::NotHeld("XYZ".into()))
        );
        assert_eq!(
            a.sell("AAPL", 3).unwrap_err(),
            AccountErr::InsufficientHoldings
        );
        assert_unchanged(&a, &snapshot);
    }

    #[test]
    fn register_price_after_failed_buy() {
        let mut a = new_account();
        a.create_account(Decimal::new(1000, 0)).unwrap();

        assert!(matches!(
            a.buy("MSFT", 1).unwrap_err(),
            AccountErr::InvalidSymbol(_)
        ));
        assert_eq!(a.get_cash_balance(), Decimal::new(1000, 0));
        assert!(a.get_holdings().is_empty());

        a.price_source_mut()
            .set_price("MSFT", Amount::new(3005, 1).unwrap());
        a.buy("MSFT", 2).unwrap();
        assert_eq!(a.get_cash_balance(), Decimal::new(399, 0));
        assert_eq!(a.get_holdings()["MSFT"], 2);
    }

    #[test]
    fn profit_and_loss_follow_price() {
        let mut a = Account::new_test_account();

        a.price_source_mut()
            .set_price("AAPL", Amount::new(200, 0).unwrap());
        assert_eq!(a.get_portfolio_value().unwrap(), Decimal::new(1100, 0));
        assert_eq!(a.get_profit_loss().unwrap(), Decimal::new(100, 0));

        a.price_source_mut()
            .set_price("AAPL", Amount::new(100, 0).unwrap());
        assert_eq!(a.get_profit_loss().unwrap(), Decimal::new(-100, 0));

        a.sell("AAPL", 2).unwrap();
        assert_eq!(a.get_cash_balance(), Decimal::new(900, 0));
        assert_eq!(a.get_transactions()[2].price_per_share(), Some(Decimal::new(100, 0)));
    }

    #[test]
    fn deposits_are_not_profit() {
        let mut a = Account::new_test_account();
        a.deposit(Decimal::new(500, 0)).unwrap();

        assert_eq!(a.get_portfolio_value().unwrap(), Decimal::new(1500, 0));
        assert_eq!(a.get_profit_loss().unwrap(), Decimal::new(500, 0));
        assert_eq!(a.initial_deposit(), Some(Decimal::new(1000, 0)));
    }

    #[test]
    fn unpriceable_holding_fails_valuation() {
        let mut prices = FixedPrices::new();
        prices.set_price("ACME", Amount::new(10, 0).unwrap());
        let mut a = Account::new(prices);
        a.create_account(Decimal::new(100, 0)).unwrap();
        a.buy("ACME", 3).unwrap();

        *a.price_source_mut() = FixedPrices::new();
        assert_eq!(
            a.get_portfolio_value().unwrap_err(),
            AccountErr::InvalidSymbol(SymbolErr::Price(PriceErr::UnknownSymbol("ACME".into())))
        );
        assert!(a.get_profit_loss().is_err());
        assert!(matches!(a.sell("ACME", 1).unwrap_err(), AccountErr::InvalidSymbol(_)));
        assert_eq!(a.get_holdings()["ACME"], 3);
    }

    #[test]
    fn snapshots_are_copies() {
        let mut a = Account::new_test_account();

        let mut holdings = a.get_holdings();
        holdings.insert("TSLA".into(), 10);
        holdings.remove("AAPL");
        let mut trans = a.get_transactions();
        trans.clear();

        assert_eq!(a.get_holdings(), HashMap::from([("AAPL".to_owned(), 2)]));
        assert_eq!(a.get_transactions().len(), 2);

        a.deposit(Decimal::ONE).unwrap();
        assert_eq!(trans.len(), 0);
    }

    #[test]
    fn transactions_are_chronological() {
        let mut a = Account::new_test_account();
        a.deposit(Decimal::ONE).unwrap();
        a.sell("AAPL", 1).unwrap();

        let trans = a.get_transactions();
        let kinds: Vec<_> = trans.iter().map(|t| t.kind().as_str()).collect();
        assert_eq!(kinds, ["deposit", "buy", "deposit", "sell"]);
        assert!(trans
            .windows(2)
            .all(|w| w[0].timestamp() <= w[1].timestamp()));
    }
}
