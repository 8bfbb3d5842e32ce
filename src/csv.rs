//! csv input/output format and functions

use anyhow::Context;
use chrono::{DateTime, Utc};
use csv_async::{AsyncWriterBuilder, Terminator};
use rust_decimal::Decimal;

use crate::{
    account::{Account, Transaction},
    amount::Amount,
    errors::{AccountErr, ArgumentErr},
    price::{FixedPrices, PriceSource},
    Quantity, Symbol,
};
use serde::{Deserialize, Serialize};

use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::mpsc::Sender,
};
use tokio_stream::StreamExt;

/// round precision of money values in reports
const ROUND_DP: u32 = 4;

/// Record number counted from 1, header excluded
pub type RecordNo = u64;

// Allowed account operations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum RawCommandType {
    Create,
    Deposit,
    Withdrawal,
    Buy,
    Sell,
}

/// One account operation read from csv
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct RawCommand {
    pub r#type: RawCommandType,
    pub symbol: Option<Symbol>,
    pub amount: Option<Decimal>,
    // signed so that negative quantity is rejected by `apply` instead of failing the whole read
    pub quantity: Option<i64>,
}

impl RawCommand {
    /// apply command to `account`
    ///
    /// Symbols are upper-cased before use. Missing field required by command type is reported
    /// as [`ArgumentErr::MissingField`] and account stays unchanged.
    pub fn apply<P: PriceSource>(&self, account: &mut Account<P>) -> Result<(), AccountErr> {
        match self.r#type {
            RawCommandType::Create => account.create_account(self.amount()?),
            RawCommandType::Deposit => account.deposit(self.amount()?),
            RawCommandType::Withdrawal => account.withdraw(self.amount()?),
            RawCommandType::Buy => account.buy(&self.symbol()?, self.quantity()?),
            RawCommandType::Sell => account.sell(&self.symbol()?, self.quantity()?),
        }
    }

    fn amount(&self) -> Result<Decimal, ArgumentErr> {
        self.amount.ok_or(ArgumentErr::MissingField("amount"))
    }

    fn quantity(&self) -> Result<Quantity, ArgumentErr> {
        let quantity = self.quantity.ok_or(ArgumentErr::MissingField("quantity"))?;
        Quantity::try_from(quantity).map_err(|_| ArgumentErr::NonPositiveQuantity)
    }

    fn symbol(&self) -> Result<Symbol, ArgumentErr> {
        self.symbol
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_uppercase)
            .ok_or(ArgumentErr::MissingField("symbol"))
    }
}

/// take a reader and continuously deserialize commands from it into `sender`
pub async fn deserialize_commands_from_csv_reader<'r, R: AsyncRead + Unpin + Send + 'r>(
    input: R,
    sender: Sender<(RecordNo, RawCommand)>,
) -> anyhow::Result<()> {
    let mut builder = csv_async::AsyncReaderBuilder::new();
    builder.trim(csv_async::Trim::All);

    let mut rdr = builder.create_deserializer(input);

    let _headers = rdr.headers().await?;

    let mut records = rdr.deserialize::<RawCommand>();
    let mut record_no = 0;
    while let Some(record) = records.next().await {
        record_no += 1;
        let record: RawCommand =
            record.with_context(|| format!("malformed command record {record_no}"))?;
        sender.send((record_no, record)).await?;
    }

    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
struct RawPrice {
    symbol: Symbol,
    price: Amount,
}

/// read `symbol,price` table. Symbols are upper-cased.
pub async fn read_prices_from_csv_reader<'r, R: AsyncRead + Unpin + Send + 'r>(
    input: R,
) -> anyhow::Result<FixedPrices> {
    let mut builder = csv_async::AsyncReaderBuilder::new();
    builder.trim(csv_async::Trim::All);

    let mut rdr = builder.create_deserializer(input);
    let mut records = rdr.deserialize::<RawPrice>();

    let mut prices = FixedPrices::new();
    while let Some(record) = records.next().await {
        let record = record.context("malformed price record")?;
        prices.set_price(record.symbol.to_uppercase(), record.price);
    }

    Ok(prices)
}

/// summary of account balance and value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct AccountSummary {
    pub cash: Decimal,
    pub initial_deposit: Option<Decimal>,
    pub portfolio_value: Decimal,
    pub profit_loss: Decimal,
}

impl<P: PriceSource> TryFrom<&Account<P>> for AccountSummary {
    type Error = AccountErr;
    fn try_from(oth: &Account<P>) -> Result<Self, Self::Error> {
        Ok(Self {
            cash: oth.get_cash_balance().round_dp(ROUND_DP),
            initial_deposit: oth.initial_deposit().map(|d| d.round_dp(ROUND_DP)),
            portfolio_value: oth.get_portfolio_value()?.round_dp(ROUND_DP),
            profit_loss: oth.get_profit_loss()?.round_dp(ROUND_DP),
        })
    }
}

/// one held symbol valued at current price
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct HoldingRecord {
    pub symbol: Symbol,
    pub quantity: Quantity,
    pub price: Decimal,
    pub value: Decimal,
}

/// one row of transaction history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct LedgerRecord {
    pub timestamp: DateTime<Utc>,
    pub r#type: String,
    pub amount: Decimal,
    pub symbol: Option<Symbol>,
    pub quantity: Option<Quantity>,
    pub price_per_share: Option<Decimal>,
}

impl From<&Transaction> for LedgerRecord {
    fn from(t: &Transaction) -> Self {
        Self {
            timestamp: t.timestamp(),
            r#type: t.kind().to_string(),
            amount: t.amount().round_dp(ROUND_DP),
            symbol: t.symbol().map(str::to_owned),
            quantity: t.quantity(),
            price_per_share: t.price_per_share().map(|p| p.round_dp(ROUND_DP)),
        }
    }
}

/// save [`AccountSummary`] of `account` into `wr`. Headers will be included automatically.
pub async fn summarize_account<P: PriceSource>(
    account: &Account<P>,
    wr: impl AsyncWrite + Unpin,
) -> anyhow::Result<()> {
    let summary = AccountSummary::try_from(account).context("account valuation")?;
    write_records([summary], wr).await
}

/// save one [`HoldingRecord`] per held symbol, ordered by symbol
pub async fn write_holdings<P: PriceSource>(
    account: &Account<P>,
    wr: impl AsyncWrite + Unpin,
) -> anyhow::Result<()> {
    let mut holdings: Vec<_> = account.get_holdings().into_iter().collect();
    holdings.sort_unstable();

    let mut records = Vec::with_capacity(holdings.len());
    for (symbol, quantity) in holdings {
        let price = account
            .price_source()
            .share_price(&symbol)
            .with_context(|| format!("price of held {symbol}"))?;
        let value = price
            .checked_mul(Decimal::from(quantity))
            .ok_or(AccountErr::Overflow)?;
        records.push(HoldingRecord {
            symbol,
            quantity,
            price: price.round_dp(ROUND_DP),
            value: value.round_dp(ROUND_DP),
        });
    }

    write_records(records, wr).await
}

/// save transaction history in order of execution
pub async fn write_ledger<P: PriceSource>(
    account: &Account<P>,
    wr: impl AsyncWrite + Unpin,
) -> anyhow::Result<()> {
    let records = account.get_transactions();
    write_records(records.iter().map(LedgerRecord::from), wr).await
}

/// Terminator is `\r\n`
async fn write_records<S: Serialize>(
    records: impl IntoIterator<Item = S>,
    wr: impl AsyncWrite + Unpin,
) -> anyhow::Result<()> {
    let mut builder = AsyncWriterBuilder::new();
    builder.terminator(Terminator::CRLF);

    let mut wr = builder.create_serializer(wr);

    for record in records {
        wr.serialize(record).await?;
    }

    wr.flush().await?;
    Ok(())
}
