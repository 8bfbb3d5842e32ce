//! # trading-account
//! Application applies account commands from input csv file to a single trading account and
//! prints selected report to output.
//!
//! ## Input format
//! csv with columns `type`, `symbol`, `amount`, `quantity`
//!
//! ```csv
//! type,symbol,amount,quantity
//! create,,1000,
//! buy,AAPL,,2
//! sell,AAPL,,1
//! withdrawal,,50,
//! ```
//!
//! Rejected commands are logged to stderr and do not stop processing.

#![deny(missing_docs)]

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tokio::{
    io::{stdout, BufReader},
    spawn,
    sync::mpsc::{channel, Receiver, Sender},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use trading_account::{
    account::Account,
    csv::{self, RawCommand, RecordNo},
    price::{FixedPrices, PriceSource},
};

/// Replay trading account commands from csv and print a report
#[derive(Debug, Parser)]
#[command(name = "trading-account", version, about)]
struct Cli {
    /// csv file with `type,symbol,amount,quantity` commands
    commands: PathBuf,

    /// csv file with `symbol,price` rows used instead of built-in AAPL, TSLA, GOOGL prices
    #[arg(long)]
    prices: Option<PathBuf>,

    /// report printed to stdout after all commands
    #[arg(long, value_enum, default_value_t = Report::Summary)]
    report: Report,

    /// log filter, overridden by `TRADING_ACCOUNT_LOG`
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Report {
    /// cash, initial deposit, portfolio value and profit/loss
    Summary,
    /// held shares valued at current prices
    Holdings,
    /// transaction history
    Ledger,
}

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_env("TRADING_ACCOUNT_LOG")
        .or_else(|_| EnvFilter::try_new(log_level))
        .context("invalid log filter")?;

    // stdout is reserved for the report
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn load_prices(filename: &Path) -> anyhow::Result<FixedPrices> {
    let f = tokio::fs::File::open(filename)
        .await
        .context("access prices file")?;

    csv::read_prices_from_csv_reader(BufReader::new(f))
        .await
        .context("improper content of prices file")
}

async fn read_commands_from_file(
    filename: PathBuf,
    sender: Sender<(RecordNo, RawCommand)>,
) -> anyhow::Result<()> {
    let f = tokio::fs::File::open(filename)
        .await
        .context("access input file")?;

    let bf = BufReader::new(f);
    csv::deserialize_commands_from_csv_reader(bf, sender)
        .await
        .context("improper content of file")
}

/// returns number of applied and rejected commands
async fn apply_commands<P: PriceSource>(
    account: &mut Account<P>,
    input: Receiver<(RecordNo, RawCommand)>,
) -> (usize, usize) {
    let mut input = input;
    let (mut applied, mut rejected) = (0, 0);

    while let Some((record_no, command)) = input.recv().await {
        match command.apply(account) {
            Ok(()) => applied += 1,
            Err(e) => {
                warn!(record = record_no, command = ?command.r#type, error = %e, "command rejected");
                rejected += 1;
            }
        }
    }

    (applied, rejected)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let prices = match &cli.prices {
        Some(filename) => load_prices(filename).await?,
        None => FixedPrices::reference(),
    };
    info!(symbols = prices.len(), "prices loaded");
    let mut account = Account::new(prices);

    // read commands from csv file
    let (tx_command, rx_command) = channel(8192);
    let task_read_csv = spawn(read_commands_from_file(cli.commands.clone(), tx_command));

    // commands must be applied in order of the file
    let (applied, rejected) = apply_commands(&mut account, rx_command).await;
    task_read_csv.await??;
    info!(applied, rejected, "commands processed");

    let out = stdout();
    match cli.report {
        Report::Summary => csv::summarize_account(&account, out).await,
        Report::Holdings => csv::write_holdings(&account, out).await,
        Report::Ledger => csv::write_ledger(&account, out).await,
    }
    .context("failed to save output")?;

    Ok(())
}
