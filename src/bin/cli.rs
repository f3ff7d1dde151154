use banka::{Ledger, Amount, Bar, BarChart, TransactionKind};
use banka::{config::AppConfig, backend::KeyValueStore, logging};

use std::path::PathBuf;
use anyhow::Context;
use colored::Colorize;
use clap::{Args, Parser, Subcommand};

const CHART_WIDTH: usize = 40;

#[derive(Parser, Debug)]
#[clap(version, about, propagate_version = true)]
struct Cli {
    /// Path to a TOML configuration file
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Ledger file to operate on, overriding the configured one
    #[clap(short, long, value_parser)]
    store: Option<PathBuf>,

    /// Action to perform
    #[clap(subcommand)]
    action: Subcommands,
}

#[derive(Debug, Subcommand)]
enum Subcommands {
    /// Show the current balance
    Balance,
    /// Pay money into the account
    Deposit(AmountArg),
    /// Take money out of the account
    Withdraw(AmountArg),
    /// List transactions, newest first
    History(History),
    /// Show totals and a chart of deposits against withdrawals
    Summary,
    /// Convert an amount with the configured exchange rate
    Convert(AmountArg)
}

#[derive(Args, Debug)]
struct AmountArg {
    #[clap(value_parser, allow_negative_numbers = true)]
    amount: Amount
}

#[derive(Args, Debug)]
struct History {
    /// Only show deposits
    #[clap(long, conflicts_with = "withdrawals")]
    deposits: bool,

    /// Only show withdrawals
    #[clap(long)]
    withdrawals: bool
}

impl History {
    fn kind(&self) -> Option<TransactionKind> {
        if self.deposits {
            Some(TransactionKind::Deposit)
        } else if self.withdrawals {
            Some(TransactionKind::Withdrawal)
        } else {
            None
        }
    }
}

/// Front-end check mirroring what the account screen accepts.
fn check_amount(amount: Amount) -> anyhow::Result<Amount> {
    if !amount.is_finite() || amount <= 0.0 {
        anyhow::bail!("please enter a valid positive number");
    }
    Ok(amount)
}

fn check_withdrawal(amount: Amount, balance: Amount) -> anyhow::Result<Amount> {
    let amount = check_amount(amount)?;
    if amount > balance {
        anyhow::bail!("insufficient funds");
    }
    Ok(amount)
}

fn print_balance(balance: Amount) {
    let fmt_balance = format!("{:.2}", balance);
    let fmt_balance = if balance < 0.0 { fmt_balance.bright_red() } else { fmt_balance.normal() };
    println!("{}: {}", "Current balance".bold(), fmt_balance);
}

fn render_bar(bar: &Bar, width: usize) -> String {
    let cells = "█".repeat(BarChart::cells(bar, width));
    let cells = match bar.kind {
        TransactionKind::Deposit => cells.green(),
        TransactionKind::Withdrawal => cells.red()
    };
    format!("{:<12} {} {:.2}", bar.label, cells, bar.value)
}

fn print_summary<S: KeyValueStore>(ledger: &Ledger<S>) {
    print_balance(ledger.balance());
    println!("{}: {:.2}", "Total deposits".bold(), ledger.deposit_sum());
    println!("{}: {:.2}", "Total withdrawals".bold(), ledger.withdrawal_sum());
    println!();
    for bar in &ledger.chart().bars {
        println!("{}", render_bar(bar, CHART_WIDTH));
    }
}

fn print_history<S: KeyValueStore>(ledger: &Ledger<S>, kind: Option<TransactionKind>) {
    let transactions = match kind {
        Some(kind) => ledger.transactions_of(kind),
        None => ledger.transactions().iter().collect()
    };
    if transactions.is_empty() {
        println!("No transactions yet");
    }
    for t in transactions.into_iter().rev() {
        println!("{}", t);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let args = Cli::parse();

    let mut config = AppConfig::read_or_default(args.config.as_deref())?;
    if let Some(store) = args.store {
        config.storage.path = store;
    }
    log::debug!("using ledger file {}", config.storage.path.display());

    let mut ledger = config.open_ledger();

    match args.action {
        Subcommands::Balance => {
            print_balance(ledger.balance());
        },
        Subcommands::Deposit(arg) => {
            let amount = check_amount(arg.amount)?;
            let balance = ledger.deposit(amount).context("deposit failed")?;
            print_balance(balance);
        },
        Subcommands::Withdraw(arg) => {
            let amount = check_withdrawal(arg.amount, ledger.balance())?;
            let balance = ledger.withdraw(amount).context("withdrawal failed")?;
            print_balance(balance);
        },
        Subcommands::History(history) => {
            print_history(&ledger, history.kind());
        },
        Subcommands::Summary => {
            print_summary(&ledger);
        },
        Subcommands::Convert(arg) => {
            let amount = check_amount(arg.amount)?;
            let provider = config.rates.provider()?;
            let pair = ledger.currencies().clone();
            match ledger.convert(amount, provider.as_ref()).await {
                Some(converted) => println!("{:.2} {} = {:.2} {}", amount, pair.source, converted, pair.target),
                None => eprintln!("{}", "Could not fetch exchange rates.".bright_red())
            }
        }
    }

    Ok(())
}
