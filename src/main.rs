use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use papertrade::broker::Session;
use papertrade::clock::{Clock, SystemClock};
use papertrade::config::{self, ResolvedConfig};
use papertrade::error::TradeError;
use papertrade::format;
use papertrade::market_data::YahooChartSource;
use papertrade::models::{Account, AccountName};
use papertrade::storage::{AccountStore, JsonFileStore};
use papertrade::validate::{self, TradeRequest};

#[derive(Parser)]
#[command(name = "papertrade")]
#[command(about = "Brokerage account simulator over historical closing prices")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open a new account with a starting cash balance
    Create {
        account: AccountName,
        opening_balance: Decimal,
    },
    /// Buy shares at a historical closing price
    Buy {
        account: AccountName,
        ticker: String,
        quantity: i64,
        /// "now" or a YYYY-MM-DD trading date
        #[arg(long, default_value = "now")]
        date: String,
    },
    /// Sell shares out of the lot purchased on the given date
    Sell {
        account: AccountName,
        ticker: String,
        quantity: i64,
        /// "now" or the YYYY-MM-DD purchase date of the lot
        #[arg(long, default_value = "now")]
        date: String,
    },
    /// Show balance, open holdings, and closed positions
    Statement { account: AccountName },
    /// Print the invested/value timeline as CSV for an external plotter
    Curve {
        account: AccountName,
        /// "now" or a YYYY-MM-DD upper bound for the timeline
        #[arg(long, default_value = "now")]
        as_of: String,
    },
    /// List stored accounts
    Accounts,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config::default_config_path);
    let config = ResolvedConfig::load_or_default(&config_path)?;
    let store = JsonFileStore::new(&config.data_dir);
    let symbol = config.display.currency_symbol.as_str();

    println!("{}", format::banner(SystemClock.today()));

    match cli.command {
        Command::Create {
            account,
            opening_balance,
        } => {
            if store.load(&account).await?.is_some() {
                bail!("account {account} already exists");
            }
            let account = Account::open(account, opening_balance)?;
            store.save(&account).await?;
            println!(
                "Account {} created with balance {}.",
                account.name(),
                format::money(account.balance(), symbol)
            );
        }
        Command::Buy {
            account,
            ticker,
            quantity,
            date,
        } => {
            let request = TradeRequest::new(ticker, quantity, date);
            trade(&store, &account, &request, TradeKind::Buy, symbol).await?;
        }
        Command::Sell {
            account,
            ticker,
            quantity,
            date,
        } => {
            let request = TradeRequest::new(ticker, quantity, date);
            trade(&store, &account, &request, TradeKind::Sell, symbol).await?;
        }
        Command::Statement { account } => {
            let account = load_account(&store, &account).await?;
            let mut session = new_session();
            match session.statement(&account).await {
                Ok(statement) => {
                    for line in format::statement_lines(&statement, symbol) {
                        println!("{line}");
                    }
                }
                Err(err) => report(err),
            }
        }
        Command::Curve { account, as_of } => {
            let account = load_account(&store, &account).await?;
            let as_of = match validate::parse_requested_date(&as_of) {
                Ok(as_of) => as_of,
                Err(err) => {
                    report(err);
                    return Ok(());
                }
            };
            let mut session = new_session();
            match session.curve(&account, as_of).await {
                Ok(curve) => {
                    for annotation in &curve.annotations {
                        println!(
                            "# + {}x {} on {}",
                            annotation.quantity, annotation.ticker, annotation.purchase_date
                        );
                    }
                    println!("date,invested,value");
                    for point in &curve.points {
                        println!("{},{},{}", point.date, point.invested, point.value);
                    }
                }
                Err(err) => report(err),
            }
        }
        Command::Accounts => {
            for name in store.list().await? {
                println!("{name}");
            }
        }
    }

    Ok(())
}

enum TradeKind {
    Buy,
    Sell,
}

fn new_session() -> Session {
    Session::new(Arc::new(YahooChartSource::new()))
}

async fn load_account(store: &JsonFileStore, name: &AccountName) -> Result<Account> {
    match store.load(name).await? {
        Some(account) => Ok(account),
        None => bail!("no account named {name}; run `papertrade create {name} <balance>` first"),
    }
}

/// Run one buy/sell against a stored account. Trade rejections are
/// displayed, not propagated; the account file is only rewritten after
/// a committed trade.
async fn trade(
    store: &JsonFileStore,
    name: &AccountName,
    request: &TradeRequest,
    kind: TradeKind,
    symbol: &str,
) -> Result<()> {
    let mut account = load_account(store, name).await?;
    let mut session = new_session();
    let outcome = match kind {
        TradeKind::Buy => session.buy(&mut account, request).await,
        TradeKind::Sell => session.sell(&mut account, request).await,
    };
    match outcome {
        Ok(confirmation) => {
            store.save(&account).await?;
            println!("{}", format::confirmation_line(&confirmation, symbol));
        }
        Err(err) => report(err),
    }
    Ok(())
}

fn report(err: TradeError) {
    println!("Error: {err}");
}
