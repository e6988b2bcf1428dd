use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::denomination::{BillCounts, Denomination, ParseDenominationError, parse_count};

/// Track the bills in your cash safe
#[derive(Parser, Debug)]
#[command(name = "cash-safe", version, long_about = None)]
pub struct CliArgs {
    /// Directory holding the saved denominations and activity log
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        env = "CASH_SAFE_DIR",
        default_value = ".cash-safe",
        global = true
    )]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print bill counts per denomination and the totals
    Show,
    /// Replace the count of one denomination
    Set {
        #[arg(value_name = "DENOMINATION")]
        denomination: Denomination,
        /// New count; negative or non-numeric input becomes 0
        #[arg(value_name = "COUNT", allow_hyphen_values = true)]
        count: String,
    },
    /// Add bills to the safe
    Deposit(TransactionArgs),
    /// Take bills out of the safe
    Withdraw(TransactionArgs),
    /// Print the activity log, newest first
    Log,
    /// Write a backup of the safe to stdout
    Export,
    /// Replace the safe with a backup read from FILE or stdin
    Import {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

#[derive(Args, Debug, PartialEq, Eq)]
pub struct TransactionArgs {
    /// What the cash is for, or where it came from
    #[arg(long, short)]
    pub note: String,

    /// Bills as DENOMINATION=COUNT, e.g. `twenties=2 fives=1`
    #[arg(value_name = "BILLS", required = true, value_parser = parse_bills)]
    pub bills: Vec<(Denomination, u64)>,
}

impl TransactionArgs {
    pub fn amounts(&self) -> BillCounts {
        self.bills.iter().copied().collect()
    }
}

#[derive(Debug, Error)]
pub enum ParseAmountsError {
    #[error("Expected DENOMINATION=COUNT, got `{0}`")]
    MissingSeparator(String),
    #[error(transparent)]
    Denomination(#[from] ParseDenominationError),
}

fn parse_bills(input: &str) -> Result<(Denomination, u64), ParseAmountsError> {
    let (denomination, count) = input
        .split_once('=')
        .ok_or_else(|| ParseAmountsError::MissingSeparator(input.to_string()))?;
    // counts are coerced like every other count input
    Ok((denomination.parse()?, parse_count(count)))
}
