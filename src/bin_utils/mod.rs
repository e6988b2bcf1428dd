//! Bootstraps [`crate::session::CashSafe`] for the command line. Kept in the
//! library so integration tests can drive it the same way the binary does.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use args::{Command, TransactionArgs};
use csv_printer::{denomination_rows, log_rows, print_rows};

use crate::{
    command::TransactionKind,
    denomination::Denomination,
    format::{bill_count_phrase, format_currency},
    session::CashSafe,
    storage::{KeyValueStore, StoreError},
};

pub mod args;
pub mod csv_printer;

pub struct Service<'w, S, R, W: 'w> {
    pub store: S,
    pub input: R,
    pub output: &'w mut W,
    pub warning_printer: Box<dyn FnMut(&StoreError)>,
}

impl<'w, S, R, W> Service<'w, S, R, W>
where
    S: KeyValueStore,
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self, command: Command) -> Result<()> {
        let mut safe = CashSafe::load(self.store);

        match command {
            Command::Show => {
                print_rows(self.output, denomination_rows(safe.cash()))?;
                writeln!(
                    self.output,
                    "Total: {} ({})",
                    format_currency(safe.grand_total()),
                    bill_count_phrase(safe.total_bill_count())
                )?;
            }
            Command::Set {
                denomination,
                count,
            } => {
                safe.set_count_input(denomination, &count);
                writeln!(
                    self.output,
                    "{}: {}",
                    denomination.label(),
                    bill_count_phrase(safe.count(denomination))
                )?;
            }
            Command::Deposit(args) => {
                record(&mut safe, self.output, TransactionKind::Deposit, args)?
            }
            Command::Withdraw(args) => {
                record(&mut safe, self.output, TransactionKind::Withdraw, args)?
            }
            Command::Log => {
                print_rows(self.output, log_rows(safe.log(), &chrono::Local))?;
            }
            Command::Export => {
                if !safe.copy_backup(&mut *self.output) {
                    anyhow::bail!("Failed to write the backup");
                }
                writeln!(self.output)?;
            }
            Command::Import { .. } => {
                let mut text = String::new();
                self.input
                    .read_to_string(&mut text)
                    .context("Failed to read the backup")?;
                safe.import(&text).context("Backup was not imported")?;
                writeln!(
                    self.output,
                    "Imported {} in {} and {} log entries",
                    format_currency(safe.grand_total()),
                    bill_count_phrase(safe.total_bill_count()),
                    safe.log().len()
                )?;
            }
        }

        if let Some(err) = safe.last_save_error() {
            (self.warning_printer)(err);
        }
        Ok(())
    }
}

fn record<S, W>(
    safe: &mut CashSafe<S>,
    output: &mut W,
    kind: TransactionKind,
    args: TransactionArgs,
) -> Result<()>
where
    S: KeyValueStore,
    W: Write,
{
    let amounts = args.amounts();
    let (verb, entry) = match kind {
        TransactionKind::Deposit => (
            "Deposited",
            safe.apply_deposit(amounts, args.note)
                .context("Deposit not recorded")?,
        ),
        TransactionKind::Withdraw => (
            "Withdrew",
            safe.apply_withdrawal(amounts, args.note)
                .context("Withdrawal not recorded")?,
        ),
    };
    let line = format!(
        "{verb} {} ({}) for {}",
        format_currency(entry.amount),
        entry.breakdown,
        entry.note
    );
    writeln!(output, "{line}")?;
    writeln!(
        output,
        "Safe total: {} ({})",
        format_currency(safe.grand_total()),
        bill_count_phrase(safe.total_bill_count())
    )?;
    for d in Denomination::ALL {
        if safe.count(d) == 0 && amounts.get(d) > 0 {
            writeln!(output, "No {} bills left", d.label())?;
        }
    }
    Ok(())
}
