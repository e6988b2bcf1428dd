use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    command::{TransactionCommand, TransactionKind},
    denomination::{BillCounts, Denomination, clamp_count},
};

#[derive(Debug, PartialEq, Eq)]
pub enum CashEvent {
    CountSet {
        denomination: Denomination,
        count: u64,
    },
    Deposited(BillCounts),
    Withdrawn(BillCounts),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CashError {
    #[error("Insufficient {denomination} bills: requested {requested}, available {available}")]
    InsufficientBills {
        denomination: Denomination,
        requested: u64,
        available: u64,
    },
}

/// Bills currently in the safe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CashState {
    counts: BillCounts,
}

impl CashState {
    pub fn from_counts(counts: BillCounts) -> Self {
        Self { counts }
    }

    pub fn counts(&self) -> &BillCounts {
        &self.counts
    }

    pub fn count(&self, denomination: Denomination) -> u64 {
        self.counts.get(denomination)
    }

    pub fn grand_total(&self) -> u64 {
        self.counts.total_value()
    }

    pub fn total_bill_count(&self) -> u64 {
        self.counts.total_bills()
    }

    pub fn apply(&mut self, event: &CashEvent) {
        match event {
            CashEvent::CountSet {
                denomination,
                count,
            } => {
                self.counts.set(*denomination, *count);
            }
            CashEvent::Deposited(amounts) => {
                for (d, count) in amounts.iter() {
                    self.counts.set(d, self.counts.get(d).saturating_add(count));
                }
            }
            CashEvent::Withdrawn(amounts) => {
                for (d, count) in amounts.iter() {
                    self.counts.set(d, self.counts.get(d).saturating_sub(count));
                }
            }
        }
    }

    pub fn handle_set_count(&self, denomination: Denomination, new_count: i64) -> CashEvent {
        CashEvent::CountSet {
            denomination,
            count: clamp_count(new_count),
        }
    }

    /// Counts may have moved since the command was validated, so withdrawals
    /// are checked again here and rejected as a whole.
    pub fn handle_transaction(&self, command: &TransactionCommand) -> Result<CashEvent, CashError> {
        let amounts = *command.amounts();
        match command.kind() {
            TransactionKind::Deposit => Ok(CashEvent::Deposited(amounts)),
            TransactionKind::Withdraw => {
                if let Some((denomination, requested)) = amounts
                    .iter()
                    .find(|(d, requested)| *requested > self.count(*d))
                {
                    return Err(CashError::InsufficientBills {
                        denomination,
                        requested,
                        available: self.count(denomination),
                    });
                }
                Ok(CashEvent::Withdrawn(amounts))
            }
        }
    }
}
