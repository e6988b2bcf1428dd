use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cash::CashState,
    denomination::{BillCounts, Denomination},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
}

/// Reasons a draft cannot be submitted yet. These disable the action rather
/// than signal a failure of the ledger.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("At least one bill is required for a {kind:?}")]
    EmptyAmount { kind: TransactionKind },
    #[error("A note is required for a {kind:?}")]
    MissingNote { kind: TransactionKind },
    #[error("Cannot withdraw {requested} of {denomination}, only {available} available")]
    InsufficientBills {
        denomination: Denomination,
        requested: u64,
        available: u64,
    },
}

/// Deposit or withdrawal being filled in, not yet checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub amounts: BillCounts,
    pub note: String,
}

/// A draft that passed [`TransactionDraft::validate`]. The only way to obtain
/// one, so the ledger never sees an unchecked request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionCommand {
    kind: TransactionKind,
    amounts: BillCounts,
    note: String,
}

impl TransactionDraft {
    pub fn withdrawal(amounts: BillCounts, note: impl Into<String>) -> Self {
        Self {
            kind: TransactionKind::Withdraw,
            amounts,
            note: note.into(),
        }
    }

    pub fn deposit(amounts: BillCounts, note: impl Into<String>) -> Self {
        Self {
            kind: TransactionKind::Deposit,
            amounts,
            note: note.into(),
        }
    }

    pub fn total(&self) -> u64 {
        self.amounts.total_value()
    }

    /// Whether more bills are requested than the safe holds.
    pub fn is_overdrawn(&self, denomination: Denomination, cash: &CashState) -> bool {
        self.kind == TransactionKind::Withdraw
            && self.amounts.get(denomination) > cash.count(denomination)
    }

    pub fn can_submit(&self, cash: &CashState) -> bool {
        self.check(cash).is_ok()
    }

    pub fn validate(self, cash: &CashState) -> Result<TransactionCommand, DraftError> {
        self.check(cash)?;
        Ok(TransactionCommand {
            kind: self.kind,
            amounts: self.amounts,
            note: self.note,
        })
    }

    fn check(&self, cash: &CashState) -> Result<(), DraftError> {
        let kind = self.kind;
        if self.total() == 0 {
            return Err(DraftError::EmptyAmount { kind });
        }
        if self.note.trim().is_empty() {
            return Err(DraftError::MissingNote { kind });
        }
        if let Some(denomination) = Denomination::ALL
            .into_iter()
            .find(|d| self.is_overdrawn(*d, cash))
        {
            return Err(DraftError::InsufficientBills {
                denomination,
                requested: self.amounts.get(denomination),
                available: cash.count(denomination),
            });
        }
        Ok(())
    }
}

impl TransactionCommand {
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amounts(&self) -> &BillCounts {
        &self.amounts
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn total(&self) -> u64 {
        self.amounts.total_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn safe() -> CashState {
        CashState::from_counts(
            BillCounts::default()
                .with(Denomination::Hundreds, 1)
                .with(Denomination::Twenties, 2),
        )
    }

    #[test]
    fn valid_withdrawal() {
        let draft = TransactionDraft::withdrawal(
            BillCounts::default().with(Denomination::Twenties, 2),
            "Groceries",
        );
        assert_eq!(draft.total(), 40);
        assert!(draft.can_submit(&safe()));
        let cmd = draft.validate(&safe()).unwrap();
        assert_eq!(cmd.kind(), TransactionKind::Withdraw);
        assert_eq!(cmd.total(), 40);
        assert_eq!(cmd.note(), "Groceries");
    }

    #[test]
    fn empty_amount_is_rejected() {
        let err = TransactionDraft::deposit(BillCounts::default(), "ATM")
            .validate(&safe())
            .unwrap_err();
        assert_eq!(
            err,
            DraftError::EmptyAmount {
                kind: TransactionKind::Deposit
            }
        );
    }

    #[test]
    fn whitespace_note_is_rejected() {
        let draft = TransactionDraft::deposit(
            BillCounts::default().with(Denomination::Ones, 1),
            "   \t",
        );
        assert!(!draft.can_submit(&safe()));
        assert!(matches!(
            draft.validate(&safe()).unwrap_err(),
            DraftError::MissingNote { .. }
        ));
    }

    #[test]
    fn overdrawn_withdrawal_is_rejected() {
        let draft = TransactionDraft::withdrawal(
            BillCounts::default()
                .with(Denomination::Hundreds, 1)
                .with(Denomination::Fifties, 1)
                .with(Denomination::Twenties, 3),
            "Rent",
        );
        assert!(!draft.is_overdrawn(Denomination::Hundreds, &safe()));
        assert!(draft.is_overdrawn(Denomination::Fifties, &safe()));
        assert!(draft.is_overdrawn(Denomination::Twenties, &safe()));

        let err = draft.validate(&safe()).unwrap_err();
        assert_eq!(
            err,
            DraftError::InsufficientBills {
                denomination: Denomination::Fifties,
                requested: 1,
                available: 0,
            }
        );
        assert_eq!(
            err.to_string(),
            "Cannot withdraw 1 of fifties, only 0 available"
        );
    }

    #[test]
    fn deposits_have_no_upper_bound() {
        let draft = TransactionDraft::deposit(
            BillCounts::default().with(Denomination::Fifties, 500),
            "Birthday gift",
        );
        assert!(!draft.is_overdrawn(Denomination::Fifties, &safe()));
        assert!(draft.validate(&safe()).is_ok());
    }
}
