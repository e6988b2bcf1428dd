use std::time::Instant;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    backup::{self, Clipboard, ImportError},
    cash::{CashError, CashState},
    command::{DraftError, TransactionCommand, TransactionDraft},
    denomination::{BillCounts, Denomination, parse_count},
    entry::LogEntry,
    status::{
        EXPORT_COPIED_TTL, IMPORT_ERROR_TTL, IMPORT_SUCCESS_TTL, ImportStatus, TransientFlag,
    },
    storage::{KeyValueStore, Persistence, StoreError},
};

pub const CASH_KEY: &str = "cash-safe-denominations";
pub const LOG_KEY: &str = "cash-safe-log";

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error(transparent)]
    Cash(#[from] CashError),
}

/// The safe as one interactive session sees it: the bill counts and the
/// newest-first activity log, mirrored to the store after every change.
///
/// Storage write failures never fail an operation. They are logged and kept
/// in [`CashSafe::last_save_error`] until both slots save cleanly again.
pub struct CashSafe<S> {
    cash: CashState,
    log: Vec<LogEntry>,
    persistence: Persistence<S>,
    clock: fn() -> DateTime<Utc>,
    last_save_error: Option<StoreError>,
    import_status: TransientFlag<ImportStatus>,
    export_copied: TransientFlag<()>,
}

impl<S> CashSafe<S>
where
    S: KeyValueStore,
{
    pub fn load(store: S) -> Self {
        let persistence = Persistence::new(store);
        let cash = persistence.load(CASH_KEY, CashState::default());
        let log = persistence.load(LOG_KEY, Vec::new());
        tracing::debug!(
            total = cash.grand_total(),
            entries = log.len(),
            "session loaded"
        );
        Self {
            cash,
            log,
            persistence,
            clock: Utc::now,
            last_save_error: None,
            import_status: TransientFlag::default(),
            export_copied: TransientFlag::default(),
        }
    }

    /// Replaces the timestamp source used for new log entries and exports.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn cash(&self) -> &CashState {
        &self.cash
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn count(&self, denomination: Denomination) -> u64 {
        self.cash.count(denomination)
    }

    pub fn grand_total(&self) -> u64 {
        self.cash.grand_total()
    }

    pub fn total_bill_count(&self) -> u64 {
        self.cash.total_bill_count()
    }

    pub fn store_mut(&mut self) -> &mut S {
        self.persistence.store_mut()
    }

    pub fn into_store(self) -> S {
        self.persistence.into_store()
    }

    pub fn last_save_error(&self) -> Option<&StoreError> {
        self.last_save_error.as_ref()
    }

    pub fn import_status(&self) -> Option<ImportStatus> {
        self.import_status_at(Instant::now())
    }

    pub fn import_status_at(&self, now: Instant) -> Option<ImportStatus> {
        self.import_status.get(now)
    }

    pub fn export_copied(&self) -> bool {
        self.export_copied_at(Instant::now())
    }

    pub fn export_copied_at(&self, now: Instant) -> bool {
        self.export_copied.get(now).is_some()
    }

    /// Direct edit of one denomination. Negative counts clamp to 0.
    pub fn set_count(&mut self, denomination: Denomination, new_count: i64) {
        let evt = self.cash.handle_set_count(denomination, new_count);
        self.cash.apply(&evt);
        self.persist_cash();
    }

    /// Same as [`CashSafe::set_count`] for raw field input such as `"12"`,
    /// `"-3"` or `"abc"`.
    pub fn set_count_input(&mut self, denomination: Denomination, input: &str) {
        let count = i64::try_from(parse_count(input)).unwrap_or(i64::MAX);
        self.set_count(denomination, count);
    }

    pub fn apply_withdrawal(
        &mut self,
        amounts: BillCounts,
        note: impl Into<String>,
    ) -> Result<&LogEntry, TransactionError> {
        let cmd = TransactionDraft::withdrawal(amounts, note).validate(&self.cash)?;
        self.apply(cmd)
    }

    pub fn apply_deposit(
        &mut self,
        amounts: BillCounts,
        note: impl Into<String>,
    ) -> Result<&LogEntry, TransactionError> {
        let cmd = TransactionDraft::deposit(amounts, note).validate(&self.cash)?;
        self.apply(cmd)
    }

    /// Commits a validated deposit or withdrawal and logs it.
    pub fn apply(&mut self, command: TransactionCommand) -> Result<&LogEntry, TransactionError> {
        let evt = self.cash.handle_transaction(&command)?;
        self.cash.apply(&evt);
        let entry = LogEntry::from_command(&command, (self.clock)());
        tracing::info!(
            kind = ?entry.kind,
            amount = entry.amount,
            breakdown = %entry.breakdown,
            "transaction applied"
        );
        self.log.insert(0, entry);
        self.persist_all();
        Ok(&self.log[0])
    }

    pub fn export(&self) -> serde_json::Result<String> {
        backup::encode(&self.cash, &self.log, (self.clock)())
    }

    /// Hands the backup to `clipboard`. Returns whether the copy went
    /// through; a failure only clears the copied flag.
    pub fn copy_backup<C>(&mut self, clipboard: &mut C) -> bool
    where
        C: Clipboard + ?Sized,
    {
        let copied = self
            .export()
            .map_err(std::io::Error::from)
            .and_then(|text| clipboard.write_text(&text));
        match copied {
            Ok(()) => {
                self.export_copied
                    .raise((), Instant::now(), EXPORT_COPIED_TTL);
                true
            }
            Err(err) => {
                tracing::warn!(%err, "failed to copy backup");
                self.export_copied.clear();
                false
            }
        }
    }

    /// Replaces both aggregates with the backup in `text`. On rejection the
    /// session is left as it was.
    pub fn import(&mut self, text: &str) -> Result<(), ImportError> {
        match backup::decode(text) {
            Ok(restored) => {
                tracing::info!(
                    total = restored.cash.grand_total(),
                    entries = restored.log.len(),
                    "backup imported"
                );
                self.cash = restored.cash;
                self.log = restored.log;
                self.persist_all();
                self.import_status
                    .raise(ImportStatus::Success, Instant::now(), IMPORT_SUCCESS_TTL);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%err, "backup rejected");
                self.import_status
                    .raise(ImportStatus::Error, Instant::now(), IMPORT_ERROR_TTL);
                Err(err)
            }
        }
    }

    fn persist_cash(&mut self) {
        if let Err(err) = self.persistence.save(CASH_KEY, &self.cash) {
            self.save_failed(err);
        }
    }

    fn persist_all(&mut self) {
        let cash = self.persistence.save(CASH_KEY, &self.cash);
        let log = self.persistence.save(LOG_KEY, &self.log);
        match (cash, log) {
            (Ok(()), Ok(())) => self.last_save_error = None,
            (cash, log) => {
                for err in [cash, log].into_iter().filter_map(Result::err) {
                    self.save_failed(err);
                }
            }
        }
    }

    fn save_failed(&mut self, err: StoreError) {
        tracing::error!(%err, "storage save failed, changes are only in memory");
        self.last_save_error = Some(err);
    }
}
