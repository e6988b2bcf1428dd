/// The fixed set of bill denominations and per-denomination count tables.
pub mod denomination;

/// Bills in the safe. State is modified using events, which are created by
/// handling commands.
pub mod cash;

/// Deposit and withdrawal drafts, and the checks a draft has to pass before
/// it becomes a command the [`cash`] module accepts.
pub mod command;

/// Activity log entries.
pub mod entry;

/// Key-value storage interface, plus "in memory" and "file" implementations,
/// and the typed JSON layer the session persists through.
pub mod storage;

/// Backup payload encoding and decoding.
pub mod backup;

/// Status flags that clear themselves after a delay.
pub mod status;

/// Currency, date and bill-count display helpers.
pub mod format;

/// Coordinates all of the above: owns the counts and the log, and mirrors
/// every change to storage.
pub mod session;

/// Command-line front end. Lives here rather than in the binary so the
/// integration tests can use it.
pub mod bin_utils;
