use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::{cash::CashState, entry::LogEntry};

/// Backups without a `version` field are read as this version.
pub const BACKUP_VERSION: u64 = 1;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Backup is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("Backup must be a JSON object")]
    NotAnObject,
    #[error("Backup has no `{0}` field")]
    MissingField(&'static str),
    #[error("Backup version {0} is newer than this program supports")]
    UnsupportedVersion(u64),
    #[error("Backup version must be a non-negative integer")]
    InvalidVersion,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupPayload<'a> {
    version: u64,
    cash: &'a CashState,
    log: &'a [LogEntry],
    exported_at: DateTime<Utc>,
}

/// Both aggregates recovered from a backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restored {
    pub cash: CashState,
    pub log: Vec<LogEntry>,
}

pub fn encode(
    cash: &CashState,
    log: &[LogEntry],
    exported_at: DateTime<Utc>,
) -> serde_json::Result<String> {
    serde_json::to_string(&BackupPayload {
        version: BACKUP_VERSION,
        cash,
        log,
        exported_at,
    })
}

/// Parses a backup. Only the presence of `cash` and `log` and the version are
/// checked; everything below them is coerced rather than rejected.
/// `exportedAt` and unknown fields are ignored.
pub fn decode(text: &str) -> Result<Restored, ImportError> {
    let value: Value = serde_json::from_str(text.trim()).map_err(ImportError::Malformed)?;
    let Value::Object(mut payload) = value else {
        return Err(ImportError::NotAnObject);
    };

    match payload.get("version") {
        None | Some(Value::Null) => {}
        Some(version) => {
            let version = read_version(version).ok_or(ImportError::InvalidVersion)?;
            if version > BACKUP_VERSION {
                return Err(ImportError::UnsupportedVersion(version));
            }
        }
    }

    let cash = take_field(&mut payload, "cash")?;
    let log = take_field(&mut payload, "log")?;

    let cash = serde_json::from_value(cash).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "backup cash is not a mapping, reading it as empty");
        CashState::default()
    });
    let log = match log {
        Value::Array(items) => items.iter().map(LogEntry::from_value).collect(),
        other => {
            tracing::warn!(found = %other, "backup log is not a list, reading it as empty");
            Vec::new()
        }
    };
    Ok(Restored { cash, log })
}

/// `1` and `1.0` are the same version.
fn read_version(version: &Value) -> Option<u64> {
    version.as_u64().or_else(|| {
        version
            .as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0)
            .map(|v| v as u64)
    })
}

fn take_field(
    payload: &mut serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<Value, ImportError> {
    match payload.remove(field) {
        None | Some(Value::Null) => Err(ImportError::MissingField(field)),
        Some(value) => Ok(value),
    }
}

/// Destination for an exported backup. Any writer will do.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> std::io::Result<()>;
}

impl<W> Clipboard for W
where
    W: Write,
{
    fn write_text(&mut self, text: &str) -> std::io::Result<()> {
        self.write_all(text.as_bytes())?;
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use crate::{
        command::TransactionKind,
        denomination::{BillCounts, Denomination},
    };

    use super::*;

    fn sample() -> Restored {
        Restored {
            cash: CashState::from_counts(
                BillCounts::default()
                    .with(Denomination::Hundreds, 1)
                    .with(Denomination::Ones, 9),
            ),
            log: vec![LogEntry {
                kind: TransactionKind::Deposit,
                note: "ATM".to_string(),
                amount: 109,
                breakdown: "1×$100, 9×$1".to_string(),
                date: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
            }],
        }
    }

    #[test]
    fn encode_carries_version_and_timestamp() {
        let sample = sample();
        let exported_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let text = encode(&sample.cash, &sample.log, exported_at).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["version"], json!(1));
        assert_eq!(value["exportedAt"], json!("2024-06-01T12:00:00Z"));
        assert_eq!(value["cash"]["hundreds"], json!(1));
        assert_eq!(value["log"][0]["type"], json!("deposit"));

        assert_eq!(decode(&text).unwrap(), sample);
    }

    #[test]
    fn decode_accepts_unversioned_payload() {
        let restored = decode(
            r#"  {"cash":{"twenties":2},"log":[],"exportedAt":"2024-01-01T00:00:00.000Z"}  "#,
        )
        .unwrap();
        assert_eq!(restored.cash.count(Denomination::Twenties), 2);
        assert!(restored.log.is_empty());
    }

    #[test]
    fn decode_rejections() {
        assert!(matches!(decode("not json"), Err(ImportError::Malformed(_))));
        assert!(matches!(decode("[1,2]"), Err(ImportError::NotAnObject)));
        assert!(matches!(
            decode(r#"{"cash":{"ones":1}}"#),
            Err(ImportError::MissingField("log"))
        ));
        assert!(matches!(
            decode(r#"{"cash":null,"log":[]}"#),
            Err(ImportError::MissingField("cash"))
        ));
        assert!(matches!(
            decode(r#"{"version":2,"cash":{},"log":[]}"#),
            Err(ImportError::UnsupportedVersion(2))
        ));
        assert!(matches!(
            decode(r#"{"version":"one","cash":{},"log":[]}"#),
            Err(ImportError::InvalidVersion)
        ));
        assert!(matches!(
            decode(r#"{"version":1.5,"cash":{},"log":[]}"#),
            Err(ImportError::InvalidVersion)
        ));
        assert!(matches!(
            decode(r#"{"version":-1,"cash":{},"log":[]}"#),
            Err(ImportError::InvalidVersion)
        ));
    }

    #[test]
    fn decode_accepts_integral_float_version() {
        let restored = decode(r#"{"version":1.0,"cash":{"ones":3},"log":[]}"#).unwrap();
        assert_eq!(restored.cash.count(Denomination::Ones), 3);
    }

    #[test]
    fn decode_coerces_odd_fields() {
        let restored = decode(r#"{"cash":[],"log":{"not":"a list"}}"#).unwrap();
        assert_eq!(restored.cash, CashState::default());
        assert!(restored.log.is_empty());

        let restored = decode(
            r#"{"cash":{"twenties":2},"log":[
                {"type":"withdraw","note":"x","amount":40,"breakdown":"2×$20"},
                {"type":"deposit","amount":12.5,"note":null}
            ]}"#,
        )
        .unwrap();
        assert_eq!(restored.cash.count(Denomination::Twenties), 2);
        assert_eq!(restored.log.len(), 2);
        assert_eq!(restored.log[0].kind, TransactionKind::Withdraw);
        assert_eq!(restored.log[0].date, None);
        assert_eq!(restored.log[1].amount, 12);
        assert_eq!(restored.log[1].note, "");
    }

    #[test]
    fn writer_is_a_clipboard() {
        let mut sink = Vec::new();
        sink.write_text("{}").unwrap();
        assert_eq!(sink, b"{}");
    }
}
